//! Email form that asks the server for a verdict and shows it.

use std::sync::Arc;

use shared::protocol::ValidationVerdict;
use tracing::{debug, error, warn};

use crate::{
    dom::Document,
    event::{EventType, HandlerTask},
    fetch::{encode_uri_component, Fetch, FetchError},
};

pub const FORM_ID: &str = "validateEmail";
pub const EMAIL_INPUT_ID: &str = "email";
pub const RESULT_ID: &str = "result";
pub const VALID_TEXT: &str = "Valid email!";
pub const INVALID_TEXT: &str = "Invalid email!";

pub fn validation_path(email: &str) -> String {
    format!("/api/validate/{}", encode_uri_component(email))
}

/// Binds the submit listener when the form is on the page. Returns whether
/// it was bound.
///
/// Overlapping submissions are not coordinated: each one writes its own
/// verdict when its response arrives, so the last response to resolve wins.
pub fn bind(document: &Document, fetch: Arc<dyn Fetch>) -> bool {
    let Some(form) = document.get_element_by_id(FORM_ID) else {
        debug!(form = FORM_ID, "validation form not present");
        return false;
    };

    form.add_event_listener(EventType::Submit, move |event| {
        event.prevent_default();

        let document = event.current_target().owner_document();
        let Some(input) = document.get_element_by_id(EMAIL_INPUT_ID) else {
            error!(input = EMAIL_INPUT_ID, "email input missing; submission dropped");
            return None;
        };
        let email = input.value();
        let fetch = fetch.clone();

        let task: HandlerTask = Box::pin(async move {
            match request_verdict(fetch.as_ref(), &email).await {
                Ok(verdict) => render(&document, verdict),
                Err(error) => error!(%error, "email validation request failed"),
            }
        });
        Some(task)
    });
    true
}

pub async fn request_verdict(
    fetch: &dyn Fetch,
    email: &str,
) -> Result<ValidationVerdict, FetchError> {
    let path = validation_path(email);
    let response = fetch.get(&path).await?;
    debug!(%path, status = response.status, "validation response received");
    response.json()
}

fn render(document: &Document, verdict: ValidationVerdict) {
    let text = if verdict.is_valid {
        VALID_TEXT
    } else {
        INVALID_TEXT
    };
    match document.get_element_by_id(RESULT_ID) {
        Some(result) => result.set_text_content(text),
        None => warn!(result = RESULT_ID, "result element missing"),
    }
}

#[cfg(test)]
#[path = "tests/validate_form_tests.rs"]
mod tests;
