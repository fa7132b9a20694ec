use std::sync::Arc;

use tracing::info;

use crate::{dom::Document, faq, fetch::Fetch, validate_form};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBindings {
    pub faq_toggles: usize,
    pub validation_form: bool,
}

/// Wires every page controller to the document. Call once, after the
/// document's content is in place.
pub fn init(document: &Document, fetch: Arc<dyn Fetch>) -> PageBindings {
    let bindings = PageBindings {
        faq_toggles: faq::bind(document),
        validation_form: validate_form::bind(document, fetch),
    };
    info!(
        faq_toggles = bindings.faq_toggles,
        validation_form = bindings.validation_form,
        "page controllers bound"
    );
    bindings
}
