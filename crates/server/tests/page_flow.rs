//! The rendered home page driven by the page controllers against the
//! in-process router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::Request,
    Router,
};
use page_core::{
    faq::{HIDDEN_CLASS, MINUS_ICON, TOGGLE_SELECTOR},
    validate_form::{EMAIL_INPUT_ID, FORM_ID, INVALID_TEXT, RESULT_ID, VALID_TEXT},
    Document, Fetch, FetchError, FetchResponse,
};
use server::{app_state::AppState, build_router};
use shared::domain::FaqItem;
use tower::ServiceExt;
use validation::{DisposableDomains, EmailValidator, MxResolver, StaticDomainList};

struct KnownDomains(&'static [&'static str]);

#[async_trait]
impl MxResolver for KnownDomains {
    async fn has_mx(&self, domain: &str) -> bool {
        self.0.iter().any(|known| *known == domain)
    }
}

/// Serves page requests straight from the router.
struct RouterFetch(Router);

#[async_trait]
impl Fetch for RouterFetch {
    async fn get(&self, path: &str) -> Result<FetchResponse, FetchError> {
        let transport = |message: String| FetchError::Transport {
            url: path.to_string(),
            message,
        };
        let request = Request::get(path)
            .body(Body::empty())
            .map_err(|e| transport(e.to_string()))?;
        let response = self
            .0
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| transport(e.to_string()))?;
        Ok(FetchResponse::new(status, body.to_vec()))
    }
}

fn app() -> Router {
    let validator = EmailValidator::new(
        Arc::new(DisposableDomains::new(StaticDomainList(vec![
            "mailinator.com".to_string(),
        ]))),
        Arc::new(KnownDomains(&["example.com"])),
    );
    build_router(Arc::new(AppState {
        validator,
        faq_items: Arc::new(vec![
            FaqItem {
                question: "Is it free?".to_string(),
                answer: "Yes, for personal use.".to_string(),
            },
            FaqItem {
                question: "Do you store addresses?".to_string(),
                answer: "No.".to_string(),
            },
        ]),
        max_bulk_emails: 10,
    }))
}

async fn load_page(fetch: &RouterFetch) -> Document {
    let home = fetch.get("/").await.expect("home page");
    assert_eq!(home.status, 200);
    let html = String::from_utf8(home.body).expect("utf8");
    Document::parse(&html).expect("home page parses")
}

async fn submit(document: &Document, email: &str) -> String {
    document
        .get_element_by_id(EMAIL_INPUT_ID)
        .expect("email input")
        .set_value(email);
    let dispatch = document
        .get_element_by_id(FORM_ID)
        .expect("form")
        .request_submit();
    assert!(dispatch.default_prevented());
    dispatch.settle().await;
    document
        .get_element_by_id(RESULT_ID)
        .expect("result")
        .text_content()
}

#[tokio::test]
async fn home_page_controllers_work_end_to_end() {
    let fetch = Arc::new(RouterFetch(app()));
    let document = load_page(&fetch).await;

    let bindings = page_core::init(&document, fetch.clone());
    assert_eq!(bindings.faq_toggles, 2);
    assert!(bindings.validation_form);

    let toggles = document.query_selector_all(TOGGLE_SELECTOR);
    let answer = toggles[0].next_element_sibling().expect("answer");
    assert!(answer.class_list().contains(HIDDEN_CLASS));

    let dispatch = toggles[0].click();
    assert_eq!(dispatch.pending(), 0);
    assert!(!answer.class_list().contains(HIDDEN_CLASS));
    let icon = toggles[0].query_selector("svg").expect("icon");
    assert_eq!(icon.inner_html(), MINUS_ICON);

    let other = toggles[1].next_element_sibling().expect("answer");
    assert!(other.class_list().contains(HIDDEN_CLASS));

    assert_eq!(submit(&document, "user@example.com").await, VALID_TEXT);
    assert_eq!(submit(&document, "user@mailinator.com").await, INVALID_TEXT);
    assert_eq!(submit(&document, "not an email").await, INVALID_TEXT);
    assert_eq!(submit(&document, "a/b?c#d@example.com").await, INVALID_TEXT);
}
