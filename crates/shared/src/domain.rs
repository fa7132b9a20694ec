use serde::{Deserialize, Serialize};

/// One question/answer pair shown in the FAQ section of the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// Domain part of an address: everything after the last `@`.
///
/// An address without `@` is its own domain, which then fails every
/// domain-level check.
pub fn email_domain(email: &str) -> &str {
    email.rsplit('@').next().unwrap_or(email)
}
