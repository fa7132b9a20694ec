use std::sync::Arc;

use shared::{domain::email_domain, protocol::EmailResponse};
use thiserror::Error;
use tracing::debug;

pub mod disposable;
pub mod mx;
pub mod syntax;

pub use disposable::{DisposableDomains, DomainListSource, HttpDomainList, StaticDomainList};
pub use mx::{CachedMxResolver, DnsMxResolver, MxResolver};

pub const VALID_MESSAGE: &str = "Email is valid.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email format.")]
    Format,
    #[error("Disposable email addresses are not allowed.")]
    Disposable,
    #[error("Domain has no valid MX records.")]
    MxRecord,
}

#[derive(Clone)]
pub struct EmailValidator {
    disposable: Arc<DisposableDomains>,
    mx: Arc<dyn MxResolver>,
}

impl EmailValidator {
    pub fn new(disposable: Arc<DisposableDomains>, mx: Arc<dyn MxResolver>) -> Self {
        Self { disposable, mx }
    }

    pub fn disposable_domains(&self) -> &DisposableDomains {
        &self.disposable
    }

    /// Format, then disposable domain, then MX records. Stops at the first
    /// failing check.
    pub async fn validate(&self, email: &str) -> Result<EmailResponse, ValidationError> {
        if !syntax::is_well_formed(email) {
            return Err(ValidationError::Format);
        }

        let domain = email_domain(email);
        if self.disposable.contains(domain).await {
            return Err(ValidationError::Disposable);
        }
        if !self.mx.has_mx(domain).await {
            return Err(ValidationError::MxRecord);
        }

        Ok(EmailResponse::new(email, true, VALID_MESSAGE))
    }

    /// Like [`validate`](Self::validate), with the failure folded into the
    /// response instead of an error.
    pub async fn verdict(&self, email: &str) -> EmailResponse {
        match self.validate(email).await {
            Ok(response) => response,
            Err(reason) => {
                debug!(%email, %reason, "email rejected");
                EmailResponse::new(email, false, reason.to_string())
            }
        }
    }

    pub async fn check_disposable(&self, email: &str) -> EmailResponse {
        let disposable = self.disposable.contains(email_domain(email)).await;
        let message = if disposable {
            "Domain is disposable."
        } else {
            "Domain is not disposable."
        };
        EmailResponse::new(email, !disposable, message)
    }

    pub async fn check_mx_record(&self, email: &str) -> EmailResponse {
        let has_mx = self.mx.has_mx(email_domain(email)).await;
        let message = if has_mx {
            "Valid MX records found."
        } else {
            "No valid MX records."
        };
        EmailResponse::new(email, has_mx, message)
    }

    /// One verdict per address, in input order.
    pub async fn validate_bulk(&self, emails: &[String]) -> Vec<EmailResponse> {
        let mut responses = Vec::with_capacity(emails.len());
        for email in emails {
            responses.push(self.verdict(email).await);
        }
        responses
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
