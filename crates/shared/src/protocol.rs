use serde::{Deserialize, Serialize};

/// Verdict returned by every validation route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResponse {
    pub email: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EmailResponse {
    pub fn new(email: impl Into<String>, is_valid: bool, message: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_valid,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkEmailRequest {
    pub email: Vec<String>,
}

/// The only part of a validation response the page reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
}
