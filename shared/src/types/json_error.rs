use serde::{Deserialize, Serialize};

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            status: "error".to_string(),
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new("UNAUTHENTICATED", "No authenticated admin session")
    }

    pub fn not_found() -> Self {
        Self::new("NOT_FOUND", "Resource not found")
    }
}
