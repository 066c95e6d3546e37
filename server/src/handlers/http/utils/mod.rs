pub mod cookies;
pub mod headers;
pub mod json_response;

// Re-export commonly used utilities
pub use cookies::*;
pub use headers::*;
pub use json_response::*;
