pub mod consumer;
pub mod order;
pub mod page;
pub mod user;

pub use consumer::*;
pub use order::*;
pub use page::*;
pub use user::*;

/// Lower-cased, trimmed form used for every email comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, poem_openapi::Object)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
