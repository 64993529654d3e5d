//! Email normalization error types.

use thiserror::Error;

/// Errors that can occur while normalizing inbound email content.
#[derive(Error, Debug)]
pub enum EmailError {
    /// Failed to parse a raw RFC 5322 message.
    #[error("Failed to parse email: {0}")]
    ParseError(String),

    /// A required field was empty after normalization.
    #[error("Missing required email field: {0}")]
    MissingField(&'static str),
}

/// Result type for email normalization.
pub type Result<T> = std::result::Result<T, EmailError>;
