//! Error Types

use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Caller configuration failed field-level validation
    #[error("Configuration invalid: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Message came from an untrusted origin or an unexpected window
    #[error("Security error: {0}")]
    Security(String),

    /// Message type is not part of the checkout protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A live session already owns this frame identifier
    #[error("A checkout session is already open on frame '{0}'")]
    DuplicateSession(String),

    /// The host page refused a DOM operation
    #[error("Host page error: {0}")]
    Host(String),

    /// A callback URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Library configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckoutError {
    /// Errors that are logged and dropped without reaching any caller callback
    pub fn is_silent(&self) -> bool {
        matches!(self, CheckoutError::Security(_) | CheckoutError::Protocol(_))
    }

    /// Validation messages, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            CheckoutError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Validation(errors) => {
                format!("Kindly review the following configuration issues: {}", errors.join(", "))
            }
            CheckoutError::DuplicateSession(_) => "A checkout is already in progress.".into(),
            CheckoutError::Host(_) => "The checkout could not be displayed.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
