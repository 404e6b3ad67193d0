//! Delivery error taxonomy.

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors from one logical "send event" operation.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport-level failure (connect, timeout, body read). Retried.
    #[error("connection error: {0}")]
    Connection(String),

    /// Non-success HTTP status (anything >= 300 on this wire). Retried.
    #[error("service returned status {0}")]
    Status(u16),

    /// The service answered but the response envelope was malformed.
    /// Never retried: the contract was violated, not the network.
    #[error("malformed response envelope: {0}")]
    Decode(String),

    /// Every attempt failed.
    #[error("delivery failed after {attempts} attempts ({last}); check https://status.vigil.dev")]
    Exhausted { attempts: u32, last: String },
}

impl DeliveryError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Connection(_) | DeliveryError::Status(_))
    }
}
