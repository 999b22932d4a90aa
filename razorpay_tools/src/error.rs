use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    /// The gateway could not be reached, or did not answer within the configured timeout.
    /// Retryable: the caller should supply a fresh receipt reference and try again.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
    /// The gateway answered and declined the request. Retrying with the same input will not help.
    #[error("Payment gateway rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not deserialize gateway response: {0}")]
    JsonError(String),
}
