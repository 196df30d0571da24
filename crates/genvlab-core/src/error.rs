//! Error types for genvlab

use thiserror::Error;

/// Main error type for genvlab
#[derive(Error, Debug)]
pub enum GenvError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The directory service could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The directory service answered with a non-success status
    #[error("Response error ({status}): {message}")]
    Response {
        /// HTTP status code
        status: u16,
        /// The body's `message` field, or the raw body
        message: String,
    },

    /// The directory service answered with a body of the wrong shape
    #[error("Malformed response: {body}")]
    MalformedResponse {
        /// Raw response body
        body: String,
    },

    /// Dialog surface failure
    #[error("Dialog error: {0}")]
    Dialog(String),

    /// Selection that does not belong to the offered choices
    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    /// Terminal collaborator failure
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Kernel collaborator failure
    #[error("Kernel error: {0}")]
    Kernel(String),

    /// Kernelspec installation error
    #[error("Kernelspec error: {0}")]
    Kernelspec(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GenvError {
    /// Whether the error came from the transport rather than the service
    pub fn is_network(&self) -> bool {
        matches!(self, GenvError::Network(_))
    }
}

/// Result type for genvlab operations
pub type GenvResult<T> = Result<T, GenvError>;

impl From<serde_json::Error> for GenvError {
    fn from(err: serde_json::Error) -> Self {
        GenvError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for GenvError {
    fn from(err: toml::de::Error) -> Self {
        GenvError::Config(err.to_string())
    }
}
