use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid format error (bad EPUB structure, bad date-key, ...).
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Chapter store (de)serialization error.
    #[error("Store error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Email API rejected the request.
    #[error("Email API error ({status}): {body}")]
    Api {
        /// HTTP status returned by the API.
        status: reqwest::StatusCode,
        /// Response body, verbatim.
        body: String,
    },
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
