//! Error types for annotation.

use std::path::PathBuf;

use cedoc_html::HtmlError;

/// Error while encoding or decoding a session descriptor.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    /// JSON serialization or deserialization failed.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Payload is not valid base64.
    #[error("invalid base64 payload")]
    Base64(#[from] base64::DecodeError),

    /// URL does not carry a client-state payload.
    #[error("not a Compiler Explorer client-state URL: {0}")]
    NotClientState(String),
}

/// Error while annotating a single page.
#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    /// Page could not be parsed.
    #[error("HTML parse error")]
    Html(#[from] HtmlError),
}

/// Error while processing a site directory.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Input path does not exist.
    #[error("Input path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
