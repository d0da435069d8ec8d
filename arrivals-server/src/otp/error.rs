//! Trip planner error types.

/// Errors from the scheduled-data source.
///
/// Any of these makes the whole arrivals request fail.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The planner returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The query succeeded but reported errors
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// No stop with this id
    #[error("stop not found: {0}")]
    StopNotFound(String),

    /// Fixture data could not be loaded
    #[error("fixture error: {0}")]
    Fixture(String),
}
