//! Real-time source error types.

/// Errors from an operator's live estimates endpoint.
///
/// Stages log these and fall back to schedule-only data.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The operator returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// A field had a value we cannot interpret
    #[error("unexpected value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },
}
