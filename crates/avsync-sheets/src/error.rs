use thiserror::Error;

/// Errors returned by a spreadsheet store.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Sheets API answered with a non-success status.
    #[error("sheets request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A cell coordinate or range that cannot be expressed in A1 notation.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
