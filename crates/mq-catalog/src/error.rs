//! Network failure taxonomy.

/// Why a catalog request produced no usable data.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The request URL could not be built. No request was sent.
    #[error("Bad URL: {0}")]
    BadUrl(String),

    /// Connectivity failure or timeout.
    #[error("Request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    /// The server answered with a non-success status or an empty body.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The body did not match the expected schema.
    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for NetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            NetError::BadUrl(e.to_string())
        } else {
            NetError::RequestFailed(e)
        }
    }
}
