use thiserror::Error;

/// Failure to retrieve the manifest or a note's raw text.
///
/// Cloneable so the note store can remember the last failure for an identifier
/// without holding on to the underlying transport error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} did not return text")]
    NotText { url: String },

    #[error("no browser window is available")]
    NoWindow,

    #[error("note {id} is not available")]
    Missing { id: String },

    #[error("manifest is malformed: {0}")]
    Manifest(String),
}

impl FetchError {
    pub fn missing(id: impl Into<String>) -> Self {
        Self::Missing { id: id.into() }
    }
}
