use thiserror::Error;

/// Errors surfaced by the viewer and its collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlipbookError {
    #[error("required element `{0}` not found")]
    MissingElement(&'static str),
    #[error("required attribute `{0}` not set")]
    MissingAttribute(&'static str),
    #[error("host environment error: {0}")]
    Host(String),
    #[error("failed to open document: {0}")]
    DocumentOpen(String),
    #[error("document has no pages")]
    EmptyDocument,
    #[error("failed to fetch page {page}: {reason}")]
    PageFetch { page: u32, reason: String },
    #[error("failed to paint page {page}: {reason}")]
    Paint { page: u32, reason: String },
    #[error("no document loaded")]
    NotLoaded,
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("`{key}` out of range: {value}")]
    OutOfRange { key: &'static str, value: f64 },
    #[error("malformed JSON config: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value.to_string())
    }
}

pub type FlipbookResult<T> = Result<T, FlipbookError>;
