//! Error types for metadata handling

use thiserror::Error;

/// Result type alias using [`MetadataError`]
pub type Result<T> = std::result::Result<T, MetadataError>;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// A test was executed without complete metadata. This aborts the
    /// pipeline; it is a correctness failure, not a warning.
    #[error("missing metadata for {test}: required fields [{}]", missing.join(", "))]
    Missing { test: String, missing: Vec<String> },

    #[error("registry file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetadataError {
    pub fn missing(test: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Missing {
            test: test.into(),
            missing,
        }
    }
}
