//! Error types for the report pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ReportError`]
pub type Result<T> = std::result::Result<T, ReportError>;

/// One executed test that could not be matched with complete metadata.
#[derive(Debug, Clone)]
pub struct MissingMetadata {
    /// Canonical `<source_path>::<test_name>` of the offending test
    pub test: String,
    /// Field names still unset after every source was consulted
    pub missing_fields: Vec<String>,
}

impl fmt::Display for MissingMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (needs: {})", self.test, self.missing_fields.join(", "))
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    /// At least one executed test lacks required metadata. Fatal; the
    /// message enumerates every offender, not just the first.
    #[error(
        "{} test(s) are missing required metadata:\n{}\n\
         Declare metadata with the annotate! decorator\n\
         (annotate!(test_fn, description: .., expected: .., module: .., id: ..))\n\
         or with a doc-comment block on the test:\n\
         /// <description>\n\
         /// Expected: <expected result>\n\
         /// Module: <module>\n\
         /// ID: <test id>",
        .0.len(),
        .0.iter().map(|m| format!("  - {m}")).collect::<Vec<_>>().join("\n")
    )]
    MetadataMissing(Vec<MissingMetadata>),

    /// No test roots exist, or the runner process could not be launched
    #[error("test runner unavailable: {0}")]
    RunnerUnavailable(String),

    #[error("runner produced no result log at {}", .0.display())]
    ResultLogMissing(PathBuf),

    #[error("result log is malformed: {0}")]
    ResultLogMalformed(String),

    #[error("failed to compose PDF: {0}")]
    Render(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] portico_harness::MetadataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_missing_lists_every_offender() {
        let err = ReportError::MetadataMissing(vec![
            MissingMetadata {
                test: "tests/api/auth.rs::t_b".to_string(),
                missing_fields: vec![
                    "description".to_string(),
                    "expected_result".to_string(),
                    "module".to_string(),
                    "test_id".to_string(),
                ],
            },
            MissingMetadata {
                test: "tests/ui/menus.rs::t_m".to_string(),
                missing_fields: vec!["test_id".to_string()],
            },
        ]);

        let text = err.to_string();
        assert!(text.contains("2 test(s)"));
        assert!(text.contains("tests/api/auth.rs::t_b"));
        assert!(text.contains("description, expected_result, module, test_id"));
        assert!(text.contains("tests/ui/menus.rs::t_m"));
        assert!(text.contains("annotate!"));
        assert!(text.contains("Expected:"));
    }
}
