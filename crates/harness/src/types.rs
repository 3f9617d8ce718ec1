//! Core types shared by the suite-facing harness and the report pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters of failure detail shown in reports.
pub const FAILURE_DETAIL_LIMIT: usize = 100;

/// Identity of a single test: project-relative source path plus function name.
///
/// `(source_path, test_name)` is unique across the suite. The canonical
/// string form `<source_path>::<test_name>` is what the runner's result log
/// calls a `nodeid` and what keys the registry file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestKey {
    pub source_path: String,
    pub test_name: String,
}

impl TestKey {
    pub fn new(source_path: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            test_name: test_name.into(),
        }
    }

    /// Parse a result-log `nodeid` of the form `<source_path>::<test_name>`.
    pub fn from_nodeid(nodeid: &str) -> Option<Self> {
        let (path, name) = nodeid.split_once("::")?;
        if path.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(path, name))
    }

    /// Canonical `<source_path>::<test_name>` form.
    pub fn canonical(&self) -> String {
        format!("{}::{}", self.source_path, self.test_name)
    }
}

impl fmt::Display for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.source_path, self.test_name)
    }
}

/// Metadata declared by a test about itself.
///
/// All four fields are required and non-empty; validation happens at read
/// time in the extractor, never at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMetadata {
    /// What the test exercises
    pub description: String,

    /// The outcome a passing run demonstrates
    pub expected_result: String,

    /// Reporting group (e.g. "Auth"); distinct from the source-file layout
    pub module: String,

    /// Stable identifier unique within a module (e.g. "AUTH-001")
    pub test_id: String,
}

impl TestMetadata {
    pub fn new(
        description: impl Into<String>,
        expected_result: impl Into<String>,
        module: impl Into<String>,
        test_id: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            expected_result: expected_result.into(),
            module: module.into(),
            test_id: test_id.into(),
        }
    }
}

/// Outcome token reported by the runner for a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,
    Unknown,
}

impl TestOutcome {
    /// Map a result-log outcome token; unrecognized tokens become `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry parsed from the runner's result log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub key: TestKey,
    pub outcome: TestOutcome,

    /// Wall-clock duration of the test call phase, seconds
    pub duration_seconds: f64,

    /// Runner-provided failure text, untruncated
    pub failure_detail: Option<String>,
}

/// A result-log entry joined with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTest {
    pub name: String,
    pub outcome: TestOutcome,
    pub duration_seconds: f64,
    pub metadata: TestMetadata,

    /// Human-readable outcome line shown in the report
    pub actual_result_text: String,
}

impl EnrichedTest {
    pub fn new(result: &TestResult, metadata: TestMetadata) -> Self {
        Self {
            name: result.key.test_name.clone(),
            outcome: result.outcome,
            duration_seconds: result.duration_seconds,
            metadata,
            actual_result_text: actual_result_text(
                result.outcome,
                result.failure_detail.as_deref(),
            ),
        }
    }
}

/// Derive the report's outcome line from the raw result.
pub fn actual_result_text(outcome: TestOutcome, failure_detail: Option<&str>) -> String {
    match outcome {
        TestOutcome::Passed => "Test passed".to_string(),
        TestOutcome::Failed => format!(
            "Test failed: {}",
            truncate_detail(failure_detail.unwrap_or("no detail captured"))
        ),
        TestOutcome::Skipped => "Test skipped".to_string(),
        TestOutcome::Unknown => "Unknown state".to_string(),
    }
}

/// Cap failure detail at [`FAILURE_DETAIL_LIMIT`] characters, appending
/// `...` when anything was cut.
pub fn truncate_detail(detail: &str) -> String {
    if detail.chars().count() <= FAILURE_DETAIL_LIMIT {
        return detail.to_string();
    }
    let kept: String = detail.chars().take(FAILURE_DETAIL_LIMIT).collect();
    format!("{}...", kept)
}
