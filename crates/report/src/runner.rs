//! Test runner driver
//!
//! Discovers which test roots exist, invokes the external runner as a
//! subprocess with a request for a JSON result log, parses that log, and
//! joins every entry with its metadata. The result-log schema and the
//! invocation shape live here and nowhere else, so swapping the runner
//! means reimplementing this adapter only.
//!
//! Failure semantics: a missing or unparseable log is fatal, as is any
//! test without complete metadata. A non-zero runner exit is not; failing
//! tests still get a report.

use serde::Deserialize;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use portico_harness::types::{EnrichedTest, TestKey, TestOutcome, TestResult};
use portico_harness::Extractor;

use crate::config::{RunnerConfig, REPORT_PLACEHOLDER};
use crate::error::{MissingMetadata, ReportError, Result};

/// Parsed and metadata-joined outcome of one runner invocation.
#[derive(Debug, Clone)]
pub struct ParsedRun {
    pub tests: Vec<EnrichedTest>,
}

impl ParsedRun {
    pub fn total(&self) -> usize {
        self.tests.len()
    }

    pub fn count(&self, outcome: TestOutcome) -> usize {
        self.tests.iter().filter(|t| t.outcome == outcome).count()
    }
}

// Result-log schema: `{"tests": [{"nodeid", "outcome", "call": {...}}]}`.
// Anything else in the log is ignored.

#[derive(Debug, Deserialize)]
struct ResultLog {
    tests: Vec<ResultEntry>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    nodeid: String,
    outcome: String,
    #[serde(default)]
    call: Option<CallPhase>,
}

#[derive(Debug, Deserialize)]
struct CallPhase {
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    longrepr: Option<String>,
}

impl ResultEntry {
    fn into_result(self) -> Result<TestResult> {
        let key = TestKey::from_nodeid(&self.nodeid).ok_or_else(|| {
            ReportError::ResultLogMalformed(format!("bad nodeid: {:?}", self.nodeid))
        })?;
        let (duration_seconds, failure_detail) = match self.call {
            Some(call) => (call.duration.unwrap_or(0.0).max(0.0), call.longrepr),
            None => (0.0, None),
        };
        Ok(TestResult {
            key,
            outcome: TestOutcome::from_token(&self.outcome),
            duration_seconds,
            failure_detail,
        })
    }
}

/// Drives one full runner invocation.
pub struct RunnerDriver {
    config: RunnerConfig,
    extractor: Extractor,
}

impl RunnerDriver {
    pub fn new(config: RunnerConfig, extractor: Extractor) -> Self {
        Self { config, extractor }
    }

    /// Run the suite end to end: discover roots, spawn the runner, parse
    /// the log, join metadata. See the module docs for what is fatal.
    pub fn run_all(&self) -> Result<ParsedRun> {
        let roots = self.existing_roots();
        if roots.is_empty() {
            return Err(ReportError::RunnerUnavailable(format!(
                "none of the configured test roots exist: {:?}",
                self.config.roots
            )));
        }
        info!("test roots: {:?}", roots);

        self.spawn_runner(&roots)?;
        let results = self.parse_result_log()?;
        let run = self.join_metadata(results)?;

        info!(
            "suite finished: {} total, {} passed, {} failed, {} skipped",
            run.total(),
            run.count(TestOutcome::Passed),
            run.count(TestOutcome::Failed),
            run.count(TestOutcome::Skipped),
        );
        Ok(run)
    }

    /// Configured roots that exist on disk, original order preserved.
    fn existing_roots(&self) -> Vec<PathBuf> {
        self.config
            .roots
            .iter()
            .filter(|root| root.exists())
            .cloned()
            .collect()
    }

    fn spawn_runner(&self, roots: &[PathBuf]) -> Result<()> {
        let log_path = self.config.result_log.to_string_lossy().to_string();
        let args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| arg.replace(REPORT_PLACEHOLDER, &log_path))
            .collect();

        info!("invoking runner: {} {:?}", self.config.program, args);

        let output = Command::new(&self.config.program)
            .args(&args)
            .args(roots)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ReportError::RunnerUnavailable(format!(
                    "failed to launch {}: {}",
                    self.config.program, e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            if !stdout.trim().is_empty() {
                debug!("runner stdout:\n{}", stdout.trim_end());
            }
            if !stderr.trim().is_empty() {
                debug!("runner stderr:\n{}", stderr.trim_end());
            }
        } else {
            // Non-zero exit is data for the report, not a pipeline error,
            // but the runner's output must stay visible at the default
            // filter so failing suites are diagnosable.
            warn!("runner exited with {}", output.status);
            if !stdout.trim().is_empty() {
                info!("runner stdout:\n{}", stdout.trim_end());
            }
            if !stderr.trim().is_empty() {
                warn!("runner stderr:\n{}", stderr.trim_end());
            }
        }
        Ok(())
    }

    fn parse_result_log(&self) -> Result<Vec<TestResult>> {
        let path = &self.config.result_log;
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReportError::ResultLogMissing(path.clone())
            } else {
                ReportError::Io(e)
            }
        })?;

        let log: ResultLog = serde_json::from_str(&raw)
            .map_err(|e| ReportError::ResultLogMalformed(e.to_string()))?;

        log.tests.into_iter().map(ResultEntry::into_result).collect()
    }

    /// Join each result with its metadata. Collects every failure before
    /// aborting so the diagnostic names all offending tests at once.
    fn join_metadata(&self, results: Vec<TestResult>) -> Result<ParsedRun> {
        let mut tests = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for result in &results {
            match self.extractor.extract(&result.key) {
                Ok(metadata) => tests.push(EnrichedTest::new(result, metadata)),
                Err(portico_harness::MetadataError::Missing { test, missing }) => {
                    failures.push(MissingMetadata {
                        test,
                        missing_fields: missing,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !failures.is_empty() {
            return Err(ReportError::MetadataMissing(failures));
        }
        Ok(ParsedRun { tests })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_maps_outcome_and_call_phase() {
        let entry: ResultEntry = serde_json::from_str(
            r#"{
                "nodeid": "tests/api/auth.rs::test_login",
                "outcome": "failed",
                "call": {"duration": 0.4, "longrepr": "AssertionError: x"}
            }"#,
        )
        .unwrap();
        let result = entry.into_result().unwrap();
        assert_eq!(result.outcome, TestOutcome::Failed);
        assert!((result.duration_seconds - 0.4).abs() < f64::EPSILON);
        assert_eq!(result.failure_detail.as_deref(), Some("AssertionError: x"));
    }

    #[test]
    fn test_entry_without_call_phase_defaults_to_zero_duration() {
        let entry: ResultEntry = serde_json::from_str(
            r#"{"nodeid": "tests/ui/menus.rs::test_render", "outcome": "skipped"}"#,
        )
        .unwrap();
        let result = entry.into_result().unwrap();
        assert_eq!(result.outcome, TestOutcome::Skipped);
        assert_eq!(result.duration_seconds, 0.0);
        assert!(result.failure_detail.is_none());
    }

    #[test]
    fn test_entry_with_bad_nodeid_is_malformed() {
        let entry: ResultEntry =
            serde_json::from_str(r#"{"nodeid": "no-separator", "outcome": "passed"}"#).unwrap();
        assert!(matches!(
            entry.into_result(),
            Err(ReportError::ResultLogMalformed(_))
        ));
    }

    /// Collects formatted log output so assertions can see what a user
    /// at the default filter would see.
    #[derive(Clone, Default)]
    struct LogCapture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl LogCapture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    struct LogWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
        type Writer = LogWriter;

        fn make_writer(&'a self) -> Self::Writer {
            LogWriter(self.0.clone())
        }
    }

    #[test]
    fn test_failing_runner_stderr_is_visible_at_info_level() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(capture.clone())
            .finish();

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tests/api")).unwrap();
        let config = RunnerConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo 'ConnectionError: auth service unreachable' >&2; \
                 echo '{\"tests\":[]}' > {report}; exit 1"
                    .to_string(),
            ],
            roots: vec![dir.path().join("tests/api")],
            result_log: dir.path().join("result_log.json"),
            scrub: vec![],
        };
        let extractor = Extractor::new(dir.path().join("registry.json"), dir.path());

        tracing::subscriber::with_default(subscriber, || {
            let run = RunnerDriver::new(config, extractor).run_all().unwrap();
            assert_eq!(run.total(), 0);
        });

        let logs = capture.contents();
        assert!(
            logs.contains("auth service unreachable"),
            "runner stderr not surfaced at info level: {logs}"
        );
        assert!(logs.contains("runner exited"));
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let entry: ResultEntry = serde_json::from_str(
            r#"{"nodeid": "a.rs::t", "outcome": "passed", "call": {"duration": -1.0}}"#,
        )
        .unwrap();
        assert_eq!(entry.into_result().unwrap().duration_seconds, 0.0);
    }
}
