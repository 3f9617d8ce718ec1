//! Report pipeline configuration
//!
//! Everything has a default so `report` runs with no arguments; an
//! optional `report.toml` next to the binary's working directory can
//! override any block.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Placeholder in runner args replaced with the result-log path.
pub const REPORT_PLACEHOLDER: &str = "{report}";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub project: ProjectConfig,
    pub runner: RunnerConfig,
    pub report: OutputConfig,
}

impl ReportConfig {
    /// Load from a TOML file, or fall back to defaults when the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw)
                .map_err(|e| ReportError::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Identity of the system under test, shown on the report cover
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub services: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "portico".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "staging".to_string(),
            services: vec![
                "auth".to_string(),
                "coverage".to_string(),
                "purchasing".to_string(),
                "menus".to_string(),
                "hr".to_string(),
            ],
        }
    }
}

/// External test runner invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Runner executable
    pub program: String,

    /// Arguments; `{report}` is replaced with the result-log path, and the
    /// surviving test roots are appended
    pub args: Vec<String>,

    /// Ordered test roots; only those present on disk are passed on
    pub roots: Vec<PathBuf>,

    /// Where the runner is asked to write its JSON result log
    pub result_log: PathBuf,

    /// Scratch paths scrubbed after every run
    pub scrub: Vec<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "pytest".to_string(),
            args: vec![
                "-q".to_string(),
                "--json-report".to_string(),
                format!("--json-report-file={REPORT_PLACEHOLDER}"),
            ],
            roots: vec![PathBuf::from("tests/api"), PathBuf::from("tests/ui")],
            result_log: PathBuf::from(".portico_result_log.json"),
            scrub: vec![PathBuf::from(".portico-cache")],
        }
    }
}

/// Report output behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the PDF is written to
    pub output_dir: PathBuf,

    /// Ask the OS to open the finished report
    pub open_when_done: bool,

    /// Where the registry snapshot is finalized to
    pub registry_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            open_when_done: true,
            registry_file: PathBuf::from(portico_harness::REGISTRY_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_services() {
        let config = ReportConfig::default();
        assert_eq!(config.project.name, "portico");
        assert_eq!(config.project.services.len(), 5);
        assert_eq!(config.runner.roots.len(), 2);
        assert!(config
            .runner
            .args
            .iter()
            .any(|a| a.contains(REPORT_PLACEHOLDER)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ReportConfig::load(Path::new("/nonexistent/report.toml")).unwrap();
        assert_eq!(config.project.name, "portico");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        fs::write(
            &path,
            r#"
[project]
name = "portico-qa"
environment = "qa"

[runner]
program = "suite-runner"
"#,
        )
        .unwrap();

        let config = ReportConfig::load(&path).unwrap();
        assert_eq!(config.project.name, "portico-qa");
        assert_eq!(config.project.environment, "qa");
        assert_eq!(config.runner.program, "suite-runner");
        // Untouched blocks keep their defaults
        assert!(config.report.open_when_done);
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        fs::write(&path, "not valid toml [[[").unwrap();
        assert!(matches!(
            ReportConfig::load(&path),
            Err(ReportError::Config(_))
        ));
    }
}
