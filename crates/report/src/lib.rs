//! Portico report pipeline
//!
//! Runs the external test runner over the suite, joins every executed
//! test with its declared metadata, groups and sorts the results, and
//! renders the multi-page PDF report:
//!
//! ```text
//! RunnerDriver ── result log ──▶ join metadata ──▶ organize ──▶ render
//!      │                              │
//!      └─ subprocess                  └─ aborts on any missing field
//! ```
//!
//! The pipeline is single-threaded and sequential; the runner subprocess
//! is the only out-of-process work. Suite failures are report content,
//! never pipeline errors.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod organize;
pub mod pdf;
pub mod runner;
pub mod stats;

pub use config::ReportConfig;
pub use error::{MissingMetadata, ReportError, Result};
pub use organize::{organize, OrganizedRun};
pub use runner::{ParsedRun, RunnerDriver};
pub use stats::{ModuleStats, RunStats};

/// Pipeline version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
