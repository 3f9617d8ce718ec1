//! Portico test harness library
//!
//! The suite-facing half of the reporting pipeline:
//! - a process-wide [`registry`] mapping each test to the metadata it
//!   declared about itself
//! - the [`annotate!`] decorator suites use to declare that metadata
//! - a static [`docscan`] fallback that reads the doc-comment block above
//!   a test function
//! - the [`extract::Extractor`] that layers all three sources and refuses
//!   to produce incomplete metadata
//!
//! The report pipeline (`portico-report`) consumes this crate; the HTTP
//! and browser suites link against it only for `annotate!`.

pub mod annotate;
pub mod docscan;
pub mod error;
pub mod extract;
pub mod registry;
pub mod types;

pub use annotate::annotated;
pub use error::{MetadataError, Result};
pub use extract::Extractor;
pub use registry::{MetadataRegistry, REGISTRY_FILE_NAME};
pub use types::{
    EnrichedTest, TestKey, TestMetadata, TestOutcome, TestResult, FAILURE_DETAIL_LIMIT,
};

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
