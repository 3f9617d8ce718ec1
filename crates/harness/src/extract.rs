//! Metadata extraction
//!
//! Given a test key from the runner's result log, resolve its metadata
//! from three layered sources: the in-process registry, the registry file
//! written by a previous run, and the doc-comment block on the test
//! function itself. A test that still has empty fields after all three is
//! a hard failure; the pipeline never renders a report with holes in it.

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{MetadataError, Result};
use crate::types::{TestKey, TestMetadata};
use crate::{docscan, registry};

/// Metadata with not-yet-validated fields. Sources each contribute what
/// they know; the extractor validates the merge.
#[derive(Debug, Clone, Default)]
pub struct PartialMetadata {
    pub description: Option<String>,
    pub expected_result: Option<String>,
    pub module: Option<String>,
    pub test_id: Option<String>,
}

impl PartialMetadata {
    fn absorb(&mut self, meta: &TestMetadata) {
        fill(&mut self.description, &meta.description);
        fill(&mut self.expected_result, &meta.expected_result);
        fill(&mut self.module, &meta.module);
        fill(&mut self.test_id, &meta.test_id);
    }

    fn absorb_partial(&mut self, other: PartialMetadata) {
        for (slot, value) in [
            (&mut self.description, other.description),
            (&mut self.expected_result, other.expected_result),
            (&mut self.module, other.module),
            (&mut self.test_id, other.test_id),
        ] {
            if slot.is_none() {
                *slot = value.filter(|v| !v.is_empty());
            }
        }
    }

    /// Names of fields that are still unset, in declaration order.
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("description", &self.description),
            ("expected_result", &self.expected_result),
            ("module", &self.module),
            ("test_id", &self.test_id),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    fn into_metadata(self, key: &TestKey) -> Result<TestMetadata> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(MetadataError::missing(key.canonical(), missing));
        }
        Ok(TestMetadata {
            description: self.description.unwrap_or_default(),
            expected_result: self.expected_result.unwrap_or_default(),
            module: self.module.unwrap_or_default(),
            test_id: self.test_id.unwrap_or_default(),
        })
    }
}

/// Only empty fields accept a value; earlier sources win per field.
fn fill(slot: &mut Option<String>, value: &str) {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

/// Layered metadata resolver. The registry file is loaded at most once per
/// process and cached for the extractor's lifetime.
pub struct Extractor {
    registry_file: PathBuf,
    source_root: PathBuf,
    file_cache: OnceCell<BTreeMap<String, TestMetadata>>,
}

impl Extractor {
    pub fn new(registry_file: impl Into<PathBuf>, source_root: impl Into<PathBuf>) -> Self {
        Self {
            registry_file: registry_file.into(),
            source_root: source_root.into(),
            file_cache: OnceCell::new(),
        }
    }

    /// Resolve complete metadata for `key` or fail naming every missing
    /// field.
    pub fn extract(&self, key: &TestKey) -> Result<TestMetadata> {
        let mut partial = PartialMetadata::default();

        if let Some(meta) = registry::global().lookup(key) {
            partial.absorb(&meta);
        }

        if let Some(meta) = self.file_entries().get(&key.canonical()) {
            partial.absorb(meta);
        }

        if !partial.missing_fields().is_empty() {
            let source = self.resolve_source(&key.source_path);
            debug!(
                "registry incomplete for {}, scanning {}",
                key,
                source.display()
            );
            partial.absorb_partial(docscan::scan(&source, &key.test_name));
        }

        partial.into_metadata(key)
    }

    fn file_entries(&self) -> &BTreeMap<String, TestMetadata> {
        self.file_cache.get_or_init(|| {
            match registry::load_registry_file(&self.registry_file) {
                Ok(entries) => {
                    debug!(
                        "loaded {} record(s) from {}",
                        entries.len(),
                        self.registry_file.display()
                    );
                    entries
                }
                Err(MetadataError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    BTreeMap::new()
                }
                Err(e) => {
                    warn!(
                        "ignoring unreadable registry file {}: {}",
                        self.registry_file.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        })
    }

    fn resolve_source(&self, source_path: &str) -> PathBuf {
        let path = Path::new(source_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.source_root.join(path)
        }
    }
}
