//! Process-wide metadata registry
//!
//! A single instance maps each [`TestKey`] to the [`TestMetadata`] the test
//! declared about itself. It is populated while suites register themselves
//! (before any report stage runs) and read-only afterwards. At the end of a
//! run the snapshot is serialized to `test_metadata_registry.json` so a
//! later report process can consult it without loading the suites.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::types::{TestKey, TestMetadata};

/// Conventional name of the serialized registry file.
pub const REGISTRY_FILE_NAME: &str = "test_metadata_registry.json";

static REGISTRY: Lazy<MetadataRegistry> = Lazy::new(MetadataRegistry::new);

/// The process-wide registry instance.
pub fn global() -> &'static MetadataRegistry {
    &REGISTRY
}

/// In-memory test metadata catalog.
pub struct MetadataRegistry {
    entries: RwLock<HashMap<TestKey, TestMetadata>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Reset to an empty catalog. Idempotent.
    pub fn init(&self) {
        self.entries.write().clear();
    }

    /// Insert or overwrite. Duplicate keys are last-write-wins; the catalog
    /// is treated as static, so differing duplicates indicate a suite bug
    /// caught by review rather than merged silently here.
    pub fn register(&self, key: TestKey, metadata: TestMetadata) {
        debug!("registering metadata for {}", key);
        self.entries.write().insert(key, metadata);
    }

    pub fn lookup(&self, key: &TestKey) -> Option<TestMetadata> {
        self.entries.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Deep copy keyed by the canonical `<path>::<name>` string, in
    /// deterministic order.
    pub fn snapshot(&self) -> BTreeMap<String, TestMetadata> {
        self.entries
            .read()
            .iter()
            .map(|(key, meta)| (key.canonical(), meta.clone()))
            .collect()
    }

    /// Write the snapshot to `path`. Called exactly once at the end of a
    /// run; the file is owned by the most recent run and overwritten
    /// without merge.
    pub fn finalize(&self, path: &Path) -> Result<()> {
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, json)?;
        info!(
            "wrote {} metadata record(s) to {}",
            snapshot.len(),
            path.display()
        );
        Ok(())
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a previously finalized registry file into a canonical-key map.
pub fn load_registry_file(path: &Path) -> Result<BTreeMap<String, TestMetadata>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
