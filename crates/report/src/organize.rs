//! Deterministic grouping of enriched tests for rendering
//!
//! Modules ascend lexicographically; tests inside a module ascend by
//! name. Two runs over the same input always produce the same order, and
//! the PDF mirrors it page for page.

use std::collections::BTreeMap;

use portico_harness::types::EnrichedTest;

use crate::stats::{ModuleStats, RunStats};

/// The sorted, grouped input to the PDF renderer.
#[derive(Debug, Clone, Default)]
pub struct OrganizedRun {
    modules: BTreeMap<String, Vec<EnrichedTest>>,
}

impl OrganizedRun {
    /// Module names in render order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Modules with their tests, in render order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EnrichedTest])> {
        self.modules.iter().map(|(name, tests)| (name.as_str(), tests.as_slice()))
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn totals(&self) -> RunStats {
        self.modules
            .values()
            .map(|tests| ModuleStats::from_tests(tests))
            .sum()
    }
}

/// Group by metadata `module`, then sort each group by test name.
pub fn organize(tests: Vec<EnrichedTest>) -> OrganizedRun {
    let mut modules: BTreeMap<String, Vec<EnrichedTest>> = BTreeMap::new();
    for test in tests {
        modules
            .entry(test.metadata.module.clone())
            .or_default()
            .push(test);
    }
    for tests in modules.values_mut() {
        tests.sort_by(|a, b| a.name.cmp(&b.name));
    }
    OrganizedRun { modules }
}
