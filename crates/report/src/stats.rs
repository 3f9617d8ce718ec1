//! Derived run statistics

use std::iter::Sum;

use portico_harness::types::{EnrichedTest, TestOutcome};

/// Counts for one module (or, summed, the whole run).
///
/// Invariant: `passed + failed + skipped + unknown == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub unknown: usize,
}

/// Whole-run totals; structurally the same counts.
pub type RunStats = ModuleStats;

impl ModuleStats {
    pub fn from_tests(tests: &[EnrichedTest]) -> Self {
        let mut stats = Self {
            total: tests.len(),
            ..Self::default()
        };
        for test in tests {
            match test.outcome {
                TestOutcome::Passed => stats.passed += 1,
                TestOutcome::Failed => stats.failed += 1,
                TestOutcome::Skipped => stats.skipped += 1,
                TestOutcome::Unknown => stats.unknown += 1,
            }
        }
        stats
    }

    /// `passed / total`, 0 when the module is empty.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }

    /// Success rate for display, one decimal: `33.3%`.
    pub fn success_percent(&self) -> String {
        format!("{:.1}%", self.success_rate() * 100.0)
    }
}

impl Sum for ModuleStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, stats| {
            acc.total += stats.total;
            acc.passed += stats.passed;
            acc.failed += stats.failed;
            acc.skipped += stats.skipped;
            acc.unknown += stats.unknown;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_harness::types::TestMetadata;

    fn with_outcome(outcome: TestOutcome) -> EnrichedTest {
        EnrichedTest {
            name: "t".to_string(),
            outcome,
            duration_seconds: 0.0,
            metadata: TestMetadata::new("d", "e", "M", "M-1"),
            actual_result_text: String::new(),
        }
    }

    #[test]
    fn test_counts_partition_total() {
        let tests = vec![
            with_outcome(TestOutcome::Passed),
            with_outcome(TestOutcome::Failed),
            with_outcome(TestOutcome::Failed),
            with_outcome(TestOutcome::Skipped),
            with_outcome(TestOutcome::Unknown),
        ];
        let stats = ModuleStats::from_tests(&tests);
        assert_eq!(stats.total, 5);
        assert_eq!(
            stats.passed + stats.failed + stats.skipped + stats.unknown,
            stats.total
        );
    }

    #[test]
    fn test_one_of_three_passed_is_33_3_percent() {
        let tests = vec![
            with_outcome(TestOutcome::Passed),
            with_outcome(TestOutcome::Failed),
            with_outcome(TestOutcome::Skipped),
        ];
        assert_eq!(ModuleStats::from_tests(&tests).success_percent(), "33.3%");
    }

    #[test]
    fn test_all_passed_is_100_percent() {
        let tests = vec![
            with_outcome(TestOutcome::Passed),
            with_outcome(TestOutcome::Passed),
        ];
        assert_eq!(ModuleStats::from_tests(&tests).success_percent(), "100.0%");
    }

    #[test]
    fn test_empty_module_displays_zero_percent() {
        assert_eq!(ModuleStats::default().success_percent(), "0.0%");
    }

    #[test]
    fn test_sum_adds_per_module_counts() {
        let a = ModuleStats {
            total: 3,
            passed: 1,
            failed: 2,
            ..Default::default()
        };
        let b = ModuleStats {
            total: 2,
            passed: 2,
            ..Default::default()
        };
        let sum: RunStats = [a, b].into_iter().sum();
        assert_eq!(sum.total, 5);
        assert_eq!(sum.passed, 3);
        assert_eq!(sum.failed, 2);
        assert_eq!(sum.success_percent(), "60.0%");
    }
}
