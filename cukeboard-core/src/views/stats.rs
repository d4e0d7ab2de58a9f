// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{model::ScenarioStatus, store::StatusFacts};
use serde::Serialize;
use smol_str::SmolStr;

/// Counts of scenarios by status.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StatsNumbers {
    /// Total number of scenarios counted.
    pub count: usize,
    /// Scenarios whose steps all passed.
    pub passed: usize,
    /// Scenarios with at least one failed step.
    pub failed: usize,
    /// Scenarios that were not fully executed.
    pub skipped: usize,
    /// Scenarios with a pending step definition.
    pub pending: usize,
    /// Scenarios with undefined steps.
    pub undefined: usize,
}

impl StatsNumbers {
    /// Counts one scenario.
    pub fn record(&mut self, status: ScenarioStatus) {
        self.count += 1;
        match status {
            ScenarioStatus::Passed => self.passed += 1,
            ScenarioStatus::Failed => self.failed += 1,
            ScenarioStatus::Skipped => self.skipped += 1,
            ScenarioStatus::Pending => self.pending += 1,
            ScenarioStatus::Undefined => self.undefined += 1,
        }
    }
}

/// Scenario statistics, split by review state.
///
/// Every scenario is counted once in `all` and once in either `reviewed` or
/// `non_reviewed`, so `all` is always the field-wise sum of the other two.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioStats {
    /// Counts over all scenarios.
    pub all: StatsNumbers,
    /// Counts over scenarios marked as reviewed.
    pub reviewed: StatsNumbers,
    /// Counts over scenarios not yet reviewed.
    pub non_reviewed: StatsNumbers,
}

impl ScenarioStats {
    /// Counts one scenario into the appropriate buckets.
    pub fn record(&mut self, status: ScenarioStatus, reviewed: bool) {
        self.all.record(status);
        if reviewed {
            self.reviewed.record(status);
        } else {
            self.non_reviewed.record(status);
        }
    }

    /// Folds a stream of status facts into statistics.
    pub fn from_facts(facts: impl IntoIterator<Item = StatusFacts>) -> Self {
        let mut stats = Self::default();
        for fact in facts {
            stats.record(fact.status, fact.reviewed);
        }
        stats
    }
}

/// Statistics for the scenarios carrying one tag.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioTagStats {
    /// The tag.
    pub tag: SmolStr,
    /// Statistics over the scenarios carrying it.
    pub stats: ScenarioStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;
    use test_strategy::proptest;

    #[test]
    fn buckets_split_on_review_state() {
        let stats = ScenarioStats::from_facts([
            StatusFacts {
                status: ScenarioStatus::Passed,
                reviewed: true,
            },
            StatusFacts {
                status: ScenarioStatus::Failed,
                reviewed: false,
            },
            StatusFacts {
                status: ScenarioStatus::Failed,
                reviewed: false,
            },
            StatusFacts {
                status: ScenarioStatus::Pending,
                reviewed: true,
            },
        ]);

        assert_eq!(stats.all.count, 4);
        assert_eq!(stats.all.failed, 2);
        assert_eq!(stats.reviewed.count, 2);
        assert_eq!(stats.reviewed.passed, 1);
        assert_eq!(stats.reviewed.pending, 1);
        assert_eq!(stats.non_reviewed.count, 2);
        assert_eq!(stats.non_reviewed.failed, 2);
    }

    #[test]
    fn serialized_field_names_are_kebab_case() {
        let stats = ScenarioStats::default();
        let json = serde_json::to_value(stats).unwrap();
        assert!(json.get("non-reviewed").is_some());
        assert!(json.get("non_reviewed").is_none());
    }

    fn status_strategy() -> impl Strategy<Value = ScenarioStatus> {
        prop_oneof![
            Just(ScenarioStatus::Passed),
            Just(ScenarioStatus::Failed),
            Just(ScenarioStatus::Skipped),
            Just(ScenarioStatus::Pending),
            Just(ScenarioStatus::Undefined),
        ]
    }

    fn numbers_are_consistent(numbers: &StatsNumbers) -> bool {
        numbers.count
            == numbers.passed
                + numbers.failed
                + numbers.skipped
                + numbers.pending
                + numbers.undefined
    }

    #[proptest]
    fn all_is_the_sum_of_the_review_buckets(
        #[strategy(vec((status_strategy(), any::<bool>()), 0..50))] facts: Vec<(
            ScenarioStatus,
            bool,
        )>,
    ) {
        let stats = ScenarioStats::from_facts(
            facts
                .iter()
                .map(|&(status, reviewed)| StatusFacts { status, reviewed }),
        );

        prop_assert!(numbers_are_consistent(&stats.all));
        prop_assert!(numbers_are_consistent(&stats.reviewed));
        prop_assert!(numbers_are_consistent(&stats.non_reviewed));
        prop_assert_eq!(stats.all.count, stats.reviewed.count + stats.non_reviewed.count);
        prop_assert_eq!(
            stats.all.failed,
            stats.reviewed.failed + stats.non_reviewed.failed
        );
        prop_assert_eq!(
            stats.all.passed,
            stats.reviewed.passed + stats.non_reviewed.passed
        );
    }

    #[proptest]
    fn folding_the_same_facts_twice_yields_the_same_stats(
        #[strategy(vec((status_strategy(), any::<bool>()), 0..50))] facts: Vec<(
            ScenarioStatus,
            bool,
        )>,
    ) {
        let fold = || {
            ScenarioStats::from_facts(
                facts
                    .iter()
                    .map(|&(status, reviewed)| StatusFacts { status, reviewed }),
            )
        };
        prop_assert_eq!(fold(), fold());
    }
}
