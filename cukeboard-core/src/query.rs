// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queries over stored scenarios and test runs.
//!
//! Queries are built with chained `with_` methods and evaluated by stores
//! against full records; field projection happens after matching, so a query
//! may filter on fields the caller did not ask to have populated.

use crate::model::{FeatureUuid, Scenario, ScenarioKey, ScenarioStatus, TestRun, TestRunUuid};
use bitflags::bitflags;
use smol_str::SmolStr;

/// A tag filter: which tags to include and which to exclude.
///
/// A scenario satisfies the selection when it carries at least one included
/// tag (or no tags are included) and none of the excluded tags. Exclusion
/// always wins: a tag that is both included and excluded rejects the
/// scenario. Tags are matched against a scenario's `all_tags`, so feature
/// tags count.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagSelection {
    included: Vec<SmolStr>,
    excluded: Vec<SmolStr>,
}

impl TagSelection {
    /// Creates an empty selection, which matches every scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag to the included set.
    pub fn include(mut self, tag: impl Into<SmolStr>) -> Self {
        self.included.push(tag.into());
        self
    }

    /// Adds a tag to the excluded set.
    pub fn exclude(mut self, tag: impl Into<SmolStr>) -> Self {
        self.excluded.push(tag.into());
        self
    }

    /// Returns the included tags.
    pub fn included(&self) -> &[SmolStr] {
        &self.included
    }

    /// Returns the excluded tags.
    pub fn excluded(&self) -> &[SmolStr] {
        &self.excluded
    }

    /// Returns true if neither included nor excluded tags are set.
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }

    /// Returns true if any excluded tags are set.
    pub fn has_exclusions(&self) -> bool {
        !self.excluded.is_empty()
    }

    /// Evaluates the selection against a scenario's tags.
    pub fn matches(&self, tags: &[SmolStr]) -> bool {
        if self.excluded.iter().any(|tag| tags.contains(tag)) {
            return false;
        }
        self.included.is_empty() || self.included.iter().any(|tag| tags.contains(tag))
    }
}

bitflags! {
    /// Selects which fields [`Scenario::project`] populates.
    ///
    /// Identity fields are always populated regardless of this selection.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ScenarioFields: u16 {
        /// Keyword and name.
        const INFO = 1 << 0;
        /// Description block.
        const DESCRIPTION = 1 << 1;
        /// Overall status.
        const STATUS = 1 << 2;
        /// Review flag.
        const REVIEWED = 1 << 3;
        /// Tags declared on the scenario.
        const TAGS = 1 << 4;
        /// Scenario tags plus inherited feature tags.
        const ALL_TAGS = 1 << 5;
        /// Steps with their results.
        const STEPS = 1 << 6;
        /// First step error message.
        const ERROR_MESSAGE = 1 << 7;
        /// Attachment payloads.
        const ATTACHMENTS = 1 << 8;

        /// Fields populated for scenario listings.
        const LIST_ITEM = Self::INFO.bits() | Self::STATUS.bits() | Self::TAGS.bits();
        /// Fields populated for failure listings.
        const FAILURE_ITEM = Self::LIST_ITEM.bits() | Self::ERROR_MESSAGE.bits();
    }
}

/// A query over stored scenarios.
///
/// All filters are conjunctive. An empty query matches every scenario.
#[derive(Clone, Debug, Default)]
pub struct ScenarioQuery {
    test_run_id: Option<TestRunUuid>,
    feature_id: Option<FeatureUuid>,
    scenario_key: Option<ScenarioKey>,
    status: Option<ScenarioStatus>,
    name: Option<String>,
    tag_selection: TagSelection,
    search: Option<String>,
    having_error_message: bool,
    ordered_by_name: bool,
}

impl ScenarioQuery {
    /// Creates a query matching every scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to one test run.
    pub fn with_test_run_id(mut self, test_run_id: TestRunUuid) -> Self {
        self.test_run_id = Some(test_run_id);
        self
    }

    /// Restricts the query to one feature.
    pub fn with_feature_id(mut self, feature_id: FeatureUuid) -> Self {
        self.feature_id = Some(feature_id);
        self
    }

    /// Restricts the query to records with the given scenario key.
    pub fn with_scenario_key(mut self, scenario_key: ScenarioKey) -> Self {
        self.scenario_key = Some(scenario_key);
        self
    }

    /// Restricts the query to scenarios with the given status.
    pub fn with_status(mut self, status: ScenarioStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the query to scenarios with exactly the given name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Applies a tag selection.
    pub fn with_tag_selection(mut self, tag_selection: TagSelection) -> Self {
        self.tag_selection = tag_selection;
        self
    }

    /// Restricts the query to scenarios whose name or description contains
    /// the given text, case-insensitively.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into().to_lowercase());
        self
    }

    /// Restricts the query to scenarios carrying a non-empty error message.
    pub fn having_error_message(mut self) -> Self {
        self.having_error_message = true;
        self
    }

    /// Orders results by scenario name. Records with equal names keep their
    /// insertion order.
    pub fn ordered_by_name(mut self) -> Self {
        self.ordered_by_name = true;
        self
    }

    /// Returns the test run filter, if set.
    pub fn test_run_id(&self) -> Option<TestRunUuid> {
        self.test_run_id
    }

    /// Returns the tag selection.
    pub fn tag_selection(&self) -> &TagSelection {
        &self.tag_selection
    }

    /// Returns true if results should be ordered by name.
    pub fn is_ordered_by_name(&self) -> bool {
        self.ordered_by_name
    }

    /// Evaluates all filters against a full record.
    pub fn matches(&self, scenario: &Scenario) -> bool {
        if let Some(test_run_id) = self.test_run_id {
            if scenario.test_run_id != test_run_id {
                return false;
            }
        }
        if let Some(feature_id) = self.feature_id {
            if scenario.feature_id != feature_id {
                return false;
            }
        }
        if let Some(scenario_key) = &self.scenario_key {
            if scenario.scenario_key != *scenario_key {
                return false;
            }
        }
        if let Some(status) = self.status {
            if scenario.status != status {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if scenario.info.name != *name {
                return false;
            }
        }
        if !self.tag_selection.matches(&scenario.all_tags) {
            return false;
        }
        if let Some(search) = &self.search {
            let name_matches = scenario.info.name.to_lowercase().contains(search);
            let description_matches = scenario
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(search));
            if !name_matches && !description_matches {
                return false;
            }
        }
        if self.having_error_message
            && scenario
                .error_message
                .as_deref()
                .is_none_or(|message| message.is_empty())
        {
            return false;
        }
        true
    }
}

/// A query over test runs.
#[derive(Clone, Debug, Default)]
pub struct TestRunQuery {
    environment: Option<String>,
    latest_first: bool,
}

impl TestRunQuery {
    /// Creates a query matching every run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to runs with the given environment label.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Orders results by creation time, most recent first. Runs with equal
    /// times keep their insertion order.
    pub fn ordered_latest_first(mut self) -> Self {
        self.latest_first = true;
        self
    }

    /// Returns true if results should be ordered most recent first.
    pub fn is_ordered_latest_first(&self) -> bool {
        self.latest_first
    }

    /// Evaluates all filters against a run.
    pub fn matches(&self, test_run: &TestRun) -> bool {
        if let Some(environment) = &self.environment {
            if test_run.environment != *environment {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BasicInfo, ScenarioUuid};
    use proptest::collection::vec;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn make_scenario(name: &str, all_tags: &[&str]) -> Scenario {
        Scenario {
            id: ScenarioUuid::new_v4(),
            scenario_key: ScenarioKey::derive("features/demo.feature", name),
            test_run_id: TestRunUuid::new_v4(),
            feature_id: FeatureUuid::new_v4(),
            info: BasicInfo::new("Scenario", name),
            description: None,
            status: ScenarioStatus::Passed,
            reviewed: false,
            tags: Vec::new(),
            all_tags: all_tags.iter().map(|t| SmolStr::new(t)).collect(),
            steps: Vec::new(),
            error_message: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = ScenarioQuery::new();
        assert!(query.matches(&make_scenario("any", &["@a"])));
        assert!(query.matches(&make_scenario("other", &[])));
    }

    #[test]
    fn filters_are_conjunctive() {
        let scenario = make_scenario("Pay by card", &["@payment"]);
        let matching = ScenarioQuery::new()
            .with_test_run_id(scenario.test_run_id)
            .with_status(ScenarioStatus::Passed)
            .with_tag_selection(TagSelection::new().include("@payment"));
        assert!(matching.matches(&scenario));

        let wrong_status = ScenarioQuery::new()
            .with_test_run_id(scenario.test_run_id)
            .with_status(ScenarioStatus::Failed);
        assert!(!wrong_status.matches(&scenario));
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let mut scenario = make_scenario("Pay by card", &[]);
        scenario.description = Some("Uses the ACME gateway".to_owned());

        assert!(ScenarioQuery::new().with_search("PAY BY").matches(&scenario));
        assert!(ScenarioQuery::new().with_search("acme").matches(&scenario));
        assert!(!ScenarioQuery::new().with_search("refund").matches(&scenario));
    }

    #[test]
    fn name_filter_is_exact() {
        let scenario = make_scenario("Pay by card", &[]);
        assert!(ScenarioQuery::new().with_name("Pay by card").matches(&scenario));
        assert!(!ScenarioQuery::new().with_name("Pay by").matches(&scenario));
        assert!(!ScenarioQuery::new().with_name("pay by card").matches(&scenario));
    }

    #[test]
    fn having_error_message_rejects_empty_messages() {
        let mut scenario = make_scenario("Pay by card", &[]);
        let query = ScenarioQuery::new().having_error_message();

        assert!(!query.matches(&scenario));
        scenario.error_message = Some(String::new());
        assert!(!query.matches(&scenario));
        scenario.error_message = Some("boom".to_owned());
        assert!(query.matches(&scenario));
    }

    #[test]
    fn tag_selection_requires_any_included_tag() {
        let selection = TagSelection::new().include("@a").include("@b");
        assert!(selection.matches(&["@b".into()]));
        assert!(selection.matches(&["@a".into(), "@c".into()]));
        assert!(!selection.matches(&["@c".into()]));
        assert!(!selection.matches(&[]));
    }

    #[test]
    fn projection_field_sets_compose() {
        assert!(ScenarioFields::LIST_ITEM.contains(ScenarioFields::INFO));
        assert!(ScenarioFields::FAILURE_ITEM.contains(ScenarioFields::LIST_ITEM));
        assert!(!ScenarioFields::LIST_ITEM.contains(ScenarioFields::STEPS));
    }

    fn tag_strategy() -> impl Strategy<Value = SmolStr> {
        "@[a-d]{1,3}".prop_map(SmolStr::from)
    }

    #[proptest]
    fn empty_selection_matches_any_tags(
        #[strategy(vec(tag_strategy(), 0..6))] tags: Vec<SmolStr>,
    ) {
        prop_assert!(TagSelection::new().matches(&tags));
    }

    #[proptest]
    fn exclusion_always_wins(
        #[strategy(tag_strategy())] tag: SmolStr,
        #[strategy(vec(tag_strategy(), 0..6))] other_tags: Vec<SmolStr>,
    ) {
        let mut tags = other_tags;
        tags.push(tag.clone());
        let selection = TagSelection::new().include(tag.clone()).exclude(tag);
        prop_assert!(!selection.matches(&tags));
    }

    #[proptest]
    fn inclusion_is_any_of(
        #[strategy(tag_strategy())] included: SmolStr,
        #[strategy(tag_strategy())] other_included: SmolStr,
        #[strategy(vec(tag_strategy(), 0..6))] other_tags: Vec<SmolStr>,
    ) {
        let mut tags = other_tags;
        tags.push(included.clone());
        let selection = TagSelection::new()
            .include(included)
            .include(other_included);
        prop_assert!(selection.matches(&tags));
    }
}
