// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::ViewError,
    model::{ScenarioKey, ScenarioStatus, ScenarioUuid, StepDefinitionLocation, TestRunUuid},
    query::{ScenarioFields, ScenarioQuery, TestRunQuery},
    store::{ScenarioStore, TestRunStore},
    views::{
        FailedScenarioListItemView, GroupedFailuresListItemView, GroupedStepsListItemView,
        NormalizingMatcher, ScenarioHistoryItemView, ScenarioListItemView, ScenarioStats,
        ScenarioTagStats, SimilarityMatcher, StepOccurrenceView,
    },
};
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::cmp::Reverse;

/// Read-side access to scenarios: listings, groupings, statistics and
/// history.
///
/// Every operation runs against the snapshot its query takes, so a single
/// call sees a consistent state even while imports are running.
#[derive(Debug)]
pub struct ScenarioViewAccess<'store, S> {
    store: &'store S,
    matcher: Box<dyn SimilarityMatcher + Send + Sync>,
}

impl<'store, S: ScenarioStore> ScenarioViewAccess<'store, S> {
    /// Creates a view access with the default similarity matcher.
    pub fn new(store: &'store S) -> Self {
        Self::with_matcher(store, Box::new(NormalizingMatcher::default()))
    }

    /// Creates a view access that groups failures with the given matcher.
    pub fn with_matcher(
        store: &'store S,
        matcher: Box<dyn SimilarityMatcher + Send + Sync>,
    ) -> Self {
        Self { store, matcher }
    }

    /// Lists the scenarios matching a query.
    pub fn scenario_list_items(
        &self,
        query: &ScenarioQuery,
    ) -> Result<Vec<ScenarioListItemView>, ViewError> {
        let stream = self.store.scenarios(query, ScenarioFields::LIST_ITEM)?;
        Ok(stream.map(ScenarioListItemView::from_scenario).collect())
    }

    /// Lists a run's failures that carry an error message, ordered by
    /// scenario name.
    pub fn failed_scenarios(
        &self,
        test_run_id: TestRunUuid,
    ) -> Result<Vec<FailedScenarioListItemView>, ViewError> {
        let query = ScenarioQuery::new()
            .with_test_run_id(test_run_id)
            .with_status(ScenarioStatus::Failed)
            .having_error_message()
            .ordered_by_name();
        let stream = self.store.scenarios(&query, ScenarioFields::FAILURE_ITEM)?;
        Ok(stream.map(FailedScenarioListItemView::from_scenario).collect())
    }

    /// Groups a run's failures by error message similarity.
    ///
    /// Failures are scanned in creation order. Each one joins the first
    /// existing group whose representative message is similar to its own,
    /// or opens a new group with its message as the representative. Group
    /// members come out ordered by scenario name, groups by descending
    /// size; ties keep their scan order.
    pub fn grouped_failures(
        &self,
        test_run_id: TestRunUuid,
    ) -> Result<Vec<GroupedFailuresListItemView>, ViewError> {
        let query = ScenarioQuery::new()
            .with_test_run_id(test_run_id)
            .with_status(ScenarioStatus::Failed)
            .having_error_message();
        let stream = self.store.scenarios(&query, ScenarioFields::FAILURE_ITEM)?;

        let mut groups: Vec<GroupedFailuresListItemView> = Vec::new();
        for scenario in stream {
            let view = FailedScenarioListItemView::from_scenario(scenario);
            let matching = groups
                .iter_mut()
                .find(|group| self.matcher.is_similar(&group.error_message, &view.error_message));
            match matching {
                Some(group) => group.failed_scenarios.push(view),
                None => groups.push(GroupedFailuresListItemView {
                    error_message: view.error_message.clone(),
                    failed_scenarios: vec![view],
                }),
            }
        }

        for group in &mut groups {
            group
                .failed_scenarios
                .sort_by(|a, b| a.info.name.cmp(&b.info.name));
        }
        groups.sort_by_key(|group| Reverse(group.failed_scenarios.len()));
        Ok(groups)
    }

    /// Reports step definition usage across a run: every recorded step that
    /// matched a definition, grouped by the definition's source location.
    ///
    /// Groups come out ordered by descending occurrence count, occurrences
    /// by step text. Steps without a matched definition are not reported.
    pub fn step_definitions(
        &self,
        test_run_id: TestRunUuid,
    ) -> Result<Vec<GroupedStepsListItemView>, ViewError> {
        let query = ScenarioQuery::new().with_test_run_id(test_run_id);
        let stream = self.store.scenarios(&query, ScenarioFields::STEPS)?;

        let mut groups: IndexMap<StepDefinitionLocation, Vec<StepOccurrenceView>> =
            IndexMap::new();
        for scenario in stream {
            for step in &scenario.steps {
                if let Some(location) = &step.definition_location {
                    groups
                        .entry(location.clone())
                        .or_default()
                        .push(StepOccurrenceView::from_step(step));
                }
            }
        }

        let mut views: Vec<GroupedStepsListItemView> = groups
            .into_iter()
            .map(|(definition_location, mut occurrences)| {
                occurrences.sort_by(|a, b| a.info.name.cmp(&b.info.name));
                GroupedStepsListItemView {
                    definition_location,
                    occurrences,
                }
            })
            .collect();
        views.sort_by_key(|view| Reverse(view.occurrences.len()));
        Ok(views)
    }

    /// Computes statistics over the scenarios matching a query.
    pub fn stats(&self, query: &ScenarioQuery) -> Result<ScenarioStats, ViewError> {
        let facts = self.store.status_facts(query)?;
        Ok(ScenarioStats::from_facts(facts))
    }

    /// Computes per-tag statistics over the scenarios matching a query,
    /// ordered by tag.
    ///
    /// A scenario is counted under every tag it carries, including tags
    /// outside the query's included set; a non-empty `whitelist` narrows the
    /// reported tags to the listed ones. Queries with excluded tags are
    /// refused with [`ViewError::ExcludedTagsWithTagStats`].
    pub fn tag_stats(
        &self,
        query: &ScenarioQuery,
        whitelist: &[SmolStr],
    ) -> Result<Vec<ScenarioTagStats>, ViewError> {
        if query.tag_selection().has_exclusions() {
            return Err(ViewError::ExcludedTagsWithTagStats);
        }

        let facts = self.store.tag_facts(query)?;
        let mut per_tag: IndexMap<SmolStr, ScenarioStats> = IndexMap::new();
        for fact in facts {
            for tag in &fact.all_tags {
                if !whitelist.is_empty() && !whitelist.contains(tag) {
                    continue;
                }
                per_tag
                    .entry(tag.clone())
                    .or_default()
                    .record(fact.status, fact.reviewed);
            }
        }
        per_tag.sort_keys();
        Ok(per_tag
            .into_iter()
            .map(|(tag, stats)| ScenarioTagStats { tag, stats })
            .collect())
    }

    /// Finds the other failures in the same run whose error messages are
    /// similar to the given scenario's.
    ///
    /// A scenario without an error message has no associated failures.
    pub fn associated_failures(
        &self,
        id: ScenarioUuid,
    ) -> Result<Vec<FailedScenarioListItemView>, ViewError> {
        let scenario = self.store.scenario(id)?;
        let Some(message) = scenario.error_message.as_deref().filter(|m| !m.is_empty()) else {
            return Ok(Vec::new());
        };

        let failures = self.failed_scenarios(scenario.test_run_id)?;
        Ok(failures
            .into_iter()
            .filter(|failure| {
                failure.id != id && self.matcher.is_similar(message, &failure.error_message)
            })
            .collect())
    }
}

impl<'store, S: ScenarioStore + TestRunStore> ScenarioViewAccess<'store, S> {
    /// Returns the cross-run history of a scenario key, most recent run
    /// first. Runs without a record for the key are omitted.
    pub fn scenario_history(
        &self,
        scenario_key: &ScenarioKey,
    ) -> Result<Vec<ScenarioHistoryItemView>, ViewError> {
        let runs = self.store.test_runs(&TestRunQuery::new().ordered_latest_first())?;
        let mut history = Vec::new();
        for run in runs {
            let query = ScenarioQuery::new()
                .with_test_run_id(run.id)
                .with_scenario_key(scenario_key.clone());
            let mut stream = self.store.scenarios(&query, ScenarioFields::STATUS)?;
            // At most one record per run can carry the key.
            if let Some(scenario) = stream.next() {
                history.push(ScenarioHistoryItemView::from_scenario(scenario, run));
            }
        }
        Ok(history)
    }

    /// Returns the history of the scenario with the given id, resolving its
    /// key first.
    pub fn history_for(
        &self,
        id: ScenarioUuid,
    ) -> Result<Vec<ScenarioHistoryItemView>, ViewError> {
        let scenario = self.store.scenario(id)?;
        self.scenario_history(&scenario.scenario_key)
    }

    /// Returns the most recent result for the first scenario matching the
    /// query, or `None` if nothing matches.
    ///
    /// The match only contributes its key; the returned item is the newest
    /// entry of that key's history, which may come from a different run than
    /// the match itself.
    pub fn last_tested(
        &self,
        query: &ScenarioQuery,
    ) -> Result<Option<ScenarioHistoryItemView>, ViewError> {
        let mut stream = self.store.scenarios(query, ScenarioFields::empty())?;
        let Some(scenario) = stream.next() else {
            return Ok(None);
        };
        Ok(self
            .scenario_history(&scenario.scenario_key)?
            .into_iter()
            .next())
    }
}
