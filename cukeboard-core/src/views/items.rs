// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::model::{
    BasicInfo, Scenario, ScenarioKey, ScenarioStatus, ScenarioUuid, Step, StepDefinitionLocation,
    StepStatus, TestRun,
};
use serde::Serialize;
use smol_str::SmolStr;

/// One row of a scenario listing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioListItemView {
    /// Record identifier.
    pub id: ScenarioUuid,
    /// Keyword and name.
    pub info: BasicInfo,
    /// Tags declared on the scenario.
    pub tags: Vec<SmolStr>,
    /// Overall status.
    pub status: ScenarioStatus,
}

impl ScenarioListItemView {
    /// Builds the view from a record projected with at least
    /// [`ScenarioFields::LIST_ITEM`](crate::query::ScenarioFields::LIST_ITEM).
    pub fn from_scenario(scenario: Scenario) -> Self {
        Self {
            id: scenario.id,
            info: scenario.info,
            tags: scenario.tags,
            status: scenario.status,
        }
    }
}

/// One row of a failure listing: a scenario listing row plus the error
/// message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FailedScenarioListItemView {
    /// Record identifier.
    pub id: ScenarioUuid,
    /// Keyword and name.
    pub info: BasicInfo,
    /// Tags declared on the scenario.
    pub tags: Vec<SmolStr>,
    /// Overall status.
    pub status: ScenarioStatus,
    /// First error message reported by a step. Empty if the record carried
    /// none.
    pub error_message: String,
}

impl FailedScenarioListItemView {
    /// Builds the view from a record projected with at least
    /// [`ScenarioFields::FAILURE_ITEM`](crate::query::ScenarioFields::FAILURE_ITEM).
    pub fn from_scenario(scenario: Scenario) -> Self {
        Self {
            id: scenario.id,
            info: scenario.info,
            tags: scenario.tags,
            status: scenario.status,
            error_message: scenario.error_message.unwrap_or_default(),
        }
    }
}

/// A group of failed scenarios whose error messages describe the same
/// underlying failure.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupedFailuresListItemView {
    /// The error message of the scenario that opened the group.
    pub error_message: String,
    /// The grouped failures, ordered by scenario name.
    pub failed_scenarios: Vec<FailedScenarioListItemView>,
}

/// The recorded usages of one step definition.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupedStepsListItemView {
    /// Where the step definition lives.
    pub definition_location: StepDefinitionLocation,
    /// The steps backed by it, ordered by step text.
    pub occurrences: Vec<StepOccurrenceView>,
}

/// One step occurrence within a step definition usage report.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StepOccurrenceView {
    /// Keyword and text of the step.
    pub info: BasicInfo,
    /// Result status.
    pub status: StepStatus,
}

impl StepOccurrenceView {
    /// Builds the view from one recorded step.
    pub fn from_step(step: &Step) -> Self {
        Self {
            info: step.info.clone(),
            status: step.status,
        }
    }
}

/// One run's result for a scenario, within its cross-run history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioHistoryItemView {
    /// Record identifier within that run.
    pub id: ScenarioUuid,
    /// Stable identity across runs.
    pub scenario_key: ScenarioKey,
    /// Status in that run.
    pub status: ScenarioStatus,
    /// The run the result belongs to.
    pub test_run: TestRun,
}

impl ScenarioHistoryItemView {
    /// Builds the view from a record and the run it belongs to.
    pub fn from_scenario(scenario: Scenario, test_run: TestRun) -> Self {
        Self {
            id: scenario.id,
            scenario_key: scenario.scenario_key,
            status: scenario.status,
            test_run,
        }
    }
}
