// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record factories shared by store and view tests.

use crate::model::{
    BasicInfo, FeatureUuid, Scenario, ScenarioKey, ScenarioStatus, ScenarioUuid, Step,
    StepDefinitionLocation, StepStatus, TestRun,
};

pub(crate) fn make_run(environment: &str) -> TestRun {
    TestRun::new(environment)
}

/// Builds a scenario for the given run. The key is derived from the name, so
/// scenarios with the same name in different runs share a key.
pub(crate) fn make_scenario(run: &TestRun, name: &str, status: ScenarioStatus) -> Scenario {
    Scenario {
        id: ScenarioUuid::new_v4(),
        scenario_key: ScenarioKey::derive("features/demo.feature", name),
        test_run_id: run.id,
        feature_id: FeatureUuid::new_v4(),
        info: BasicInfo::new("Scenario", name),
        description: None,
        status,
        reviewed: false,
        tags: Vec::new(),
        all_tags: Vec::new(),
        steps: Vec::new(),
        error_message: None,
        attachments: Vec::new(),
    }
}

/// Builds a failed scenario carrying an error message, for failure grouping
/// tests.
pub(crate) fn make_failed_scenario(run: &TestRun, name: &str, error_message: &str) -> Scenario {
    let mut scenario = make_scenario(run, name, ScenarioStatus::Failed);
    scenario.error_message = Some(error_message.to_owned());
    scenario
}

/// Builds a step backed by a definition at the given location.
pub(crate) fn make_step(name: &str, status: StepStatus, file_path: &str, line: u32) -> Step {
    Step {
        info: BasicInfo::new("Given", name),
        status,
        definition_location: Some(StepDefinitionLocation::new(file_path, line)),
        error_message: None,
        duration: None,
    }
}
