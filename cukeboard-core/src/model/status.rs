// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::StatusParseError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Result status of a scenario, derived from its step statuses.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioStatus {
    /// Every step passed.
    Passed,
    /// At least one step failed.
    Failed,
    /// The scenario was not fully executed.
    #[default]
    Skipped,
    /// At least one step definition reported a pending implementation.
    Pending,
    /// At least one step had no matching step definition, or matched more
    /// than one.
    Undefined,
}

impl ScenarioStatus {
    /// Derives the scenario status from its step statuses, in order of
    /// precedence: failed, then undefined, then pending. A scenario only
    /// counts as passed if every step passed; anything else, including an
    /// empty scenario, is skipped.
    pub fn from_step_statuses(statuses: impl IntoIterator<Item = StepStatus>) -> Self {
        let mut any_passed = false;
        let mut any_skipped = false;
        let mut any_pending = false;
        let mut any_undefined = false;
        for status in statuses {
            match status {
                StepStatus::Failed => return ScenarioStatus::Failed,
                StepStatus::Undefined | StepStatus::Ambiguous => any_undefined = true,
                StepStatus::Pending => any_pending = true,
                StepStatus::Skipped => any_skipped = true,
                StepStatus::Passed => any_passed = true,
            }
        }
        if any_undefined {
            ScenarioStatus::Undefined
        } else if any_pending {
            ScenarioStatus::Pending
        } else if any_passed && !any_skipped {
            ScenarioStatus::Passed
        } else {
            ScenarioStatus::Skipped
        }
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScenarioStatus::Passed => "PASSED",
            ScenarioStatus::Failed => "FAILED",
            ScenarioStatus::Skipped => "SKIPPED",
            ScenarioStatus::Pending => "PENDING",
            ScenarioStatus::Undefined => "UNDEFINED",
        };
        f.write_str(s)
    }
}

impl FromStr for ScenarioStatus {
    type Err = StatusParseError;

    /// Parses the `Display` form, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PASSED" => Ok(ScenarioStatus::Passed),
            "FAILED" => Ok(ScenarioStatus::Failed),
            "SKIPPED" => Ok(ScenarioStatus::Skipped),
            "PENDING" => Ok(ScenarioStatus::Pending),
            "UNDEFINED" => Ok(ScenarioStatus::Undefined),
            _ => Err(StatusParseError::new(s)),
        }
    }
}

/// Result status of a single step.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// The step ran and succeeded.
    Passed,
    /// The step ran and failed.
    Failed,
    /// The step was not executed, usually because an earlier step failed.
    #[default]
    Skipped,
    /// The step definition reported a pending implementation.
    Pending,
    /// No step definition matched this step.
    Undefined,
    /// More than one step definition matched this step.
    Ambiguous,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Passed => "PASSED",
            StepStatus::Failed => "FAILED",
            StepStatus::Skipped => "SKIPPED",
            StepStatus::Pending => "PENDING",
            StepStatus::Undefined => "UNDEFINED",
            StepStatus::Ambiguous => "AMBIGUOUS",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[], ScenarioStatus::Skipped; "no steps")]
    #[test_case(&[StepStatus::Passed, StepStatus::Passed], ScenarioStatus::Passed; "all passed")]
    #[test_case(&[StepStatus::Passed, StepStatus::Failed, StepStatus::Skipped], ScenarioStatus::Failed; "failure wins")]
    #[test_case(&[StepStatus::Undefined, StepStatus::Failed], ScenarioStatus::Failed; "failure beats undefined")]
    #[test_case(&[StepStatus::Passed, StepStatus::Pending, StepStatus::Undefined], ScenarioStatus::Undefined; "undefined beats pending and passed")]
    #[test_case(&[StepStatus::Ambiguous, StepStatus::Pending], ScenarioStatus::Undefined; "ambiguous counts as undefined")]
    #[test_case(&[StepStatus::Passed, StepStatus::Pending, StepStatus::Skipped], ScenarioStatus::Pending; "pending beats skipped")]
    #[test_case(&[StepStatus::Passed, StepStatus::Skipped], ScenarioStatus::Skipped; "partial execution is skipped")]
    #[test_case(&[StepStatus::Skipped, StepStatus::Skipped], ScenarioStatus::Skipped; "all skipped")]
    fn derive_scenario_status(steps: &[StepStatus], expected: ScenarioStatus) {
        assert_eq!(
            ScenarioStatus::from_step_statuses(steps.iter().copied()),
            expected
        );
    }

    #[test]
    fn scenario_status_round_trips_through_from_str() {
        for status in [
            ScenarioStatus::Passed,
            ScenarioStatus::Failed,
            ScenarioStatus::Skipped,
            ScenarioStatus::Pending,
            ScenarioStatus::Undefined,
        ] {
            assert_eq!(status.to_string().parse::<ScenarioStatus>().unwrap(), status);
        }
        assert_eq!("failed".parse::<ScenarioStatus>().unwrap(), ScenarioStatus::Failed);
        assert!("flaky".parse::<ScenarioStatus>().is_err());
    }

    #[test]
    fn statuses_serialize_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ScenarioStatus::Failed).unwrap(),
            r#""FAILED""#
        );
        assert_eq!(
            serde_json::to_string(&StepStatus::Ambiguous).unwrap(),
            r#""AMBIGUOUS""#
        );
        let parsed: ScenarioStatus = serde_json::from_str(r#""UNDEFINED""#).unwrap();
        assert_eq!(parsed, ScenarioStatus::Undefined);
    }
}
