// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::model::TestRunUuid;
use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

/// A test run: the container that Cucumber reports are imported into.
///
/// Runs are ordered by `date`; "latest" always means the run with the most
/// recent creation time, not the most recent import.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestRun {
    /// Unique identifier.
    pub id: TestRunUuid,
    /// Environment label for this run, e.g. `ci` or `staging`.
    pub environment: String,
    /// Creation time.
    pub date: DateTime<FixedOffset>,
}

impl TestRun {
    /// Creates a run stamped with the current local time.
    pub fn new(environment: impl Into<String>) -> Self {
        Self::new_at(environment, Local::now().fixed_offset())
    }

    /// Creates a run with an explicit creation time.
    pub fn new_at(environment: impl Into<String>, date: DateTime<FixedOffset>) -> Self {
        Self {
            id: TestRunUuid::new_v4(),
            environment: environment.into(),
            date,
        }
    }
}
