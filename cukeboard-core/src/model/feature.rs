// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::model::{BasicInfo, FeatureKey, FeatureUuid, TestRunUuid};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A feature file recorded within a test run.
///
/// Feature tags are not matched directly by queries; at import time they
/// are folded into each scenario's `all_tags`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Feature {
    /// Unique identifier of this record.
    pub id: FeatureUuid,
    /// Stable identity across runs.
    pub feature_key: FeatureKey,
    /// The run this record belongs to.
    pub test_run_id: TestRunUuid,
    /// Source URI as reported by Cucumber, usually a relative path.
    pub uri: String,
    /// Keyword and name.
    pub info: BasicInfo,
    /// Description block under the feature line, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags declared on the feature line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<SmolStr>,
}

impl Feature {
    /// Creates a feature record for the given run, deriving its key from the
    /// URI.
    pub fn new(test_run_id: TestRunUuid, uri: impl Into<String>, info: BasicInfo) -> Self {
        let uri = uri.into();
        Self {
            id: FeatureUuid::new_v4(),
            feature_key: FeatureKey::derive(&uri),
            test_run_id,
            uri,
            info,
            description: None,
            tags: Vec::new(),
        }
    }
}
