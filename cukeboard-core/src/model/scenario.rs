// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    model::{
        AttachmentUuid, FeatureUuid, ScenarioKey, ScenarioStatus, ScenarioUuid, StepStatus,
        TestRunUuid,
    },
    query::ScenarioFields,
};
use camino::Utf8PathBuf;
use debug_ignore::DebugIgnore;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{fmt, time::Duration};

/// Display identity shared by features, scenarios and steps: the Gherkin
/// keyword and the human-readable name.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BasicInfo {
    /// Gherkin keyword, e.g. `Scenario` or `Given`.
    pub keyword: SmolStr,
    /// Human-readable name.
    pub name: String,
}

impl BasicInfo {
    /// Creates a new `BasicInfo`.
    pub fn new(keyword: impl Into<SmolStr>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
        }
    }
}

/// Source location of a step definition: the file that defines the glue code
/// and the line it starts on.
///
/// Two steps backed by the same definition compare equal on this, which is
/// what step definition usage reports group on.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StepDefinitionLocation {
    /// Path of the source file that defines the step.
    pub file_path: Utf8PathBuf,
    /// Line number within that file.
    pub line: u32,
}

impl StepDefinitionLocation {
    /// Creates a new location.
    pub fn new(file_path: impl Into<Utf8PathBuf>, line: u32) -> Self {
        Self {
            file_path: file_path.into(),
            line,
        }
    }
}

impl fmt::Display for StepDefinitionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_path, self.line)
    }
}

/// A single step within a scenario, in execution order.
///
/// Hook and background steps are recorded alongside regular steps and take
/// part in status derivation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    /// Keyword and text of the step.
    pub info: BasicInfo,
    /// Result status.
    pub status: StepStatus,
    /// Location of the matched step definition, if one matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_location: Option<StepDefinitionLocation>,
    /// Error message produced by the step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock execution time, if the report recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

/// Binary payload captured while a scenario ran, e.g. a screenshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Attachment {
    /// Identifier used to retrieve the payload.
    pub id: AttachmentUuid,
    /// MIME type of the payload.
    pub mime_type: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw contents.
    #[serde(with = "base64_bytes")]
    pub data: DebugIgnore<Vec<u8>>,
}

impl Attachment {
    /// Creates an attachment with a fresh identifier.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: AttachmentUuid::new_v4(),
            mime_type: mime_type.into(),
            name: None,
            data: DebugIgnore(data),
        }
    }
}

/// One scenario execution recorded within a test run.
///
/// `tags` holds the tags written on the scenario itself, while `all_tags`
/// additionally includes tags inherited from the enclosing feature. Queries
/// and statistics match against `all_tags`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scenario {
    /// Unique identifier of this record.
    pub id: ScenarioUuid,
    /// Stable identity across runs.
    pub scenario_key: ScenarioKey,
    /// The run this record belongs to.
    pub test_run_id: TestRunUuid,
    /// The feature this scenario was read from.
    pub feature_id: FeatureUuid,
    /// Keyword and name.
    pub info: BasicInfo,
    /// Description block under the scenario line, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Overall status, derived from the step statuses.
    pub status: ScenarioStatus,
    /// Whether a human has marked this result as reviewed.
    pub reviewed: bool,
    /// Tags declared on the scenario itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<SmolStr>,
    /// Scenario tags plus tags inherited from the feature.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_tags: Vec<SmolStr>,
    /// Steps in execution order, including hook and background steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    /// First error message reported by a step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Attachments captured during execution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Scenario {
    /// Returns the attachment with the given identifier, if present.
    pub fn attachment(&self, id: AttachmentUuid) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == id)
    }

    /// Copies this record, populating only the selected fields.
    ///
    /// Identity fields (`id`, `scenario_key`, `test_run_id`, `feature_id`)
    /// are always populated; unselected fields are left at their default
    /// values.
    pub fn project(&self, fields: ScenarioFields) -> Scenario {
        Scenario {
            id: self.id,
            scenario_key: self.scenario_key.clone(),
            test_run_id: self.test_run_id,
            feature_id: self.feature_id,
            info: if fields.contains(ScenarioFields::INFO) {
                self.info.clone()
            } else {
                BasicInfo::default()
            },
            description: if fields.contains(ScenarioFields::DESCRIPTION) {
                self.description.clone()
            } else {
                None
            },
            status: if fields.contains(ScenarioFields::STATUS) {
                self.status
            } else {
                ScenarioStatus::default()
            },
            reviewed: fields.contains(ScenarioFields::REVIEWED) && self.reviewed,
            tags: if fields.contains(ScenarioFields::TAGS) {
                self.tags.clone()
            } else {
                Vec::new()
            },
            all_tags: if fields.contains(ScenarioFields::ALL_TAGS) {
                self.all_tags.clone()
            } else {
                Vec::new()
            },
            steps: if fields.contains(ScenarioFields::STEPS) {
                self.steps.clone()
            } else {
                Vec::new()
            },
            error_message: if fields.contains(ScenarioFields::ERROR_MESSAGE) {
                self.error_message.clone()
            } else {
                None
            },
            attachments: if fields.contains(ScenarioFields::ATTACHMENTS) {
                self.attachments.clone()
            } else {
                Vec::new()
            },
        }
    }
}

/// Serializes attachment bytes as base64 so persisted documents stay
/// readable.
mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use debug_ignore::DebugIgnore;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S>(
        data: &DebugIgnore<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(&data.0))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DebugIgnore<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom)?;
        Ok(DebugIgnore(bytes))
    }
}
