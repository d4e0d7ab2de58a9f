// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{ParseError, SerializeError};
use serde::{Deserialize, Serialize};
use std::{io, time::Duration};

/// A complete Cucumber JSON report: the contents of one `report.json` file.
///
/// On the wire this is a JSON array of [`Feature`]s; the struct is
/// `#[serde(transparent)]` over that array.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Report {
    /// The features that were executed, in report order.
    pub features: Vec<Feature>,
}

impl Report {
    /// Creates a new, empty `Report`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a report from a JSON string.
    #[expect(clippy::should_implement_trait, reason = "mirrors serde_json's API")]
    pub fn from_str(input: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parses a report from JSON bytes.
    pub fn from_slice(input: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(input)?)
    }

    /// Parses a report from a reader producing JSON.
    pub fn from_reader(reader: impl io::Read) -> Result<Self, ParseError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serializes this report to a JSON string.
    #[expect(clippy::inherent_to_string, reason = "fallible, unlike Display")]
    pub fn to_string(&self) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds a feature to this report.
    pub fn add_feature(&mut self, feature: Feature) -> &mut Self {
        self.features.push(feature);
        self
    }

    /// Iterates over all scenario elements in the report, skipping
    /// backgrounds.
    pub fn scenarios(&self) -> impl Iterator<Item = (&Feature, &Element)> {
        self.features.iter().flat_map(|feature| {
            feature
                .elements
                .iter()
                .filter(|element| element.kind == ElementKind::Scenario)
                .map(move |element| (feature, element))
        })
    }
}

/// One feature in a report, holding the elements that were executed for it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Feature {
    /// The path of the feature file, relative to the project root.
    #[serde(default)]
    pub uri: String,

    /// The identifier Cucumber derived from the feature name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The Gherkin keyword, localized (usually `"Feature"`).
    #[serde(default)]
    pub keyword: String,

    /// The feature name.
    #[serde(default)]
    pub name: String,

    /// The free-form description under the feature line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The line of the `Feature:` keyword in the feature file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Tags placed on the feature.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    /// The scenarios and backgrounds executed for this feature.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,
}

impl Feature {
    /// Creates a new `Feature` with the given URI and name.
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            keyword: "Feature".to_owned(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a tag to this feature.
    pub fn add_tag(&mut self, tag: impl Into<Tag>) -> &mut Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds an element (scenario or background) to this feature.
    pub fn add_element(&mut self, element: Element) -> &mut Self {
        self.elements.push(element);
        self
    }

    /// The tag names on this feature, stripped of nothing -- Cucumber keeps
    /// the leading `@` in the name and so does this crate.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name.as_str())
    }
}

/// The kind of an [`Element`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A regular scenario, or one row of a scenario outline.
    #[default]
    Scenario,

    /// A background executed before each scenario of the feature.
    Background,
}

/// One element of a feature: a scenario, a scenario-outline row, or a
/// background.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Element {
    /// The identifier Cucumber derived from the feature and scenario names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The Gherkin keyword (`"Scenario"`, `"Scenario Outline"`,
    /// `"Background"`), localized.
    #[serde(default)]
    pub keyword: String,

    /// Whether this element is a scenario or a background.
    #[serde(rename = "type", default)]
    pub kind: ElementKind,

    /// The scenario name.
    #[serde(default)]
    pub name: String,

    /// The free-form description under the scenario line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The line of the scenario in the feature file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Tags placed on the scenario (feature tags are not repeated here).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    /// The steps of the scenario, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,

    /// Before-hooks that ran for this scenario.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<Hook>,

    /// After-hooks that ran for this scenario.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<Hook>,
}

impl Element {
    /// Creates a new scenario element with the given name.
    pub fn new_scenario(name: impl Into<String>) -> Self {
        Self {
            keyword: "Scenario".to_owned(),
            kind: ElementKind::Scenario,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a new background element.
    pub fn new_background() -> Self {
        Self {
            keyword: "Background".to_owned(),
            kind: ElementKind::Background,
            ..Self::default()
        }
    }

    /// Adds a tag to this element.
    pub fn add_tag(&mut self, tag: impl Into<Tag>) -> &mut Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds a step to this element.
    pub fn add_step(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// The tag names on this element.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name.as_str())
    }

    /// The statuses of this element's steps, in execution order.
    pub fn step_statuses(&self) -> impl Iterator<Item = Status> + '_ {
        self.steps
            .iter()
            .map(|step| step.result.as_ref().map_or(Status::Skipped, |r| r.status))
    }
}

/// A tag attached to a feature or scenario, `@`-prefix included.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Tag {
    /// The tag text, including the leading `@`.
    pub name: String,

    /// The line the tag appears on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl<T: Into<String>> From<T> for Tag {
    fn from(name: T) -> Self {
        Self {
            name: name.into(),
            line: None,
        }
    }
}

/// One step of a scenario or background.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Step {
    /// The Gherkin keyword including its trailing space (`"Given "`,
    /// `"When "`, …), localized.
    #[serde(default)]
    pub keyword: String,

    /// The step text, without the keyword.
    #[serde(default)]
    pub name: String,

    /// The line of the step in the feature file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// The step definition the step matched, if any.
    #[serde(
        rename = "match",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub step_match: Option<StepMatch>,

    /// The outcome of executing this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StepResult>,

    /// Attachments embedded while the step ran.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Embedding>,
}

impl Step {
    /// Creates a new `Step` with the given keyword and text.
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the result of this step.
    pub fn set_result(&mut self, result: StepResult) -> &mut Self {
        self.result = Some(result);
        self
    }

    /// Sets the matched step definition location.
    pub fn set_match(&mut self, location: impl Into<String>) -> &mut Self {
        self.step_match = Some(StepMatch {
            location: Some(location.into()),
        });
        self
    }

    /// Adds an embedding to this step.
    pub fn add_embedding(&mut self, embedding: Embedding) -> &mut Self {
        self.embeddings.push(embedding);
        self
    }

    /// The status of this step; an absent result reads as
    /// [`Status::Skipped`].
    pub fn status(&self) -> Status {
        self.result.as_ref().map_or(Status::Skipped, |r| r.status)
    }
}

/// The step definition a step matched.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StepMatch {
    /// The location of the matched definition, usually `"path/to/file:line"`.
    ///
    /// Undefined steps carry a match object with no location in some
    /// implementations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl StepMatch {
    /// Splits the location into its path and line parts.
    ///
    /// Returns `None` if there is no location or it does not end in
    /// `:<line>`.
    pub fn split_location(&self) -> Option<(&str, u32)> {
        let location = self.location.as_deref()?;
        let (path, line) = location.rsplit_once(':')?;
        let line = line.parse().ok()?;
        if path.is_empty() {
            return None;
        }
        Some((path, line))
    }
}

/// The outcome of executing one step or hook.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StepResult {
    /// The resulting status.
    pub status: Status,

    /// Wall-clock duration in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    /// The error message, for failed and pending steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StepResult {
    /// Creates a new `StepResult` with the given status.
    pub fn new(status: Status) -> Self {
        Self {
            status,
            duration: None,
            error_message: None,
        }
    }

    /// Sets the duration, converted to whole nanoseconds.
    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.duration = Some(duration.as_nanos().try_into().unwrap_or(u64::MAX));
        self
    }

    /// Sets the error message.
    pub fn set_error_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.error_message = Some(message.into());
        self
    }

    /// The duration as a [`Duration`], if recorded.
    pub fn duration(&self) -> Option<Duration> {
        self.duration.map(Duration::from_nanos)
    }
}

/// The status of one executed step, as reported by Cucumber.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The step ran and succeeded.
    Passed,

    /// The step ran and failed.
    Failed,

    /// The step was skipped, usually because an earlier step failed.
    Skipped,

    /// The step matched a definition marked pending.
    Pending,

    /// No step definition matched the step.
    Undefined,

    /// More than one step definition matched the step.
    Ambiguous,

    /// A status this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Returns true if this status is `Passed`.
    pub fn is_passed(self) -> bool {
        self == Self::Passed
    }

    /// Returns true if this status is `Failed`.
    pub fn is_failed(self) -> bool {
        self == Self::Failed
    }
}

/// A before- or after-hook that ran around a scenario.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Hook {
    /// The hook's source location.
    #[serde(
        rename = "match",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub step_match: Option<StepMatch>,

    /// The outcome of running the hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StepResult>,

    /// Attachments embedded while the hook ran.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Embedding>,
}

/// An attachment embedded into the report, base64-encoded.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Embedding {
    /// The MIME type of the payload.
    pub mime_type: String,

    /// The payload, base64-encoded as in the report file.
    pub data: String,

    /// An optional attachment name (cucumber-js).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Embedding {
    /// Creates a new `Embedding`.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
            name: None,
        }
    }
}
