// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converts parsed Cucumber reports into cukeboard records.
//!
//! Conversion is tolerant: missing or malformed optional pieces of a report
//! degrade to defaults instead of failing the import.

use crate::model::{
    Attachment, BasicInfo, Feature, Scenario, ScenarioKey, ScenarioStatus, ScenarioUuid, Step,
    StepDefinitionLocation, StepStatus, TestRunUuid,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use itertools::Itertools;
use quick_cucumber as report;
use smol_str::SmolStr;
use tracing::warn;

/// The records produced from one Cucumber report.
#[derive(Clone, Debug, Default)]
pub struct ConvertedReport {
    /// Feature records, one per report feature.
    pub features: Vec<Feature>,
    /// Scenario records, one per report scenario.
    pub scenarios: Vec<Scenario>,
}

/// Converts a parsed Cucumber report into records for the given run.
///
/// Hooks and background steps are folded into each scenario's step list in
/// execution order: before-hooks, background steps, scenario steps,
/// after-hooks. Feature tags are folded into each scenario's `all_tags`.
/// Scenario keys are derived from the feature URI and the element's
/// identifier, so rows of a scenario outline keep distinct keys.
pub fn convert_report(test_run_id: TestRunUuid, report: &report::Report) -> ConvertedReport {
    let mut converted = ConvertedReport::default();
    for report_feature in &report.features {
        let feature = convert_feature(test_run_id, report_feature);
        let mut background: Option<&report::Element> = None;
        for element in &report_feature.elements {
            match element.kind {
                report::ElementKind::Background => background = Some(element),
                report::ElementKind::Scenario => {
                    converted
                        .scenarios
                        .push(convert_scenario(&feature, background.take(), element));
                }
            }
        }
        converted.features.push(feature);
    }
    converted
}

fn convert_feature(test_run_id: TestRunUuid, feature: &report::Feature) -> Feature {
    let mut record = Feature::new(
        test_run_id,
        feature.uri.clone(),
        BasicInfo::new(feature.keyword.trim(), feature.name.clone()),
    );
    record.description = non_empty(feature.description.as_deref());
    record.tags = dedup_tags(feature.tag_names());
    record
}

fn convert_scenario(
    feature: &Feature,
    background: Option<&report::Element>,
    element: &report::Element,
) -> Scenario {
    let mut steps = Vec::new();
    let mut attachments = Vec::new();

    for hook in &element.before {
        steps.push(convert_hook("Before", hook));
        collect_embeddings(&hook.embeddings, &mut attachments);
    }
    if let Some(background) = background {
        for step in &background.steps {
            steps.push(convert_step(step));
            collect_embeddings(&step.embeddings, &mut attachments);
        }
    }
    for step in &element.steps {
        steps.push(convert_step(step));
        collect_embeddings(&step.embeddings, &mut attachments);
    }
    for hook in &element.after {
        steps.push(convert_hook("After", hook));
        collect_embeddings(&hook.embeddings, &mut attachments);
    }

    let status = ScenarioStatus::from_step_statuses(steps.iter().map(|s| s.status));
    let error_message = steps
        .iter()
        .find_map(|s| s.error_message.as_deref().filter(|m| !m.is_empty()))
        .map(str::to_owned);

    let tags = dedup_tags(element.tag_names());
    let all_tags: Vec<SmolStr> = tags.iter().chain(&feature.tags).cloned().unique().collect();

    // Cucumber's element id encodes the feature, the scenario and the
    // outline row, which makes it the most stable identity available.
    let key_source = element.id.as_deref().unwrap_or(&element.name);

    Scenario {
        id: ScenarioUuid::new_v4(),
        scenario_key: ScenarioKey::derive(&feature.uri, key_source),
        test_run_id: feature.test_run_id,
        feature_id: feature.id,
        info: BasicInfo::new(element.keyword.trim(), element.name.clone()),
        description: non_empty(element.description.as_deref()),
        status,
        reviewed: false,
        tags,
        all_tags,
        steps,
        error_message,
        attachments,
    }
}

fn convert_step(step: &report::Step) -> Step {
    Step {
        info: BasicInfo::new(step.keyword.trim(), step.name.clone()),
        status: step_status(step.status()),
        definition_location: step
            .step_match
            .as_ref()
            .and_then(|m| m.split_location())
            .map(|(path, line)| StepDefinitionLocation::new(path, line)),
        error_message: step.result.as_ref().and_then(|r| r.error_message.clone()),
        duration: step.result.as_ref().and_then(|r| r.duration()),
    }
}

fn convert_hook(keyword: &str, hook: &report::Hook) -> Step {
    // Hooks have no step text; the glue location is the best display name
    // the report offers.
    let name = hook
        .step_match
        .as_ref()
        .and_then(|m| m.location.clone())
        .unwrap_or_default();
    Step {
        info: BasicInfo::new(keyword, name),
        status: hook
            .result
            .as_ref()
            .map_or(StepStatus::Skipped, |r| step_status(r.status)),
        definition_location: hook
            .step_match
            .as_ref()
            .and_then(|m| m.split_location())
            .map(|(path, line)| StepDefinitionLocation::new(path, line)),
        error_message: hook.result.as_ref().and_then(|r| r.error_message.clone()),
        duration: hook.result.as_ref().and_then(|r| r.duration()),
    }
}

fn step_status(status: report::Status) -> StepStatus {
    match status {
        report::Status::Passed => StepStatus::Passed,
        report::Status::Failed => StepStatus::Failed,
        report::Status::Skipped => StepStatus::Skipped,
        report::Status::Pending => StepStatus::Pending,
        report::Status::Undefined | report::Status::Unknown => StepStatus::Undefined,
        report::Status::Ambiguous => StepStatus::Ambiguous,
    }
}

fn collect_embeddings(embeddings: &[report::Embedding], attachments: &mut Vec<Attachment>) {
    for embedding in embeddings {
        match STANDARD.decode(embedding.data.as_bytes()) {
            Ok(data) => {
                let mut attachment = Attachment::new(embedding.mime_type.clone(), data);
                attachment.name = embedding.name.clone();
                attachments.push(attachment);
            }
            Err(error) => {
                warn!("skipping embedding with undecodable base64 data: {}", error);
            }
        }
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty()).map(str::to_owned)
}

fn dedup_tags<'a>(names: impl Iterator<Item = &'a str>) -> Vec<SmolStr> {
    names.map(SmolStr::new).unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quick_cucumber::{
        Element, Embedding, Feature as ReportFeature, Hook, Report, Status, Step as ReportStep,
        StepMatch, StepResult,
    };
    use std::time::Duration;

    fn make_report() -> Report {
        let mut feature = ReportFeature::new("features/checkout.feature", "Checkout");
        feature.id = Some("checkout".to_owned());
        feature.description = Some("Everything about paying.".to_owned());
        feature.add_tag("@checkout");

        let mut background = Element::new_background();
        let mut step = ReportStep::new("Given ", "a signed-in customer");
        step.set_match("steps/auth.rs:8");
        step.set_result(StepResult::new(Status::Passed));
        background.add_step(step);
        feature.add_element(background);

        let mut scenario = Element::new_scenario("Pay by card");
        scenario.id = Some("checkout;pay-by-card".to_owned());
        scenario.add_tag("@payment");
        scenario.add_tag("@checkout");

        let mut before = Hook::default();
        before.step_match = Some(StepMatch {
            location: Some("hooks/session.rs:4".to_owned()),
        });
        before.result = Some(StepResult::new(Status::Passed));
        scenario.before.push(before);

        let mut given = ReportStep::new("Given ", "a basket with one item");
        given.set_match("steps/basket.rs:12");
        given.set_result(StepResult::new(Status::Passed));
        scenario.add_step(given);

        let mut when = ReportStep::new("When ", "the customer pays by card");
        when.set_match("steps/payment.rs:30");
        let mut result = StepResult::new(Status::Failed);
        result.set_error_message("card declined");
        result.set_duration(Duration::from_millis(40));
        when.set_result(result);
        when.add_embedding(Embedding::new("image/png", "AQID"));
        scenario.add_step(when);

        let mut then = ReportStep::new("Then ", "the order is confirmed");
        then.set_result(StepResult::new(Status::Skipped));
        scenario.add_step(then);

        feature.add_element(scenario);

        let mut report = Report::new();
        report.add_feature(feature);
        report
    }

    #[test]
    fn converts_a_report_into_records() {
        let test_run_id = TestRunUuid::new_v4();
        let converted = convert_report(test_run_id, &make_report());

        assert_eq!(converted.features.len(), 1);
        let feature = &converted.features[0];
        assert_eq!(feature.test_run_id, test_run_id);
        assert_eq!(feature.uri, "features/checkout.feature");
        assert_eq!(feature.info, BasicInfo::new("Feature", "Checkout"));
        assert_eq!(feature.tags, ["@checkout"]);

        assert_eq!(converted.scenarios.len(), 1);
        let scenario = &converted.scenarios[0];
        assert_eq!(scenario.test_run_id, test_run_id);
        assert_eq!(scenario.feature_id, feature.id);
        assert_eq!(scenario.info, BasicInfo::new("Scenario", "Pay by card"));
        assert_eq!(scenario.status, ScenarioStatus::Failed);
        assert!(!scenario.reviewed);
    }

    #[test]
    fn steps_fold_in_execution_order() {
        let converted = convert_report(TestRunUuid::new_v4(), &make_report());
        let scenario = &converted.scenarios[0];

        let keywords: Vec<&str> = scenario
            .steps
            .iter()
            .map(|s| s.info.keyword.as_str())
            .collect();
        assert_eq!(keywords, ["Before", "Given", "Given", "When", "Then"]);

        // The background step lands between the hook and the own steps.
        assert_eq!(scenario.steps[1].info.name, "a signed-in customer");
        assert_eq!(
            scenario.steps[1].definition_location,
            Some(StepDefinitionLocation::new("steps/auth.rs", 8))
        );
        assert_eq!(scenario.steps[3].status, StepStatus::Failed);
        assert_eq!(scenario.steps[3].duration, Some(Duration::from_millis(40)));
        assert_eq!(scenario.steps[4].status, StepStatus::Skipped);
    }

    #[test]
    fn first_error_message_is_materialized() {
        let converted = convert_report(TestRunUuid::new_v4(), &make_report());
        assert_eq!(
            converted.scenarios[0].error_message.as_deref(),
            Some("card declined")
        );
    }

    #[test]
    fn feature_tags_are_inherited_without_duplicates() {
        let converted = convert_report(TestRunUuid::new_v4(), &make_report());
        let scenario = &converted.scenarios[0];
        assert_eq!(scenario.tags, ["@payment", "@checkout"]);
        // "@checkout" appears on both levels but only once in all_tags.
        assert_eq!(scenario.all_tags, ["@payment", "@checkout"]);
    }

    #[test]
    fn embeddings_become_attachments() {
        let converted = convert_report(TestRunUuid::new_v4(), &make_report());
        let attachments = &converted.scenarios[0].attachments;
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].mime_type, "image/png");
        assert_eq!(*attachments[0].data, vec![1, 2, 3]);
    }

    #[test]
    fn undecodable_embeddings_are_skipped() {
        let mut report = make_report();
        report.features[0].elements[1].steps[0]
            .add_embedding(Embedding::new("text/plain", "@@not-base64@@"));

        let converted = convert_report(TestRunUuid::new_v4(), &report);
        // Only the valid embedding survives.
        assert_eq!(converted.scenarios[0].attachments.len(), 1);
    }

    #[test]
    fn keys_are_stable_across_runs_and_distinct_per_row() {
        let report = {
            let mut feature = ReportFeature::new("features/outline.feature", "Outline");
            for row in ["outline;check;;2", "outline;check;;3"] {
                let mut element = Element::new_scenario("Check");
                element.id = Some(row.to_owned());
                feature.add_element(element);
            }
            let mut report = Report::new();
            report.add_feature(feature);
            report
        };

        let first = convert_report(TestRunUuid::new_v4(), &report);
        let second = convert_report(TestRunUuid::new_v4(), &report);

        // Same coordinates, same keys, run after run.
        assert_eq!(
            first.scenarios[0].scenario_key,
            second.scenarios[0].scenario_key
        );
        // Distinct outline rows keep distinct keys despite the shared name.
        assert_ne!(
            first.scenarios[0].scenario_key,
            first.scenarios[1].scenario_key
        );
        assert_ne!(first.scenarios[0].id, second.scenarios[0].id);
    }

    #[test]
    fn unknown_statuses_read_as_undefined() {
        let mut element = Element::new_scenario("Odd");
        let mut step = ReportStep::new("Given ", "something odd");
        step.set_result(StepResult::new(Status::Unknown));
        element.add_step(step);
        // A step with no result at all reads as skipped.
        element.add_step(ReportStep::new("Then ", "nothing more"));

        let mut feature = ReportFeature::new("features/odd.feature", "Odd");
        feature.add_element(element);
        let mut report = Report::new();
        report.add_feature(feature);

        let converted = convert_report(TestRunUuid::new_v4(), &report);
        let scenario = &converted.scenarios[0];
        assert_eq!(scenario.steps[0].status, StepStatus::Undefined);
        assert_eq!(scenario.steps[1].status, StepStatus::Skipped);
        assert_eq!(scenario.status, ScenarioStatus::Undefined);
    }

    #[test]
    fn empty_report_converts_to_nothing() {
        let converted = convert_report(TestRunUuid::new_v4(), &Report::new());
        assert!(converted.features.is_empty());
        assert!(converted.scenarios.is_empty());
    }

    #[test]
    fn background_applies_to_the_following_scenario_only() {
        let mut feature = ReportFeature::new("features/bg.feature", "Backgrounds");
        let mut background = Element::new_background();
        background.add_step(ReportStep::new("Given ", "shared setup"));
        feature.add_element(background);
        feature.add_element(Element::new_scenario("With background"));
        feature.add_element(Element::new_scenario("Without background"));
        let mut report = Report::new();
        report.add_feature(feature);

        let converted = convert_report(TestRunUuid::new_v4(), &report);
        assert_eq!(converted.scenarios[0].steps.len(), 1);
        assert!(converted.scenarios[1].steps.is_empty());
    }
}
