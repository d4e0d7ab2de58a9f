// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write-side orchestration: run lifecycle, report imports and record
//! mutations.

use crate::{
    errors::{ImportError, StoreError},
    ingest::{self, ConvertedReport},
    model::{Attachment, AttachmentUuid, Scenario, ScenarioUuid, TestRun, TestRunUuid},
    query::TestRunQuery,
    store::{Datastore, ScenarioStore, ScenarioUpdate, TestRunStore},
};
use camino::Utf8Path;
use quick_cucumber::Report;
use serde::Serialize;
use std::fs;
use tracing::{debug, info};

/// What one report import added to the store.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImportOutcome {
    /// Number of feature records imported.
    pub features: usize,
    /// Number of scenario records imported.
    pub scenarios: usize,
}

/// Record-level operations on scenarios: lookup, update, deletion and report
/// imports.
#[derive(Debug)]
pub struct ScenarioService<'store, S> {
    store: &'store S,
}

impl<'store, S: ScenarioStore> ScenarioService<'store, S> {
    /// Creates a service over the given store.
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    /// Returns the full record for one scenario.
    pub fn scenario(&self, id: ScenarioUuid) -> Result<Scenario, StoreError> {
        self.store.scenario(id)
    }

    /// Applies an update to one scenario and returns the updated record.
    pub fn update_scenario(
        &self,
        id: ScenarioUuid,
        update: &ScenarioUpdate,
    ) -> Result<Scenario, StoreError> {
        let updated = self.store.update_scenario(id, update)?;
        debug!(
            "updated scenario `{id}`: status {}, reviewed {}",
            updated.status, updated.reviewed
        );
        Ok(updated)
    }

    /// Deletes one scenario.
    pub fn delete_scenario(&self, id: ScenarioUuid) -> Result<(), StoreError> {
        self.store.delete_scenario(id)?;
        debug!("deleted scenario `{id}`");
        Ok(())
    }

    /// Returns one attachment of a scenario.
    pub fn attachment(
        &self,
        scenario_id: ScenarioUuid,
        attachment_id: AttachmentUuid,
    ) -> Result<Attachment, StoreError> {
        let scenario = self.store.scenario(scenario_id)?;
        scenario
            .attachment(attachment_id)
            .cloned()
            .ok_or(StoreError::AttachmentNotFound {
                scenario_id,
                attachment_id,
            })
    }
}

impl<'store, S: Datastore> ScenarioService<'store, S> {
    /// Imports a parsed report into an existing run.
    ///
    /// Records with keys already present in the run are replaced, so
    /// importing the same report twice leaves one record per scenario.
    pub fn import_report(
        &self,
        test_run_id: TestRunUuid,
        report: &Report,
    ) -> Result<ImportOutcome, StoreError> {
        // Resolve the run before converting, so an unknown run fails fast.
        let test_run = self.store.test_run(test_run_id)?;

        let ConvertedReport {
            features,
            scenarios,
        } = ingest::convert_report(test_run_id, report);
        let outcome = ImportOutcome {
            features: features.len(),
            scenarios: scenarios.len(),
        };
        for feature in features {
            self.store.insert_feature(feature)?;
        }
        for scenario in scenarios {
            self.store.insert_scenario(scenario)?;
        }

        info!(
            "imported {} features and {} scenarios into run `{}` ({})",
            outcome.features, outcome.scenarios, test_run_id, test_run.environment
        );
        Ok(outcome)
    }

    /// Reads a Cucumber JSON file and imports it into an existing run.
    pub fn import_report_file(
        &self,
        test_run_id: TestRunUuid,
        path: &Utf8Path,
    ) -> Result<ImportOutcome, ImportError> {
        let contents = fs::read(path).map_err(|error| ImportError::ReportRead {
            path: path.to_owned(),
            error,
        })?;
        let report = Report::from_slice(&contents).map_err(|error| ImportError::ReportParse {
            path: path.to_owned(),
            error,
        })?;
        Ok(self.import_report(test_run_id, &report)?)
    }
}

/// Lifecycle operations on test runs.
#[derive(Debug)]
pub struct TestRunService<'store, S> {
    store: &'store S,
}

impl<'store, S: TestRunStore> TestRunService<'store, S> {
    /// Creates a service over the given store.
    pub fn new(store: &'store S) -> Self {
        Self { store }
    }

    /// Creates a run labeled with the given environment.
    pub fn create_run(&self, environment: impl Into<String>) -> Result<TestRun, StoreError> {
        let run = TestRun::new(environment);
        self.store.insert_test_run(run.clone())?;
        info!(
            "created test run `{}` for environment `{}`",
            run.id, run.environment
        );
        Ok(run)
    }

    /// Lists the runs matching a query.
    pub fn test_runs(&self, query: &TestRunQuery) -> Result<Vec<TestRun>, StoreError> {
        Ok(self.store.test_runs(query)?.collect())
    }

    /// Returns one run.
    pub fn test_run(&self, id: TestRunUuid) -> Result<TestRun, StoreError> {
        self.store.test_run(id)
    }

    /// Deletes a run along with all of its features and scenarios.
    pub fn delete_run(&self, id: TestRunUuid) -> Result<(), StoreError> {
        self.store.delete_test_run(id)?;
        info!("deleted test run `{id}`");
        Ok(())
    }
}
