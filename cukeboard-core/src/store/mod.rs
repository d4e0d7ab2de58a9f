// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage backends for cukeboard records.
//!
//! [`MemoryStore`] keeps all records in process memory. [`DiskStore`] wraps
//! it with a JSON document on disk, a lock file guarding it, and a write
//! after every mutation.
//!
//! Reads operate on an immutable snapshot: an iterator returned by a query
//! never observes writes made after the query started.

mod disk;
mod memory;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use disk::*;
pub use memory::*;

use crate::{
    errors::StoreError,
    model::{
        Feature, FeatureUuid, Scenario, ScenarioStatus, ScenarioUuid, TestRun, TestRunUuid,
    },
    query::{ScenarioFields, ScenarioQuery, TestRunQuery},
};
use smol_str::SmolStr;

/// An owned stream of query results.
pub type RecordStream<T> = Box<dyn Iterator<Item = T> + Send>;

/// The scenario fields consulted by status-based statistics.
///
/// Cheaper to stream than projected records: no names, steps or attachments
/// are copied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusFacts {
    /// Overall status.
    pub status: ScenarioStatus,
    /// Review flag.
    pub reviewed: bool,
}

/// The scenario fields consulted by per-tag statistics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagFacts {
    /// Overall status.
    pub status: ScenarioStatus,
    /// Review flag.
    pub reviewed: bool,
    /// Scenario tags plus inherited feature tags.
    pub all_tags: Vec<SmolStr>,
}

/// A partial update to a scenario record. Fields left as `None` keep their
/// stored values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScenarioUpdate {
    /// New status, if changing.
    pub status: Option<ScenarioStatus>,
    /// New review flag, if changing.
    pub reviewed: Option<bool>,
}

impl ScenarioUpdate {
    /// Creates an update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status to store.
    pub fn set_status(mut self, status: ScenarioStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the review flag to store.
    pub fn set_reviewed(mut self, reviewed: bool) -> Self {
        self.reviewed = Some(reviewed);
        self
    }

    /// Returns true if this update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.reviewed.is_none()
    }
}

/// Storage and retrieval of scenario records.
pub trait ScenarioStore {
    /// Streams the scenarios matching a query, projected to the selected
    /// fields.
    ///
    /// Matching always runs against full records, so a query may filter on
    /// fields that are not selected for projection.
    fn scenarios(
        &self,
        query: &ScenarioQuery,
        fields: ScenarioFields,
    ) -> Result<RecordStream<Scenario>, StoreError>;

    /// Returns the full record for one scenario.
    fn scenario(&self, id: ScenarioUuid) -> Result<Scenario, StoreError>;

    /// Streams status facts for the scenarios matching a query.
    fn status_facts(&self, query: &ScenarioQuery)
    -> Result<RecordStream<StatusFacts>, StoreError>;

    /// Streams tag facts for the scenarios matching a query.
    fn tag_facts(&self, query: &ScenarioQuery) -> Result<RecordStream<TagFacts>, StoreError>;

    /// Inserts a scenario, replacing any existing record with the same test
    /// run and scenario key. The replacement takes the insertion position of
    /// a new record.
    fn insert_scenario(&self, scenario: Scenario) -> Result<(), StoreError>;

    /// Applies an update to one scenario and returns the updated record.
    fn update_scenario(
        &self,
        id: ScenarioUuid,
        update: &ScenarioUpdate,
    ) -> Result<Scenario, StoreError>;

    /// Deletes one scenario.
    fn delete_scenario(&self, id: ScenarioUuid) -> Result<(), StoreError>;
}

/// Storage and retrieval of feature records.
pub trait FeatureStore {
    /// Returns the features recorded for a run, ordered by name.
    fn features(&self, test_run_id: TestRunUuid) -> Result<Vec<Feature>, StoreError>;

    /// Returns one feature record.
    fn feature(&self, id: FeatureUuid) -> Result<Feature, StoreError>;

    /// Inserts a feature, replacing any existing record with the same test
    /// run and feature key.
    fn insert_feature(&self, feature: Feature) -> Result<(), StoreError>;
}

/// Storage and retrieval of test runs.
pub trait TestRunStore {
    /// Streams the runs matching a query.
    fn test_runs(&self, query: &TestRunQuery) -> Result<RecordStream<TestRun>, StoreError>;

    /// Returns one run.
    fn test_run(&self, id: TestRunUuid) -> Result<TestRun, StoreError>;

    /// Inserts a new run.
    fn insert_test_run(&self, test_run: TestRun) -> Result<(), StoreError>;

    /// Deletes a run along with all of its features and scenarios.
    fn delete_test_run(&self, id: TestRunUuid) -> Result<(), StoreError>;
}

/// A complete storage backend.
pub trait Datastore: ScenarioStore + FeatureStore + TestRunStore {}

impl<T: ScenarioStore + FeatureStore + TestRunStore> Datastore for T {}
