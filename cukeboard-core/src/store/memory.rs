// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::StoreError,
    model::{Feature, FeatureUuid, Scenario, ScenarioUuid, TestRun, TestRunUuid},
    query::{ScenarioFields, ScenarioQuery, TestRunQuery},
    store::{
        FeatureStore, RecordStream, ScenarioStore, ScenarioUpdate, StatusFacts, TagFacts,
        TestRunStore,
    },
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Everything a store holds, in insertion order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(super) struct DataSet {
    pub(super) test_runs: IndexMap<TestRunUuid, TestRun>,
    pub(super) features: IndexMap<FeatureUuid, Feature>,
    pub(super) scenarios: IndexMap<ScenarioUuid, Scenario>,
}

impl DataSet {
    fn scenario_with_key(&self, candidate: &Scenario) -> Option<ScenarioUuid> {
        self.scenarios
            .values()
            .find(|s| {
                s.test_run_id == candidate.test_run_id
                    && s.scenario_key == candidate.scenario_key
            })
            .map(|s| s.id)
    }

    fn feature_with_key(&self, candidate: &Feature) -> Option<FeatureUuid> {
        self.features
            .values()
            .find(|f| {
                f.test_run_id == candidate.test_run_id && f.feature_key == candidate.feature_key
            })
            .map(|f| f.id)
    }
}

/// An in-memory store.
///
/// Writers replace the dataset as a whole, so a query's iterator walks the
/// snapshot that was current when the query started and never observes later
/// writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Arc<DataSet>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn with_dataset(data: DataSet) -> Self {
        Self {
            data: RwLock::new(Arc::new(data)),
        }
    }

    pub(super) fn snapshot(&self) -> Arc<DataSet> {
        Arc::clone(&self.data.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(super) fn mutate<T>(&self, f: impl FnOnce(&mut DataSet) -> T) -> T {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        f(Arc::make_mut(&mut guard))
    }
}

/// Walks the scenarios of one snapshot by index, yielding mapped copies of
/// the records matching the query.
struct SnapshotIter<F> {
    data: Arc<DataSet>,
    query: ScenarioQuery,
    map: F,
    index: usize,
}

impl<B, F> Iterator for SnapshotIter<F>
where
    F: Fn(&Scenario) -> B,
{
    type Item = B;

    fn next(&mut self) -> Option<B> {
        while let Some((_, scenario)) = self.data.scenarios.get_index(self.index) {
            self.index += 1;
            if self.query.matches(scenario) {
                return Some((self.map)(scenario));
            }
        }
        None
    }
}

impl ScenarioStore for MemoryStore {
    fn scenarios(
        &self,
        query: &ScenarioQuery,
        fields: ScenarioFields,
    ) -> Result<RecordStream<Scenario>, StoreError> {
        let data = self.snapshot();
        if query.is_ordered_by_name() {
            // Ordering is by the stored name, so sort before projecting:
            // the projection may leave names unpopulated.
            let mut matched: Vec<&Scenario> =
                data.scenarios.values().filter(|s| query.matches(s)).collect();
            matched.sort_by(|a, b| a.info.name.cmp(&b.info.name));
            let projected: Vec<Scenario> = matched.into_iter().map(|s| s.project(fields)).collect();
            Ok(Box::new(projected.into_iter()))
        } else {
            Ok(Box::new(SnapshotIter {
                data,
                query: query.clone(),
                map: move |s: &Scenario| s.project(fields),
                index: 0,
            }))
        }
    }

    fn scenario(&self, id: ScenarioUuid) -> Result<Scenario, StoreError> {
        self.snapshot()
            .scenarios
            .get(&id)
            .cloned()
            .ok_or(StoreError::ScenarioNotFound { id })
    }

    fn status_facts(
        &self,
        query: &ScenarioQuery,
    ) -> Result<RecordStream<StatusFacts>, StoreError> {
        Ok(Box::new(SnapshotIter {
            data: self.snapshot(),
            query: query.clone(),
            map: |s: &Scenario| StatusFacts {
                status: s.status,
                reviewed: s.reviewed,
            },
            index: 0,
        }))
    }

    fn tag_facts(&self, query: &ScenarioQuery) -> Result<RecordStream<TagFacts>, StoreError> {
        Ok(Box::new(SnapshotIter {
            data: self.snapshot(),
            query: query.clone(),
            map: |s: &Scenario| TagFacts {
                status: s.status,
                reviewed: s.reviewed,
                all_tags: s.all_tags.clone(),
            },
            index: 0,
        }))
    }

    fn insert_scenario(&self, scenario: Scenario) -> Result<(), StoreError> {
        self.mutate(|data| {
            if let Some(existing) = data.scenario_with_key(&scenario) {
                data.scenarios.shift_remove(&existing);
            }
            data.scenarios.insert(scenario.id, scenario);
        });
        Ok(())
    }

    fn update_scenario(
        &self,
        id: ScenarioUuid,
        update: &ScenarioUpdate,
    ) -> Result<Scenario, StoreError> {
        self.mutate(|data| {
            let scenario = data
                .scenarios
                .get_mut(&id)
                .ok_or(StoreError::ScenarioNotFound { id })?;
            if let Some(status) = update.status {
                scenario.status = status;
            }
            if let Some(reviewed) = update.reviewed {
                scenario.reviewed = reviewed;
            }
            Ok(scenario.clone())
        })
    }

    fn delete_scenario(&self, id: ScenarioUuid) -> Result<(), StoreError> {
        self.mutate(|data| {
            data.scenarios
                .shift_remove(&id)
                .map(|_| ())
                .ok_or(StoreError::ScenarioNotFound { id })
        })
    }
}

impl FeatureStore for MemoryStore {
    fn features(&self, test_run_id: TestRunUuid) -> Result<Vec<Feature>, StoreError> {
        let data = self.snapshot();
        let mut features: Vec<Feature> = data
            .features
            .values()
            .filter(|f| f.test_run_id == test_run_id)
            .cloned()
            .collect();
        features.sort_by(|a, b| a.info.name.cmp(&b.info.name));
        Ok(features)
    }

    fn feature(&self, id: FeatureUuid) -> Result<Feature, StoreError> {
        self.snapshot()
            .features
            .get(&id)
            .cloned()
            .ok_or(StoreError::FeatureNotFound { id })
    }

    fn insert_feature(&self, feature: Feature) -> Result<(), StoreError> {
        self.mutate(|data| {
            if let Some(existing) = data.feature_with_key(&feature) {
                data.features.shift_remove(&existing);
            }
            data.features.insert(feature.id, feature);
        });
        Ok(())
    }
}

impl TestRunStore for MemoryStore {
    fn test_runs(&self, query: &TestRunQuery) -> Result<RecordStream<TestRun>, StoreError> {
        let data = self.snapshot();
        let mut runs: Vec<TestRun> = data
            .test_runs
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        if query.is_ordered_latest_first() {
            runs.sort_by(|a, b| b.date.cmp(&a.date));
        }
        Ok(Box::new(runs.into_iter()))
    }

    fn test_run(&self, id: TestRunUuid) -> Result<TestRun, StoreError> {
        self.snapshot()
            .test_runs
            .get(&id)
            .cloned()
            .ok_or(StoreError::TestRunNotFound { id })
    }

    fn insert_test_run(&self, test_run: TestRun) -> Result<(), StoreError> {
        self.mutate(|data| {
            data.test_runs.insert(test_run.id, test_run);
        });
        Ok(())
    }

    fn delete_test_run(&self, id: TestRunUuid) -> Result<(), StoreError> {
        self.mutate(|data| {
            if data.test_runs.shift_remove(&id).is_none() {
                return Err(StoreError::TestRunNotFound { id });
            }
            data.features.retain(|_, f| f.test_run_id != id);
            data.scenarios.retain(|_, s| s.test_run_id != id);
            Ok(())
        })
    }
}
