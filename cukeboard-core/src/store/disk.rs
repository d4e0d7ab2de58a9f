// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::StoreError,
    model::{Feature, FeatureUuid, Scenario, ScenarioUuid, TestRun, TestRunUuid},
    query::{ScenarioFields, ScenarioQuery, TestRunQuery},
    store::{
        FeatureStore, MemoryStore, RecordStream, ScenarioStore, ScenarioUpdate, StatusFacts,
        TagFacts, TestRunStore, memory::DataSet,
    },
};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use debug_ignore::DebugIgnore;
use serde::{Deserialize, Serialize};
use std::{
    fs::{File, TryLockError},
    io::{self, BufWriter, ErrorKind, Write},
    thread,
    time::{Duration, Instant},
};
use tracing::debug;

static STORE_LOCK_FILE_NAME: &str = "store.lock";
static STORE_DOCUMENT_FILE_NAME: &str = "store.json";

/// The document format version written by this cukeboard.
///
/// Bump on incompatible changes to the document layout. Documents with a
/// newer version than this are refused rather than misread.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// A store backed by a JSON document on disk.
///
/// Opening the store takes an exclusive lock on the store directory, held
/// until the store is dropped; a second process opening the same directory
/// retries briefly and then fails. All reads are served from memory, and
/// every mutation rewrites the document through an atomic rename.
#[derive(Debug)]
pub struct DiskStore {
    store_dir: Utf8PathBuf,
    document_path: Utf8PathBuf,
    // Held for RAII lock semantics; the lock is released when this struct is dropped.
    #[expect(dead_code)]
    locked_file: DebugIgnore<File>,
    memory: MemoryStore,
}

impl DiskStore {
    /// Opens the store in the given directory, creating it if needed.
    pub fn open(store_dir: impl Into<Utf8PathBuf>) -> Result<Self, StoreError> {
        let store_dir = store_dir.into();
        std::fs::create_dir_all(&store_dir).map_err(|error| StoreError::StoreOpen {
            store_dir: store_dir.clone(),
            error,
        })?;

        let lock_file_path = store_dir.join(STORE_LOCK_FILE_NAME);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_file_path)
            .map_err(|error| StoreError::StoreLock {
                path: lock_file_path.clone(),
                error,
            })?;
        acquire_lock_with_retry(&file, &lock_file_path)?;

        let document_path = store_dir.join(STORE_DOCUMENT_FILE_NAME);
        let data = read_document(&document_path)?;
        debug!(
            "opened store at `{store_dir}`: {} test runs, {} scenarios",
            data.test_runs.len(),
            data.scenarios.len(),
        );

        Ok(Self {
            store_dir,
            document_path,
            locked_file: DebugIgnore(file),
            memory: MemoryStore::with_dataset(data),
        })
    }

    /// Returns the store directory.
    pub fn store_dir(&self) -> &Utf8Path {
        &self.store_dir
    }

    fn persist(&self) -> Result<(), StoreError> {
        let document = StoreDocument::from_dataset(&self.memory.snapshot());
        let atomic_file = AtomicFile::new(&self.document_path, OverwriteBehavior::AllowOverwrite);
        atomic_file
            .write(|file| {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &document).map_err(io::Error::other)?;
                writer.flush()
            })
            .map_err(|error| {
                let error = match error {
                    atomicwrites::Error::Internal(error) | atomicwrites::Error::User(error) => {
                        error
                    }
                };
                StoreError::DocumentWrite {
                    path: self.document_path.clone(),
                    error,
                }
            })
    }
}

impl ScenarioStore for DiskStore {
    fn scenarios(
        &self,
        query: &ScenarioQuery,
        fields: ScenarioFields,
    ) -> Result<RecordStream<Scenario>, StoreError> {
        self.memory.scenarios(query, fields)
    }

    fn scenario(&self, id: ScenarioUuid) -> Result<Scenario, StoreError> {
        self.memory.scenario(id)
    }

    fn status_facts(
        &self,
        query: &ScenarioQuery,
    ) -> Result<RecordStream<StatusFacts>, StoreError> {
        self.memory.status_facts(query)
    }

    fn tag_facts(&self, query: &ScenarioQuery) -> Result<RecordStream<TagFacts>, StoreError> {
        self.memory.tag_facts(query)
    }

    fn insert_scenario(&self, scenario: Scenario) -> Result<(), StoreError> {
        self.memory.insert_scenario(scenario)?;
        self.persist()
    }

    fn update_scenario(
        &self,
        id: ScenarioUuid,
        update: &ScenarioUpdate,
    ) -> Result<Scenario, StoreError> {
        let updated = self.memory.update_scenario(id, update)?;
        self.persist()?;
        Ok(updated)
    }

    fn delete_scenario(&self, id: ScenarioUuid) -> Result<(), StoreError> {
        self.memory.delete_scenario(id)?;
        self.persist()
    }
}

impl FeatureStore for DiskStore {
    fn features(&self, test_run_id: TestRunUuid) -> Result<Vec<Feature>, StoreError> {
        self.memory.features(test_run_id)
    }

    fn feature(&self, id: FeatureUuid) -> Result<Feature, StoreError> {
        self.memory.feature(id)
    }

    fn insert_feature(&self, feature: Feature) -> Result<(), StoreError> {
        self.memory.insert_feature(feature)?;
        self.persist()
    }
}

impl TestRunStore for DiskStore {
    fn test_runs(&self, query: &TestRunQuery) -> Result<RecordStream<TestRun>, StoreError> {
        self.memory.test_runs(query)
    }

    fn test_run(&self, id: TestRunUuid) -> Result<TestRun, StoreError> {
        self.memory.test_run(id)
    }

    fn insert_test_run(&self, test_run: TestRun) -> Result<(), StoreError> {
        self.memory.insert_test_run(test_run)?;
        self.persist()
    }

    fn delete_test_run(&self, id: TestRunUuid) -> Result<(), StoreError> {
        self.memory.delete_test_run(id)?;
        self.persist()
    }
}

/// The on-disk shape of a store.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StoreDocument {
    format_version: u32,
    test_runs: Vec<TestRun>,
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    scenarios: Vec<Scenario>,
}

impl StoreDocument {
    fn from_dataset(data: &DataSet) -> Self {
        Self {
            format_version: STORE_FORMAT_VERSION,
            test_runs: data.test_runs.values().cloned().collect(),
            features: data.features.values().cloned().collect(),
            scenarios: data.scenarios.values().cloned().collect(),
        }
    }

    fn into_dataset(self) -> DataSet {
        let mut data = DataSet::default();
        for run in self.test_runs {
            data.test_runs.insert(run.id, run);
        }
        for feature in self.features {
            data.features.insert(feature.id, feature);
        }
        for scenario in self.scenarios {
            data.scenarios.insert(scenario.id, scenario);
        }
        data
    }
}

/// Just enough of a document to check its version before parsing the rest.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DocumentVersion {
    format_version: u32,
}

fn read_document(document_path: &Utf8Path) -> Result<DataSet, StoreError> {
    let bytes = match std::fs::read(document_path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Ok(DataSet::default());
        }
        Err(error) => {
            return Err(StoreError::DocumentRead {
                path: document_path.to_owned(),
                error,
            });
        }
    };

    let version: DocumentVersion =
        serde_json::from_slice(&bytes).map_err(|error| StoreError::DocumentParse {
            path: document_path.to_owned(),
            error,
        })?;
    if version.format_version > STORE_FORMAT_VERSION {
        return Err(StoreError::UnsupportedFormatVersion {
            path: document_path.to_owned(),
            found: version.format_version,
            supported: STORE_FORMAT_VERSION,
        });
    }

    let document: StoreDocument =
        serde_json::from_slice(&bytes).map_err(|error| StoreError::DocumentParse {
            path: document_path.to_owned(),
            error,
        })?;
    Ok(document.into_dataset())
}

/// Acquires the store lock, retrying for up to 5 seconds while another
/// process holds it.
fn acquire_lock_with_retry(file: &File, lock_file_path: &Utf8Path) -> Result<(), StoreError> {
    const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
    const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);

    let start = Instant::now();
    loop {
        match file.try_lock() {
            Ok(()) => return Ok(()),
            Err(TryLockError::WouldBlock) => {
                // Held elsewhere, likely a CLI invocation finishing up.
                if start.elapsed() >= LOCK_TIMEOUT {
                    return Err(StoreError::StoreLockTimeout {
                        path: lock_file_path.to_owned(),
                        timeout_secs: LOCK_TIMEOUT.as_secs(),
                    });
                }
                thread::sleep(LOCK_RETRY_INTERVAL);
            }
            Err(TryLockError::Error(error)) => {
                // Locking itself failed, e.g. a filesystem without lock
                // support.
                return Err(StoreError::StoreLock {
                    path: lock_file_path.to_owned(),
                    error,
                });
            }
        }
    }
}
