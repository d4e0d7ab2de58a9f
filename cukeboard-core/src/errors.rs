// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by cukeboard.

use crate::model::{AttachmentUuid, FeatureUuid, ScenarioUuid, TestRunUuid};
use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurred while reading or writing a scenario store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No scenario with the given identifier exists.
    #[error("scenario `{id}` not found")]
    ScenarioNotFound {
        /// The identifier that was looked up.
        id: ScenarioUuid,
    },

    /// No test run with the given identifier exists.
    #[error("test run `{id}` not found")]
    TestRunNotFound {
        /// The identifier that was looked up.
        id: TestRunUuid,
    },

    /// No feature with the given identifier exists.
    #[error("feature `{id}` not found")]
    FeatureNotFound {
        /// The identifier that was looked up.
        id: FeatureUuid,
    },

    /// No attachment with the given identifier exists on the scenario.
    #[error("attachment `{attachment_id}` not found on scenario `{scenario_id}`")]
    AttachmentNotFound {
        /// The scenario that was searched.
        scenario_id: ScenarioUuid,

        /// The attachment identifier that was looked up.
        attachment_id: AttachmentUuid,
    },

    /// The store directory could not be created or opened.
    #[error("error opening store directory `{store_dir}`")]
    StoreOpen {
        /// The store directory.
        store_dir: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: std::io::Error,
    },

    /// The store lock file could not be locked.
    #[error("error locking store file `{path}`")]
    StoreLock {
        /// The path to the lock file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: std::io::Error,
    },

    /// Timed out waiting for another process to release the store lock.
    #[error("timed out after {timeout_secs}s waiting for lock on `{path}`")]
    StoreLockTimeout {
        /// The path to the lock file.
        path: Utf8PathBuf,

        /// How long was waited before giving up.
        timeout_secs: u64,
    },

    /// The store document could not be read from disk.
    #[error("error reading store document `{path}`")]
    DocumentRead {
        /// The path to the document.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: std::io::Error,
    },

    /// The store document could not be deserialized.
    #[error("error parsing store document `{path}`")]
    DocumentParse {
        /// The path to the document.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: serde_json::Error,
    },

    /// The store document could not be written to disk.
    #[error("error writing store document `{path}`")]
    DocumentWrite {
        /// The path to the document.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: std::io::Error,
    },

    /// The store document was written by a newer cukeboard.
    #[error(
        "store document `{path}` has format version {found}, \
         but this cukeboard only supports versions up to {supported}"
    )]
    UnsupportedFormatVersion {
        /// The path to the document.
        path: Utf8PathBuf,

        /// The version recorded in the document.
        found: u32,

        /// The newest version this cukeboard understands.
        supported: u32,
    },
}

impl StoreError {
    /// Returns true if this error means a record was not found, as opposed
    /// to the store itself failing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ScenarioNotFound { .. }
                | StoreError::TestRunNotFound { .. }
                | StoreError::FeatureNotFound { .. }
                | StoreError::AttachmentNotFound { .. }
        )
    }
}

/// An error that occurred while computing a view.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ViewError {
    /// Tag statistics were requested together with excluded tags.
    ///
    /// Per-tag statistics are only defined for inclusive selections; callers
    /// must drop the exclusions before asking for them.
    #[error("tag statistics cannot be computed with excluded tags")]
    ExcludedTagsWithTagStats,

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The error returned when a status string cannot be parsed.
#[derive(Clone, Debug, Error)]
#[error("unrecognized status `{input}`")]
pub struct StatusParseError {
    input: String,
}

impl StatusParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurred while importing a Cucumber report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// The report file could not be read.
    #[error("error reading report file `{path}`")]
    ReportRead {
        /// The path to the report file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: std::io::Error,
    },

    /// The report file was not valid Cucumber JSON.
    #[error("error parsing report file `{path}`")]
    ReportParse {
        /// The path to the report file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: quick_cucumber::ParseError,
    },

    /// The imported records could not be stored.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An error that occurred while parsing the cukeboard config.
#[derive(Debug, Error)]
#[error("failed to parse cukeboard config at `{config_file}`")]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: config::ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: config::ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the path to the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}
