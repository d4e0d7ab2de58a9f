// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for cukeboard.
//!
//! Configuration is layered: the built-in defaults are always read first, and
//! an optional `cukeboard.toml` is merged on top, so user files only need to
//! state the keys they change.

use crate::{errors::ConfigParseError, views::SimilarityRules};
use camino::{Utf8Path, Utf8PathBuf};
use config::{
    Config, ConfigBuilder, File, FileFormat, builder::DefaultState,
};
use serde::Deserialize;
use tracing::debug;

/// Overall cukeboard configuration.
///
/// The config is immutable once read; it is queried throughout the lifetime
/// of a store.
#[derive(Clone, Debug)]
pub struct CukeboardConfig {
    store_dir: Utf8PathBuf,
    similarity: SimilarityRules,
}

impl CukeboardConfig {
    /// The file name configuration is read from when no explicit path is
    /// given.
    pub const CONFIG_FILE_NAME: &'static str = "cukeboard.toml";

    /// Contains the default config as a TOML file.
    ///
    /// User configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the configuration for the given base directory.
    ///
    /// With an explicit `file`, that file is required to exist; otherwise
    /// `cukeboard.toml` within `dir` is merged if present. A relative store
    /// directory is resolved against `dir`.
    pub fn from_sources(
        dir: &Utf8Path,
        file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = dir.join(Self::CONFIG_FILE_NAME);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let deserialized = Self::make_default_config()
            .add_source(source)
            .build()
            .and_then(|config| config.try_deserialize::<CukeboardConfigDeserialize>())
            .map_err(|err| ConfigParseError::new(&config_file, err))?;
        debug!("read config from `{config_file}`");
        Ok(deserialized.into_config(dir))
    }

    /// Returns the built-in default configuration, resolved against the
    /// given base directory.
    pub fn default_config(dir: &Utf8Path) -> Self {
        let deserialized = Self::make_default_config()
            .build()
            .and_then(|config| config.try_deserialize::<CukeboardConfigDeserialize>())
            .expect("default config is always valid");
        deserialized.into_config(dir)
    }

    /// The directory records are stored in.
    pub fn store_dir(&self) -> &Utf8Path {
        &self.store_dir
    }

    /// The rules driving the failure-similarity matcher.
    pub fn similarity(&self) -> SimilarityRules {
        self.similarity
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CukeboardConfigDeserialize {
    store: StoreConfig,
    similarity: SimilarityRules,
}

impl CukeboardConfigDeserialize {
    fn into_config(self, dir: &Utf8Path) -> CukeboardConfig {
        CukeboardConfig {
            // join keeps an absolute configured directory as-is.
            store_dir: dir.join(&self.store.dir),
            similarity: self.similarity,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StoreConfig {
    dir: Utf8PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::tempdir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn defaults_apply_without_a_user_file() {
        let dir = tempdir().unwrap();
        let config = CukeboardConfig::from_sources(dir.path(), None).unwrap();

        assert_eq!(config.store_dir(), dir.path().join(".cukeboard"));
        assert_eq!(config.similarity(), SimilarityRules::default());
    }

    #[test]
    fn user_file_overrides_single_keys() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CukeboardConfig::CONFIG_FILE_NAME),
            indoc! {r#"
                [store]
                dir = "data/runs"

                [similarity]
                ignore-quoted = false
            "#},
        )
        .unwrap();

        let config = CukeboardConfig::from_sources(dir.path(), None).unwrap();

        assert_eq!(config.store_dir(), dir.path().join("data/runs"));
        // Changed key.
        assert!(!config.similarity().ignore_quoted);
        // Untouched keys keep their defaults.
        assert!(config.similarity().ignore_numbers);
        assert!(config.similarity().ignore_hex_values);
    }

    #[test]
    fn explicit_file_wins_over_the_conventional_name() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CukeboardConfig::CONFIG_FILE_NAME),
            "[store]\ndir = \"ignored\"\n",
        )
        .unwrap();
        let custom = dir.path().join("custom.toml");
        fs::write(&custom, "[store]\ndir = \"chosen\"\n").unwrap();

        let config = CukeboardConfig::from_sources(dir.path(), Some(&custom)).unwrap();
        assert_eq!(config.store_dir(), dir.path().join("chosen"));
    }

    #[test]
    fn absolute_store_dir_is_kept() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CukeboardConfig::CONFIG_FILE_NAME),
            "[store]\ndir = \"/var/lib/cukeboard\"\n",
        )
        .unwrap();

        let config = CukeboardConfig::from_sources(dir.path(), None).unwrap();
        assert_eq!(config.store_dir(), Utf8Path::new("/var/lib/cukeboard"));
    }

    #[test]
    fn invalid_config_names_the_file() {
        let dir = tempdir().unwrap();
        let config_file = dir.path().join(CukeboardConfig::CONFIG_FILE_NAME);
        fs::write(&config_file, "[similarity]\nignore-quoted = \"yes\"\n").unwrap();

        let err = CukeboardConfig::from_sources(dir.path(), None).unwrap_err();
        assert_eq!(err.config_file(), &config_file);
    }

    #[test]
    fn built_in_defaults_parse() {
        let dir = tempdir().unwrap();
        let config = CukeboardConfig::default_config(dir.path());
        assert_eq!(config.store_dir(), dir.path().join(".cukeboard"));
    }
}
