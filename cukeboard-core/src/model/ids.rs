// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifiers for stored records.
//!
//! Every record carries a [`TypedUuid`]-based identifier that is unique to one
//! record in one test run. Scenarios and features additionally carry a *key*:
//! a stable digest of their source coordinates that stays the same across
//! runs, which is what history and upserts are keyed on.

use newtype_uuid::{TypedUuid, TypedUuidKind, TypedUuidTag};
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};
use std::{convert::Infallible, fmt, str::FromStr};
use xxhash_rust::xxh3::Xxh3;

macro_rules! define_uuid_kind {
    ($(#[$meta:meta])* $alias:ident, $kind:ident, $tag:literal) => {
        $(#[$meta])*
        pub type $alias = TypedUuid<$kind>;

        #[doc = concat!("The typed UUID kind for [`", stringify!($alias), "`].")]
        pub enum $kind {}

        impl TypedUuidKind for $kind {
            #[inline]
            fn tag() -> TypedUuidTag {
                const TAG: TypedUuidTag = TypedUuidTag::new($tag);
                TAG
            }
        }
    };
}

define_uuid_kind! {
    /// A unique identifier for a test run.
    TestRunUuid, TestRunKind, "cukeboard-test-run"
}

define_uuid_kind! {
    /// A unique identifier for a scenario record.
    ///
    /// This identifies one record in one test run. To correlate the same
    /// scenario across runs, use [`ScenarioKey`] instead.
    ScenarioUuid, ScenarioKind, "cukeboard-scenario"
}

define_uuid_kind! {
    /// A unique identifier for a feature record.
    FeatureUuid, FeatureKind, "cukeboard-feature"
}

define_uuid_kind! {
    /// A unique identifier for an attachment.
    AttachmentUuid, AttachmentKind, "cukeboard-attachment"
}

/// A stable identity for a scenario, preserved across test runs.
///
/// Derived from the feature URI and the scenario's identifier within the
/// feature, so re-running the same suite produces the same keys. Importing a
/// report into a run replaces records with matching keys rather than
/// duplicating them, and scenario history joins runs on this key.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioKey(SmolStr);

impl ScenarioKey {
    /// Derives the key for a scenario from its feature's URI and its
    /// identifier within the feature.
    pub fn derive(feature_uri: &str, element_id: &str) -> Self {
        Self(digest(&[feature_uri, element_id]))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ScenarioKey {
    type Err = Infallible;

    /// Accepts a key previously rendered with [`ScenarioKey::as_str`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(SmolStr::new(s)))
    }
}

/// A stable identity for a feature, preserved across test runs.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureKey(SmolStr);

impl FeatureKey {
    /// Derives the key for a feature from its URI.
    pub fn derive(feature_uri: &str) -> Self {
        Self(digest(&[feature_uri]))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hashes the parts with a separator after each one, so that moving a
/// boundary between parts always changes the digest.
fn digest(parts: &[&str]) -> SmolStr {
    let mut hasher = Xxh3::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(&[0]);
    }
    format_smolstr!("{:016x}", hasher.digest())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_key_is_stable() {
        let a = ScenarioKey::derive("features/checkout.feature", "checkout;pay-by-card");
        let b = ScenarioKey::derive("features/checkout.feature", "checkout;pay-by-card");
        assert_eq!(a, b);
        // 64-bit digest rendered as fixed-width hex.
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn scenario_key_distinguishes_coordinates() {
        let base = ScenarioKey::derive("features/checkout.feature", "checkout;pay-by-card");
        let other_element = ScenarioKey::derive("features/checkout.feature", "checkout;pay-by-cash");
        let other_feature = ScenarioKey::derive("features/returns.feature", "checkout;pay-by-card");
        assert_ne!(base, other_element);
        assert_ne!(base, other_feature);
    }

    #[test]
    fn key_parts_do_not_bleed_into_each_other() {
        // The separator must keep ("ab", "c") distinct from ("a", "bc").
        let a = ScenarioKey::derive("ab", "c");
        let b = ScenarioKey::derive("a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn feature_key_matches_across_runs() {
        let a = FeatureKey::derive("features/checkout.feature");
        let b = FeatureKey::derive("features/checkout.feature");
        assert_eq!(a, b);
        assert_ne!(a, FeatureKey::derive("features/returns.feature"));
    }

    #[test]
    fn uuid_kinds_are_tagged() {
        assert_eq!(ScenarioKind::tag().as_str(), "cukeboard-scenario");
        assert_eq!(TestRunKind::tag().as_str(), "cukeboard-test-run");
    }
}
