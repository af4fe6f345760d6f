//! Module substitution tables that stub out disabled features.
//!
//! A light bundle must not merely skip disabled code at runtime, it must not
//! contain it. Redirecting every import of a feature's modules to an empty
//! stub lets the bundler's reachability analysis drop the implementation.
//!
//! Imports are matched by their literal specifier, so each module is listed
//! once per relative spelling that appears in the source tree: from the
//! library root (`./utils/...`) and from one directory down (`../utils/...`).

use super::descriptor::Profile;
use super::features::{Feature, FeatureSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Stub for specifiers written relative to the library root.
pub const ROOT_STUB: &str = "./empty.js";

/// Stub for specifiers written from a one-level-nested directory.
pub const NESTED_STUB: &str = "../empty.js";

/// One (module specifier → stub specifier) substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubRule {
    pub module: &'static str,
    pub stub: &'static str,
}

const fn root(module: &'static str) -> StubRule {
    StubRule { module, stub: ROOT_STUB }
}

const fn nested(module: &'static str) -> StubRule {
    StubRule { module, stub: NESTED_STUB }
}

/// Modules implementing each feature, in every spelling they are imported by.
pub fn stub_rules(feature: Feature) -> &'static [StubRule] {
    const EME: &[StubRule] = &[
        root("./controller/eme-controller"),
        root("./utils/mediakeys-helper"),
        nested("../utils/mediakeys-helper"),
    ];
    const CMCD: &[StubRule] = &[root("./controller/cmcd-controller")];
    const SUBTITLES: &[StubRule] = &[
        root("./utils/cues"),
        root("./controller/timeline-controller"),
        root("./controller/subtitle-track-controller"),
        root("./controller/subtitle-stream-controller"),
    ];
    const ALT_AUDIO: &[StubRule] = &[
        root("./controller/audio-track-controller"),
        root("./controller/audio-stream-controller"),
    ];
    const VARIABLE_SUBSTITUTION: &[StubRule] = &[
        root("./utils/variable-substitution"),
        nested("../utils/variable-substitution"),
    ];

    match feature {
        Feature::EmeDrm => EME,
        Feature::Cmcd => CMCD,
        Feature::Subtitles => SUBTITLES,
        Feature::AltAudio => ALT_AUDIO,
        Feature::VariableSubstitution => VARIABLE_SUBSTITUTION,
        // Guarded by its constant only; no module is stubbed.
        Feature::ContentSteering => &[],
    }
}

/// Mapping from module specifier to stub specifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    /// Stubs every module of every disabled feature.
    pub fn build(features: &FeatureSet) -> Self {
        let entries: BTreeMap<String, String> = features
            .disabled()
            .flat_map(stub_rules)
            .map(|rule| (rule.module.to_string(), rule.stub.to_string()))
            .collect();
        log::debug!("Alias table stubs {} module specifiers", entries.len());
        Self { entries }
    }

    /// Alias table for a profile: empty for [`Profile::Main`].
    pub fn for_profile(features: &FeatureSet, profile: Profile) -> Self {
        match profile {
            Profile::Main => Self::default(),
            Profile::Light => Self::build(features),
        }
    }

    /// Stub a specifier is redirected to.
    pub fn get(&self, module: &str) -> Option<&str> {
        self.entries.get(module).map(String::as_str)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.entries.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
