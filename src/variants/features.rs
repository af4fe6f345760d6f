//! Feature flag resolution from the process environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time copy of the process environment.
///
/// Taken once at startup and threaded through every resolver, so nothing
/// downstream reads ambient process state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Returns the raw value of a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether the variable is set to a non-empty string.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// Whether the variable is exactly the string `"true"`.
    pub fn is_literal_true(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A toggleable capability of the library being bundled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Subtitles,
    AltAudio,
    EmeDrm,
    Cmcd,
    ContentSteering,
    VariableSubstitution,
}

impl Feature {
    /// Every feature, in constant-table order.
    pub const ALL: [Feature; 6] = [
        Feature::Subtitles,
        Feature::AltAudio,
        Feature::EmeDrm,
        Feature::Cmcd,
        Feature::ContentSteering,
        Feature::VariableSubstitution,
    ];

    /// Environment variables that enable this feature: the current name
    /// first, then the legacy `USE_` spelling.
    pub fn env_synonyms(self) -> &'static [&'static str] {
        match self {
            Feature::Subtitles => &["SUBTITLE", "USE_SUBTITLES"],
            Feature::AltAudio => &["ALT_AUDIO", "USE_ALT_AUDIO"],
            Feature::EmeDrm => &["EME_DRM", "USE_EME_DRM"],
            Feature::Cmcd => &["CMCD", "USE_CMCD"],
            Feature::ContentSteering => &["CONTENT_STEERING", "USE_CONTENT_STEERING"],
            Feature::VariableSubstitution => {
                &["VARIABLE_SUBSTITUTION", "USE_VARIABLE_SUBSTITUTION"]
            }
        }
    }

    /// Compile-time constant that guards this feature in the bundled source.
    pub fn constant_name(self) -> &'static str {
        match self {
            Feature::Subtitles => "__USE_SUBTITLES__",
            Feature::AltAudio => "__USE_ALT_AUDIO__",
            Feature::EmeDrm => "__USE_EME_DRM__",
            Feature::Cmcd => "__USE_CMCD__",
            Feature::ContentSteering => "__USE_CONTENT_STEERING__",
            Feature::VariableSubstitution => "__USE_VARIABLE_SUBSTITUTION__",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Feature::Subtitles => "subtitles",
            Feature::AltAudio => "altAudio",
            Feature::EmeDrm => "emeDrm",
            Feature::Cmcd => "cmcd",
            Feature::ContentSteering => "contentSteering",
            Feature::VariableSubstitution => "variableSubstitution",
        };
        f.write_str(name)
    }
}

/// Canonical set of enabled features for one build invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub subtitles: bool,
    pub alt_audio: bool,
    pub eme_drm: bool,
    pub cmcd: bool,
    pub content_steering: bool,
    pub variable_substitution: bool,
}

impl FeatureSet {
    /// Every feature enabled.
    pub fn all() -> Self {
        Self::from_fn(|_| true)
    }

    /// Every feature disabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a set by asking `enabled` about each feature.
    pub fn from_fn(mut enabled: impl FnMut(Feature) -> bool) -> Self {
        Self {
            subtitles: enabled(Feature::Subtitles),
            alt_audio: enabled(Feature::AltAudio),
            eme_drm: enabled(Feature::EmeDrm),
            cmcd: enabled(Feature::Cmcd),
            content_steering: enabled(Feature::ContentSteering),
            variable_substitution: enabled(Feature::VariableSubstitution),
        }
    }

    /// Whether a feature is enabled.
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Subtitles => self.subtitles,
            Feature::AltAudio => self.alt_audio,
            Feature::EmeDrm => self.eme_drm,
            Feature::Cmcd => self.cmcd,
            Feature::ContentSteering => self.content_steering,
            Feature::VariableSubstitution => self.variable_substitution,
        }
    }

    /// Returns a copy with one feature switched.
    pub fn with(self, feature: Feature, enabled: bool) -> Self {
        Self::from_fn(|f| if f == feature { enabled } else { self.is_enabled(f) })
    }

    /// Features that are switched off.
    pub fn disabled(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(|f| !self.is_enabled(*f))
    }
}

/// Resolves a [`FeatureSet`] from an environment snapshot.
///
/// A feature is on when any of its synonyms holds a non-empty value. Missing
/// or empty variables leave it off; resolution never fails.
pub fn resolve(env: &EnvSnapshot) -> FeatureSet {
    let features = FeatureSet::from_fn(|feature| {
        feature.env_synonyms().iter().any(|key| env.is_truthy(key))
    });
    log::debug!("Resolved features: {features:?}");
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_environment_disables_everything() {
        assert_eq!(resolve(&EnvSnapshot::default()), FeatureSet::none());
    }

    #[test]
    fn legacy_and_current_names_both_enable() {
        let env: EnvSnapshot = [("SUBTITLE", "1"), ("USE_CMCD", "yes")].into_iter().collect();
        let features = resolve(&env);
        assert!(features.subtitles);
        assert!(features.cmcd);
        assert!(!features.alt_audio);
        assert!(!features.eme_drm);
    }

    #[test]
    fn empty_value_is_not_truthy() {
        let env: EnvSnapshot = [("EME_DRM", ""), ("USE_EME_DRM", "")].into_iter().collect();
        assert!(!resolve(&env).eme_drm);
    }

    #[test]
    fn with_toggles_a_single_feature() {
        let set = FeatureSet::all().with(Feature::EmeDrm, false);
        assert_eq!(set.disabled().collect::<Vec<_>>(), vec![Feature::EmeDrm]);
    }

    proptest! {
        #[test]
        fn resolution_is_idempotent_and_total(
            vars in proptest::collection::btree_map(
                prop::sample::select(vec![
                    "SUBTITLE", "USE_SUBTITLES", "ALT_AUDIO", "USE_ALT_AUDIO",
                    "EME_DRM", "USE_EME_DRM", "CMCD", "USE_CMCD",
                    "CONTENT_STEERING", "USE_CONTENT_STEERING",
                    "VARIABLE_SUBSTITUTION", "USE_VARIABLE_SUBSTITUTION", "UNRELATED",
                ]),
                ".{0,4}",
                0..8,
            )
        ) {
            let env: EnvSnapshot = vars.clone().into_iter().collect();
            let first = resolve(&env);
            prop_assert_eq!(first, resolve(&env));
            for feature in Feature::ALL {
                let expected = feature
                    .env_synonyms()
                    .iter()
                    .any(|k| vars.get(*k).is_some_and(|v| !v.is_empty()));
                prop_assert_eq!(first.is_enabled(feature), expected);
            }
        }
    }
}
