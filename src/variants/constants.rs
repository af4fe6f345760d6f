//! Compile-time constant tables injected through the define step.

use super::descriptor::Profile;
use super::features::{Feature, FeatureSet};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Name of the version constant.
pub const VERSION_CONSTANT: &str = "__VERSION__";

/// Name of the deployment metadata constant.
pub const DEPLOYMENT_CONSTANT: &str = "__NETLIFY__";

/// Mapping from constant name to a JSON literal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConstantTable {
    entries: BTreeMap<String, Value>,
}

impl ConstantTable {
    /// Builds the table for one profile.
    ///
    /// Under [`Profile::Main`] every feature constant is `true`; under
    /// [`Profile::Light`] each one mirrors `features`.
    pub fn build(features: &FeatureSet, profile: Profile, version: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(VERSION_CONSTANT.to_string(), Value::String(version.to_string()));
        for feature in Feature::ALL {
            let enabled = profile == Profile::Main || features.is_enabled(feature);
            entries.insert(feature.constant_name().to_string(), Value::Bool(enabled));
        }
        Self { entries }
    }

    /// Returns a copy with one extra constant.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.entries.insert(name.into(), value);
        self
    }

    /// Value of a constant.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Boolean constant for a feature.
    pub fn feature(&self, feature: Feature) -> Option<bool> {
        self.get(feature.constant_name()).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Definitions as the define step consumes them: each value replaced by
    /// its JSON source text.
    pub fn to_definitions(&self) -> serde_json::Map<String, Value> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn main_profile_forces_every_feature_on() {
        let table = ConstantTable::build(&FeatureSet::none(), Profile::Main, "1.0.0");
        for feature in Feature::ALL {
            assert_eq!(table.feature(feature), Some(true), "{feature}");
        }
    }

    #[test]
    fn light_profile_mirrors_features() {
        let features = FeatureSet::none()
            .with(Feature::Cmcd, true)
            .with(Feature::Subtitles, true);
        let table = ConstantTable::build(&features, Profile::Light, "1.0.0");
        for feature in Feature::ALL {
            assert_eq!(table.feature(feature), Some(features.is_enabled(feature)));
        }
    }

    #[test]
    fn definitions_are_json_source_text() {
        let table = ConstantTable::build(&FeatureSet::all(), Profile::Light, "1.5.0")
            .with(DEPLOYMENT_CONSTANT, json!({}));
        let defs = table.to_definitions();
        assert_eq!(defs["__VERSION__"], json!("\"1.5.0\""));
        assert_eq!(defs["__USE_CMCD__"], json!("true"));
        assert_eq!(defs["__NETLIFY__"], json!("{}"));
        assert_eq!(table.len(), 8);
    }
}
