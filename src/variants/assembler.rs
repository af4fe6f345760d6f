//! Assembly of concrete build configurations.
//!
//! Each variant is assembled independently from immutable inputs: the base
//! descriptor, the variant descriptor, its constant and alias tables and the
//! shared rewrite rules. Nothing is mutated in place, so the order in which
//! variants are assembled cannot change the result.

use super::base::BaseDescriptor;
use super::merge::deep_merge;
use super::{
    AliasTable, ConstantTable, DEPLOYMENT_CONSTANT, Deployment, FeatureSet, Mode, Profile,
    VariantDescriptor, VariantRegistry,
};
use crate::transform::TransformRuleSet;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

/// Prefix that makes a bundle a no-op outside a browser-like host.
pub const BROWSER_GUARD: &str = "typeof window !== \"undefined\" &&";

/// Fully merged configuration of one variant, ready for the bundler.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteConfig {
    name: String,
    mode: Mode,
    profile: Profile,
    value: Value,
}

impl ConcreteConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// The merged configuration tree.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl Serialize for ConcreteConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Merges variants over a shared base.
#[derive(Debug, Clone)]
pub struct ConfigAssembler<'a> {
    base: &'a BaseDescriptor,
    rules: &'a TransformRuleSet,
    release: bool,
}

impl<'a> ConfigAssembler<'a> {
    /// `release` forces diagnostic stripping on every variant.
    pub fn new(base: &'a BaseDescriptor, rules: &'a TransformRuleSet, release: bool) -> Self {
        Self {
            base,
            rules,
            release,
        }
    }

    /// Assembles one variant from precomputed tables.
    pub fn assemble(
        &self,
        variant: &VariantDescriptor,
        constants: &ConstantTable,
        aliases: &AliasTable,
    ) -> ConcreteConfig {
        let base = self
            .base
            .with_loader_plugins(
                vec![self.rules.rewrite_plugin()],
                self.rules.strip_plugin(variant.mode, self.release).into_iter().collect(),
            );

        let mut overlay = variant.to_overlay();
        overlay["plugins"] = json!([
            {
                "plugin": "DefinePlugin",
                "options": constants.to_definitions(),
            },
            {
                "plugin": "BannerPlugin",
                "options": {
                    "banner": BROWSER_GUARD,
                    "entryOnly": true,
                    "raw": true,
                },
            },
        ]);
        if variant.profile == Profile::Light {
            overlay["resolve"] = json!({ "alias": aliases });
        }

        ConcreteConfig {
            name: variant.name.clone(),
            mode: variant.mode,
            profile: variant.profile,
            value: deep_merge(base.value(), &overlay),
        }
    }

    /// Assembles every registry entry in catalog order.
    ///
    /// Constant tables are built per profile, and deployment metadata is
    /// added only to variants that declare it.
    pub fn assemble_all(
        &self,
        registry: &VariantRegistry,
        features: &FeatureSet,
        deployment: &Deployment,
        version: &str,
    ) -> Vec<ConcreteConfig> {
        registry
            .iter()
            .map(|variant| {
                let mut constants = ConstantTable::build(features, variant.profile, version);
                if variant.deployment_metadata {
                    constants = constants.with(DEPLOYMENT_CONSTANT, deployment.metadata_value());
                }
                let aliases = AliasTable::for_profile(features, variant.profile);
                self.assemble(variant, &constants, &aliases)
            })
            .collect()
    }
}
