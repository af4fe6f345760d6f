//! Build-variant resolution and assembly.
//!
//! Data flows leaf-first through this module:
//!
//! 1. [`features::resolve`] turns an [`EnvSnapshot`] into a [`FeatureSet`]
//! 2. [`ConstantTable::build`] and [`AliasTable::for_profile`] derive the
//!    per-profile define and module-substitution tables
//! 3. [`ConfigAssembler`] merges each [`VariantDescriptor`] of a
//!    [`VariantRegistry`] over the [`BaseDescriptor`], together with those
//!    tables and the shared [`TransformRuleSet`](crate::transform::TransformRuleSet)
//! 4. [`selector::select`] filters the result by requested names
//!
//! # Example
//!
//! ```no_run
//! use bundle_variants::transform::TransformRuleSet;
//! use bundle_variants::variants::{
//!     self, BaseDescriptor, ConfigAssembler, Deployment, EnvSnapshot, VariantRegistry,
//! };
//! use std::path::Path;
//!
//! # fn example() -> bundle_variants::Result<()> {
//! let root = Path::new("/work/hls");
//! let env = EnvSnapshot::capture();
//! let features = variants::resolve(&env);
//! let deployment = Deployment::resolve(&env);
//!
//! let base = BaseDescriptor::standard(root);
//! let rules = TransformRuleSet::standard("/work/hls/src/polyfills/number");
//! let configs = ConfigAssembler::new(&base, &rules, deployment.release).assemble_all(
//!     &VariantRegistry::standard(root)?,
//!     &features,
//!     &deployment,
//!     "1.5.0",
//! );
//! let selected = variants::select(&["light"], configs)?;
//! # Ok(())
//! # }
//! ```

mod aliases;
mod assembler;
mod base;
mod builder;
mod constants;
mod deployment;
mod descriptor;
pub mod features;
pub mod merge;
mod registry;
pub mod selector;

pub use aliases::{AliasTable, NESTED_STUB, ROOT_STUB, StubRule, stub_rules};
pub use assembler::{BROWSER_GUARD, ConcreteConfig, ConfigAssembler};
pub use base::{BROWSER_TARGETS, BaseDescriptor, SOURCE_LOADER};
pub use builder::VariantDescriptorBuilder;
pub use constants::{ConstantTable, DEPLOYMENT_CONSTANT, VERSION_CONSTANT};
pub use deployment::{Deployment, DeploymentMetadata, RELEASE_FLAG};
pub use descriptor::{
    DevtoolPolicy, LibraryDescriptor, Mode, OutputDescriptor, Profile, VariantDescriptor,
};
pub use features::{EnvSnapshot, Feature, FeatureSet, resolve};
pub use merge::deep_merge;
pub use registry::VariantRegistry;
pub use selector::{check_requested, is_reserved, select};
