//! Command line interface for the variant generator.
//!
//! This module wires argument parsing to the resolve → assemble → select
//! pipeline and writes the result.

mod args;
mod output;

pub use args::Args;
pub use output::{emit, write_file};

use crate::error::{CliError, Result, VariantError};
use crate::metadata;
use crate::transform::TransformRuleSet;
use crate::variants::{
    self, BaseDescriptor, ConfigAssembler, Deployment, EnvSnapshot, VariantRegistry,
};
use path_absolutize::Absolutize;
use std::path::Path;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args, &EnvSnapshot::capture()).await
}

/// Runs the pipeline for parsed arguments against an environment snapshot.
pub async fn execute(args: &Args, env: &EnvSnapshot) -> Result<i32> {
    args.validate()
        .map_err(|reason| VariantError::Cli(CliError::InvalidArguments { reason }))?;

    let root = args.root()?;
    let registry = match &args.catalog {
        Some(path) => VariantRegistry::load(path, &root).await?,
        None => VariantRegistry::standard(&root)?,
    };

    if args.list {
        emit(None, &registry.names().join("\n")).await?;
        return Ok(0);
    }

    let requested = args.requested();
    variants::check_requested(&requested, &registry.names())?;

    let version = match &args.pkg_version {
        Some(version) => version.clone(),
        None => {
            let manifest = args
                .package_json
                .clone()
                .unwrap_or_else(|| root.join("package.json"));
            metadata::load_manifest(&manifest).await?.version
        }
    };

    let features = variants::resolve(env);
    let deployment = Deployment::resolve(env);
    let base = BaseDescriptor::standard(&root);
    let rules = standard_rules(&root);

    let configs = ConfigAssembler::new(&base, &rules, deployment.release).assemble_all(
        &registry,
        &features,
        &deployment,
        &version,
    );
    let selected = variants::select(&requested, configs)?;

    if let Some(path) = &args.transform {
        let Some(first) = selected.first() else {
            return Err(CliError::InvalidArguments {
                reason: "No variant selected to transform with".to_string(),
            }
            .into());
        };
        let source = tokio::fs::read_to_string(path).await.map_err(|e| {
            VariantError::Cli(CliError::ExecutionFailed {
                command: "read_source".to_string(),
                reason: format!("Failed to read {}: {}", path.display(), e),
            })
        })?;
        let module = path.absolutize()?;
        let rewritten = rules.apply(&module, &source, first.mode(), deployment.release);
        emit(args.output.as_deref(), &rewritten).await?;
        return Ok(0);
    }

    let json = serde_json::to_string_pretty(&selected)?;
    emit(args.output.as_deref(), &json).await?;
    Ok(0)
}

/// Rewrite rules importing polyfills from `<root>/src/polyfills/number`.
pub fn standard_rules(root: &Path) -> TransformRuleSet {
    let polyfills = root.join("src").join("polyfills").join("number");
    TransformRuleSet::standard(polyfills.to_string_lossy())
}
