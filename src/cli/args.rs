//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap,
//! with validation and error handling.

use clap::Parser;
use path_absolutize::Absolutize;
use std::path::PathBuf;

/// Build-variant configuration generator
#[derive(Parser, Debug)]
#[command(
    name = "bundle_variants",
    version,
    about = "Resolves feature flags and emits one bundler configuration per build variant",
    long_about = "Resolves feature flags from the environment and emits the merged bundler configuration of every requested build variant as a JSON array.

Feature flags (either name enables the feature):
  SUBTITLE / USE_SUBTITLES, ALT_AUDIO / USE_ALT_AUDIO, EME_DRM / USE_EME_DRM,
  CMCD / USE_CMCD, CONTENT_STEERING / USE_CONTENT_STEERING,
  VARIABLE_SUBSTITUTION / USE_VARIABLE_SUBSTITUTION

Usage:
  bundle_variants                          # every variant
  bundle_variants light light-dist         # only the light builds
  EME_DRM=1 bundle_variants --env light    # light build keeping DRM support
  bundle_variants dist --transform src/hls.ts

No variant names means build everything."
)]
pub struct Args {
    /// Variant names to build
    #[arg(value_name = "VARIANT")]
    pub variants: Vec<String>,

    /// Requested variant as KEY or KEY=VALUE (repeatable); the value is ignored
    #[arg(long = "env", value_name = "KEY[=VALUE]")]
    pub env: Vec<String>,

    /// Project root that output and polyfill paths are resolved against
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Manifest the version is read from (default: <root>/package.json)
    #[arg(long, value_name = "PATH")]
    pub package_json: Option<PathBuf>,

    /// Version string to inject instead of the manifest's
    #[arg(long, value_name = "VERSION")]
    pub pkg_version: Option<String>,

    /// TOML variant catalog replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Write the JSON configuration array to this path instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print known variant names and exit
    #[arg(long)]
    pub list: bool,

    /// Run the first selected variant's rewrite rules over a source file and print the result
    #[arg(long, value_name = "FILE", conflicts_with = "list")]
    pub transform: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(key) = self
            .env
            .iter()
            .map(|entry| request_key(entry))
            .find(|key| key.is_empty())
        {
            return Err(format!("Invalid --env entry '{key}': key cannot be empty"));
        }

        if self.pkg_version.as_deref().is_some_and(str::is_empty) {
            return Err("--pkg-version cannot be empty".to_string());
        }

        Ok(())
    }

    /// Requested variant names: positional names, then `--env` keys.
    pub fn requested(&self) -> Vec<String> {
        self.variants
            .iter()
            .cloned()
            .chain(self.env.iter().map(|entry| request_key(entry).to_string()))
            .collect()
    }

    /// Absolute project root.
    pub fn root(&self) -> std::io::Result<PathBuf> {
        Ok(self.root.absolutize()?.into_owned())
    }
}

/// Key part of a `KEY[=VALUE]` entry.
fn request_key(entry: &str) -> &str {
    entry.split_once('=').map_or(entry, |(key, _)| key).trim()
}
