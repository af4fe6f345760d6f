//! Package version discovery from `package.json`.

use crate::error::{CliError, Result, VariantError};
use std::path::Path;

/// Package metadata extracted from `package.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Package name, when declared
    pub name: Option<String>,

    /// Package version (e.g., "1.5.0")
    pub version: String,
}

/// Parses manifest text.
///
/// A version that is not valid semver is still accepted, with a warning,
/// since it is injected verbatim as a string constant.
pub fn parse_manifest(source: &str) -> Result<PackageMetadata> {
    let manifest: serde_json::Value = serde_json::from_str(source)?;

    let version = manifest
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            VariantError::Cli(CliError::InvalidArguments {
                reason: "Missing 'version' in package.json".to_string(),
            })
        })?
        .to_string();

    if let Err(e) = semver::Version::parse(&version) {
        log::warn!("Package version '{}' is not valid semver: {}", version, e);
    }

    Ok(PackageMetadata {
        name: manifest
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from),
        version,
    })
}

/// Reads and parses a `package.json` file.
pub async fn load_manifest(path: &Path) -> Result<PackageMetadata> {
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
        VariantError::Cli(CliError::ExecutionFailed {
            command: "read_package_json".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;

    let metadata = parse_manifest(&source)?;
    log::debug!(
        "Loaded {} version {} from {}",
        metadata.name.as_deref().unwrap_or("<unnamed>"),
        metadata.version,
        path.display()
    );
    Ok(metadata)
}
