//! Static catalog of build variants.

use super::{Mode, Profile, VariantDescriptor, VariantDescriptorBuilder};
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Ordered catalog of variant descriptors.
///
/// Names are not required to be unique: the standard catalog declares
/// `debug` and `demo` twice, once per deployment target, and both entries
/// are assembled independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantRegistry {
    variants: Vec<VariantDescriptor>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "variant")]
    variants: Vec<VariantDescriptor>,
}

impl VariantRegistry {
    pub fn new(variants: Vec<VariantDescriptor>) -> Self {
        Self { variants }
    }

    /// The built-in catalog with output directories under `root`.
    ///
    /// # Errors
    ///
    /// Only fails if a catalog entry is missing a required field.
    pub fn standard(root: &Path) -> Result<Self> {
        let dist = root.join("dist");
        let demo = root.join("demo");

        let library = |name: &str, dir: &Path, public_path: &str| {
            VariantDescriptorBuilder::new(name)
                .output_dir(dir)
                .public_path(public_path)
                .library("Hls")
        };
        let demo_harness = |dir: &Path, public_path: &str| {
            VariantDescriptorBuilder::new("demo")
                .mode(Mode::Development)
                .entry("./demo/main")
                .filename("hls-demo.js")
                .source_map_filename("hls-demo.js.map")
                .output_dir(dir)
                .public_path(public_path)
                .library("HlsDemo")
                .deployment_metadata(true)
        };

        let variants = vec![
            library("debug", &dist, "/dist/")
                .mode(Mode::Development)
                .filename("hls.js")
                .source_map_filename("hls.js.map")
                .build()?,
            library("dist", &dist, "/dist/")
                .mode(Mode::Production)
                .filename("hls.min.js")
                .build()?,
            library("light", &dist, "/dist/")
                .mode(Mode::Development)
                .profile(Profile::Light)
                .filename("hls.light.js")
                .source_map_filename("hls.light.js.map")
                .build()?,
            library("light-dist", &dist, "/dist/")
                .mode(Mode::Production)
                .profile(Profile::Light)
                .filename("hls.light.min.js")
                .build()?,
            demo_harness(&dist, "/dist/").build()?,
            // Same targets again, served from the demo directory.
            library("debug", &demo, "/demo/")
                .mode(Mode::Development)
                .filename("hls.js")
                .source_map_filename("hls.js.map")
                .build()?,
            demo_harness(&demo, "/demo/").build()?,
        ];

        Ok(Self { variants })
    }

    /// Parses a TOML catalog of `[[variant]]` tables.
    ///
    /// Relative output directories resolve against `root`.
    pub fn from_toml_str(source: &str, root: &Path) -> Result<Self> {
        let catalog: CatalogFile = toml::from_str(source)?;
        if catalog.variants.is_empty() {
            log::warn!("Variant catalog declares no variants");
        }
        Ok(Self {
            variants: catalog
                .variants
                .into_iter()
                .map(|v| v.with_root(root))
                .collect(),
        })
    }

    /// Reads and parses a TOML catalog file.
    pub async fn load(path: &Path, root: &Path) -> Result<Self> {
        use anyhow::Context;

        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read variant catalog {}", path.display()))?;
        Self::from_toml_str(&source, root)
    }

    /// Every variant name in catalog order, duplicates included.
    pub fn names(&self) -> Vec<String> {
        self.variants.iter().map(|v| v.name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariantDescriptor> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<'a> IntoIterator for &'a VariantRegistry {
    type Item = &'a VariantDescriptor;
    type IntoIter = std::slice::Iter<'a, VariantDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn standard_catalog_keeps_duplicate_names() {
        let registry = VariantRegistry::standard(Path::new("/repo")).unwrap();
        assert_eq!(
            registry.names(),
            vec!["debug", "dist", "light", "light-dist", "demo", "debug", "demo"]
        );

        let debug_dirs: Vec<&PathBuf> = registry
            .iter()
            .filter(|v| v.name == "debug")
            .map(|v| &v.output.path)
            .collect();
        assert_eq!(
            debug_dirs,
            vec![&PathBuf::from("/repo/dist"), &PathBuf::from("/repo/demo")]
        );
    }

    #[test]
    fn only_demo_declares_deployment_metadata() {
        let registry = VariantRegistry::standard(Path::new("/repo")).unwrap();
        for variant in &registry {
            assert_eq!(variant.deployment_metadata, variant.name == "demo");
        }
    }

    #[test]
    fn toml_catalog_parses_with_defaults() {
        let source = r#"
            [[variant]]
            name = "tiny"
            mode = "production"
            profile = "light"

            [variant.output]
            filename = "tiny.min.js"
            path = "out"
            public_path = "/out/"

            [variant.output.library]
            name = "Tiny"
        "#;
        let registry = VariantRegistry::from_toml_str(source, Path::new("/repo")).unwrap();
        let tiny = registry.iter().next().unwrap();
        assert_eq!(tiny.profile, Profile::Light);
        assert_eq!(tiny.output.path, PathBuf::from("/repo/out"));
        assert_eq!(tiny.output.chunk_filename, "[name].js");
        assert_eq!(tiny.output.library.target, "umd");
        assert_eq!(tiny.output.library.export.as_deref(), Some("default"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(VariantRegistry::from_toml_str("[[variant]]\nname = 1", Path::new("/")).is_err());
    }
}
