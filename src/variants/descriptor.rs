//! Variant descriptor types.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Bundler mode of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

/// Whether disabled-feature code is compiled out.
///
/// `Main` always ships every feature; `Light` ships only what the
/// [`FeatureSet`](super::FeatureSet) enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Main,
    Light,
}

/// Source map emission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DevtoolPolicy {
    #[default]
    SourceMap,
    InlineSourceMap,
    HiddenSourceMap,
    Eval,
    None,
}

impl DevtoolPolicy {
    /// Value of the bundler's `devtool` field; `false` disables source maps.
    pub fn to_value(self) -> Value {
        match self {
            DevtoolPolicy::SourceMap => json!("source-map"),
            DevtoolPolicy::InlineSourceMap => json!("inline-source-map"),
            DevtoolPolicy::HiddenSourceMap => json!("hidden-source-map"),
            DevtoolPolicy::Eval => json!("eval"),
            DevtoolPolicy::None => json!(false),
        }
    }
}

/// Library export shape of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    /// Global name the bundle is exposed as (e.g. `Hls`).
    pub name: String,

    /// Module interop target.
    #[serde(default = "default_library_target")]
    pub target: String,

    /// Export picked as the library value.
    #[serde(default = "default_library_export")]
    pub export: Option<String>,

    /// Expression the UMD wrapper attaches to.
    #[serde(default = "default_global_object")]
    pub global_object: String,
}

fn default_library_target() -> String {
    "umd".to_string()
}

fn default_library_export() -> Option<String> {
    Some("default".to_string())
}

fn default_global_object() -> String {
    "this".to_string()
}

impl LibraryDescriptor {
    /// UMD library exposing its default export under `name`.
    pub fn umd(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: default_library_target(),
            export: default_library_export(),
            global_object: default_global_object(),
        }
    }
}

/// Where and how a variant's bundle is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// Bundle filename (e.g. `hls.min.js`).
    pub filename: String,

    /// Naming pattern for split chunks.
    #[serde(default = "default_chunk_filename")]
    pub chunk_filename: String,

    /// Source map filename, when it differs from the bundler default.
    #[serde(default)]
    pub source_map_filename: Option<String>,

    /// Output directory.
    pub path: PathBuf,

    /// URL prefix the bundle is served from.
    pub public_path: String,

    pub library: LibraryDescriptor,
}

fn default_chunk_filename() -> String {
    "[name].js".to_string()
}

impl OutputDescriptor {
    /// Renders the bundler's `output` section.
    fn to_value(&self) -> Value {
        let mut output = json!({
            "filename": self.filename,
            "chunkFilename": self.chunk_filename,
            "path": self.path.to_string_lossy(),
            "publicPath": self.public_path,
            "library": self.library.name,
            "libraryTarget": self.library.target,
            "globalObject": self.library.global_object,
        });
        if let Some(map) = &self.source_map_filename {
            output["sourceMapFilename"] = json!(map);
        }
        if let Some(export) = &self.library.export {
            output["libraryExport"] = json!(export);
        }
        output
    }
}

/// One named build target.
///
/// Constructed once from catalog data and never modified afterwards; see
/// [`VariantDescriptorBuilder`](super::VariantDescriptorBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    /// Selection key. Not unique: two descriptors may share a name.
    pub name: String,

    pub mode: Mode,

    /// Entry point overriding the base descriptor's.
    #[serde(default)]
    pub entry: Option<String>,

    pub output: OutputDescriptor,

    #[serde(default)]
    pub profile: Profile,

    #[serde(default)]
    pub devtool: DevtoolPolicy,

    /// Whether deployment metadata is injected as a constant.
    #[serde(default)]
    pub deployment_metadata: bool,
}

impl VariantDescriptor {
    /// Resolves a relative output directory against `root`.
    pub fn with_root(mut self, root: &Path) -> Self {
        if self.output.path.is_relative() {
            self.output.path = root.join(&self.output.path);
        }
        self
    }

    /// Renders the descriptor's own fields as a configuration overlay.
    ///
    /// Computed sections (define step, aliases, loader rules) are added by
    /// the assembler.
    pub fn to_overlay(&self) -> Value {
        let mut overlay = json!({
            "name": self.name,
            "mode": self.mode.as_str(),
            "output": self.output.to_value(),
            "devtool": self.devtool.to_value(),
        });
        if let Some(entry) = &self.entry {
            overlay["entry"] = json!(entry);
        }
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devtool_none_disables_source_maps() {
        assert_eq!(DevtoolPolicy::None.to_value(), json!(false));
        assert_eq!(DevtoolPolicy::SourceMap.to_value(), json!("source-map"));
    }

    #[test]
    fn relative_output_path_resolves_against_root() {
        let descriptor = VariantDescriptor {
            name: "debug".into(),
            mode: Mode::Development,
            entry: None,
            output: OutputDescriptor {
                filename: "hls.js".into(),
                chunk_filename: default_chunk_filename(),
                source_map_filename: None,
                path: PathBuf::from("dist"),
                public_path: "/dist/".into(),
                library: LibraryDescriptor::umd("Hls"),
            },
            profile: Profile::Main,
            devtool: DevtoolPolicy::SourceMap,
            deployment_metadata: false,
        }
        .with_root(Path::new("/work"));
        assert_eq!(descriptor.output.path, PathBuf::from("/work/dist"));

        let overlay = descriptor.to_overlay();
        assert_eq!(overlay["output"]["libraryExport"], json!("default"));
        assert!(overlay.get("entry").is_none());
        assert!(overlay["output"].get("sourceMapFilename").is_none());
    }
}
