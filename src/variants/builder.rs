//! Builder for constructing variant descriptors.

use super::{DevtoolPolicy, LibraryDescriptor, Mode, OutputDescriptor, Profile, VariantDescriptor};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Builder for constructing [`VariantDescriptor`].
///
/// Provides a fluent API for declaring catalog entries.
///
/// # Examples
///
/// ```no_run
/// use bundle_variants::variants::{Mode, Profile, VariantDescriptorBuilder};
///
/// # fn example() -> bundle_variants::Result<()> {
/// let light = VariantDescriptorBuilder::new("light")
///     .mode(Mode::Development)
///     .profile(Profile::Light)
///     .filename("hls.light.js")
///     .source_map_filename("hls.light.js.map")
///     .output_dir("dist")
///     .public_path("/dist/")
///     .library("Hls")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct VariantDescriptorBuilder {
    name: String,
    mode: Mode,
    entry: Option<String>,
    filename: Option<String>,
    chunk_filename: Option<String>,
    source_map_filename: Option<String>,
    output_dir: Option<PathBuf>,
    public_path: Option<String>,
    library: Option<LibraryDescriptor>,
    profile: Profile,
    devtool: DevtoolPolicy,
    deployment_metadata: bool,
}

impl VariantDescriptorBuilder {
    /// Creates a builder for a variant called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the bundler mode.
    ///
    /// Default: [`Mode::Development`]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the base entry point.
    pub fn entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    /// Sets the bundle filename.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the chunk naming pattern.
    ///
    /// Default: `[name].js`
    pub fn chunk_filename(mut self, pattern: impl Into<String>) -> Self {
        self.chunk_filename = Some(pattern.into());
        self
    }

    pub fn source_map_filename(mut self, filename: impl Into<String>) -> Self {
        self.source_map_filename = Some(filename.into());
        self
    }

    /// Sets the output directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the public path.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn public_path(mut self, public_path: impl Into<String>) -> Self {
        self.public_path = Some(public_path.into());
        self
    }

    /// Exposes the bundle as a UMD library under `name`.
    ///
    /// # Required
    ///
    /// This field (or [`Self::library_descriptor`]) is required for building.
    pub fn library(self, name: impl Into<String>) -> Self {
        self.library_descriptor(LibraryDescriptor::umd(name))
    }

    pub fn library_descriptor(mut self, library: LibraryDescriptor) -> Self {
        self.library = Some(library);
        self
    }

    /// Default: [`Profile::Main`]
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Default: [`DevtoolPolicy::SourceMap`]
    pub fn devtool(mut self, devtool: DevtoolPolicy) -> Self {
        self.devtool = devtool;
        self
    }

    /// Injects deployment metadata into this variant's constants.
    pub fn deployment_metadata(mut self, enabled: bool) -> Self {
        self.deployment_metadata = enabled;
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or a required field is missing:
    /// - `filename`
    /// - `output_dir`
    /// - `public_path`
    /// - `library`
    pub fn build(self) -> crate::Result<VariantDescriptor> {
        if self.name.is_empty() {
            return Err(anyhow::anyhow!("variant name must not be empty").into());
        }
        let name = self.name;

        let output = OutputDescriptor {
            filename: self
                .filename
                .with_context(|| format!("filename is required for variant '{name}'"))?,
            chunk_filename: self.chunk_filename.unwrap_or_else(|| "[name].js".to_string()),
            source_map_filename: self.source_map_filename,
            path: self
                .output_dir
                .with_context(|| format!("output_dir is required for variant '{name}'"))?,
            public_path: self
                .public_path
                .with_context(|| format!("public_path is required for variant '{name}'"))?,
            library: self
                .library
                .with_context(|| format!("library is required for variant '{name}'"))?,
        };

        Ok(VariantDescriptor {
            name,
            mode: self.mode,
            entry: self.entry,
            output,
            profile: self.profile,
            devtool: self.devtool,
            deployment_metadata: self.deployment_metadata,
        })
    }
}
