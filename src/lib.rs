//! Build-variant resolution and assembly for multi-bundle JavaScript libraries
//!
//! This library turns one source tree into several tailored bundles:
//! - Feature flags resolved once from the environment
//! - Compile-time constant and module-stub tables per `main`/`light` profile
//! - Source rewrite rules shared by every variant
//! - A catalog of variants deep-merged over a shared base configuration
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod metadata;
pub mod transform;
pub mod variants;

// Re-export commonly used types
pub use error::{CliError, ConfigNotFoundError, Result, VariantError};
