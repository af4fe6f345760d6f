//! Comprehensive error types for variant resolution and assembly.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use thiserror::Error;

/// Result type alias for variant operations
pub type Result<T> = std::result::Result<T, VariantError>;

/// Main error type for all variant operations
#[derive(Error, Debug)]
pub enum VariantError {
    /// Requested variant names matched nothing in the registry
    #[error(transparent)]
    ConfigNotFound(#[from] ConfigNotFoundError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// None of the requested variant names exist in the registry.
///
/// Carries both the rejected names and every known name so the message can
/// be shown to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Couldn't find a valid config with the names {}. Known configs are: {}",
    render_names(.requested),
    .known.join(", ")
)]
pub struct ConfigNotFoundError {
    /// Names that were requested (reserved keys already removed)
    pub requested: Vec<String>,

    /// Every variant name in registry order, duplicates included
    pub known: Vec<String>,
}

fn render_names(names: &[String]) -> String {
    serde_json::to_string(names).unwrap_or_else(|_| format!("{names:?}"))
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl VariantError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            VariantError::ConfigNotFound(err) => vec![format!(
                "Re-run with one or more of: {}",
                err.known.join(", ")
            )],
            VariantError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see the accepted arguments".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VariantError::ConfigNotFound(_) | VariantError::Cli(CliError::InvalidArguments { .. })
        )
    }
}
