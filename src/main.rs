//! Bundle Variants - build-variant configuration generator.
//!
//! This binary resolves feature flags from the environment and emits the
//! merged bundler configuration of every requested build variant.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match bundle_variants::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
