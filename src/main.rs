//! Electronifier Release - packages desktop applications and publishes them.
//!
//! This binary loads a release manifest, runs the pipeline and reports
//! progress on the terminal.

use electronifier_release::ReleaseError;
use electronifier_release::cli;
use electronifier_release::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            // Show recovery suggestions for critical errors
            let suggestions = e
                .downcast_ref::<ReleaseError>()
                .map(ReleaseError::recovery_suggestions)
                .unwrap_or_default();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
