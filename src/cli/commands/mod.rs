//! Command execution: turns parsed arguments into a deploy run and an exit code.

mod deploy;

use crate::cli::{Args, RuntimeConfig};

use deploy::execute_deploy;

/// Execute the deploy described by `args` and return the process exit code
pub async fn execute_command(args: Args) -> i32 {
    let config = RuntimeConfig::from(&args);

    match execute_deploy(&args, &config).await {
        Ok(()) => 0,
        Err(e) => {
            config.error_println(&e.to_string());

            if config.is_verbose() {
                let suggestions = e.recovery_suggestions();
                if !suggestions.is_empty() {
                    config.output().error_detail("Recovery suggestions:");
                    for suggestion in suggestions {
                        config.output().error_detail(&format!("  • {suggestion}"));
                    }
                }
            }

            e.exit_code()
        }
    }
}
