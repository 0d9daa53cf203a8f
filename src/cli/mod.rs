//! Command line interface for wp-plugin-deploy.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig, parse_comma_list};
pub use commands::execute_command;
pub use output::OutputManager;

/// Main CLI entry point, returns the process exit code
pub async fn run() -> i32 {
    execute_command(Args::parse_args()).await
}
