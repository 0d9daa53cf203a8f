//! External command execution.
//!
//! Commands are built as argument lists ([`CommandLine`]) and executed through
//! a [`CommandRunner`]. The deploy pipeline only ever talks to the trait, so
//! tests can substitute a recording runner.

mod command_line;
mod runner;

pub use command_line::CommandLine;
pub use runner::{CommandRunner, SystemRunner};

use crate::error::CommandError;

/// Verify every tool in `tools` resolves on `PATH`
pub fn ensure_tools(tools: &[&str]) -> Result<(), CommandError> {
    for tool in tools {
        match which::which(tool) {
            Ok(path) => log::debug!("found {tool} at {}", path.display()),
            Err(_) => {
                return Err(CommandError::ToolNotFound {
                    tool: (*tool).to_string(),
                });
            }
        }
    }
    Ok(())
}
