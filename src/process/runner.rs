//! Subprocess execution.

use std::future::Future;
use std::process::{ExitStatus, Stdio};

use crate::cli::OutputManager;
use crate::error::CommandError;

use super::CommandLine;

/// Executes external commands on behalf of the deploy pipeline.
///
/// Every call must succeed: a non-zero exit is returned as
/// [`CommandError::Failed`] carrying the child's own exit status.
pub trait CommandRunner {
    /// Run a command to completion and return its captured stdout
    fn run(&self, cmd: &CommandLine) -> impl Future<Output = Result<String, CommandError>>;

    /// Run `producer | consumer`, feeding the producer's stdout into the consumer's stdin
    fn pipe(
        &self,
        producer: &CommandLine,
        consumer: &CommandLine,
    ) -> impl Future<Output = Result<(), CommandError>>;
}

/// Runner backed by real child processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    output: OutputManager,
}

impl SystemRunner {
    /// Create a runner; command echo follows the output manager's verbosity
    pub fn new(output: OutputManager) -> Self {
        Self { output }
    }

    fn announce(&self, rendered: &str) {
        log::debug!("spawning {rendered}");
        let _ = self.output.verbose(&format!("Executing: {rendered}"));
    }

    fn check(&self, rendered: &str, status: ExitStatus) -> Result<(), CommandError> {
        if status.success() {
            return Ok(());
        }
        let code = status.code().unwrap_or(1);
        log::debug!("`{rendered}` exited with {code}");
        Err(CommandError::Failed {
            command: rendered.to_string(),
            code,
        })
    }
}

fn spawn_error(command: &str) -> impl FnOnce(std::io::Error) -> CommandError + '_ {
    move |source| CommandError::Spawn {
        command: command.to_string(),
        source,
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, cmd: &CommandLine) -> Result<String, CommandError> {
        let rendered = cmd.to_string();
        self.announce(&rendered);

        // stdin stays attached so svn can prompt for credentials
        let child = cmd
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error(&rendered))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(spawn_error(&rendered))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if self.output.is_verbose() && !stdout.trim().is_empty() {
            let _ = self.output.println(stdout.trim_end());
        }

        self.check(&rendered, output.status)?;
        Ok(stdout)
    }

    async fn pipe(
        &self,
        producer: &CommandLine,
        consumer: &CommandLine,
    ) -> Result<(), CommandError> {
        let producer_rendered = producer.to_string();
        let consumer_rendered = consumer.to_string();
        self.announce(&format!("{producer_rendered} | {consumer_rendered}"));

        let mut producer_child = producer
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error(&producer_rendered))?;

        let handoff = producer_child.stdout.take().ok_or_else(|| CommandError::Spawn {
            command: producer_rendered.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;
        let handoff: Stdio = handoff
            .try_into()
            .map_err(spawn_error(&producer_rendered))?;

        let consumer_stdout = if self.output.is_verbose() {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let mut consumer_child = consumer
            .to_command()
            .stdin(handoff)
            .stdout(consumer_stdout)
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error(&consumer_rendered))?;

        let producer_status = producer_child
            .wait()
            .await
            .map_err(spawn_error(&producer_rendered))?;
        let consumer_status = consumer_child
            .wait()
            .await
            .map_err(spawn_error(&consumer_rendered))?;

        self.check(&producer_rendered, producer_status)?;
        self.check(&consumer_rendered, consumer_status)
    }
}
