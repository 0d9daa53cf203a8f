//! Argument-list representation of an external command.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder printed instead of secret arguments
const REDACTED: &str = "********";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandArg {
    value: OsString,
    secret: bool,
}

/// An external command as program + argv + working directory.
///
/// Arguments are handed to the OS untouched, nothing is ever joined into a
/// shell string. `Display` renders a quoted form for logs with secret
/// arguments masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<CommandArg>,
    cwd: Option<PathBuf>,
}

impl CommandLine {
    /// Start a command line for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, value: impl AsRef<OsStr>) -> Self {
        self.args.push(CommandArg {
            value: value.as_ref().to_os_string(),
            secret: false,
        });
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for value in values {
            self = self.arg(value);
        }
        self
    }

    /// Append an argument that must never be echoed
    pub fn secret_arg(mut self, value: impl AsRef<OsStr>) -> Self {
        self.args.push(CommandArg {
            value: value.as_ref().to_os_string(),
            secret: true,
        });
        self
    }

    /// Run the command from `dir`
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Working directory, if one was set
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Argument values as lossy strings, secrets included
    pub fn argv_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.value.to_string_lossy().into_owned())
            .collect()
    }

    /// Build the tokio command ready to spawn
    pub fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(self.args.iter().map(|a| &a.value));
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            if arg.secret {
                write!(f, " {REDACTED}")?;
            } else {
                write!(f, " {}", quote(&arg.value.to_string_lossy()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_quoted_argv() {
        let cmd = CommandLine::new("svn")
            .arg("commit")
            .arg("-m")
            .arg("Update plugin to version 1.0.0");
        assert_eq!(
            cmd.to_string(),
            "svn commit -m 'Update plugin to version 1.0.0'"
        );
    }

    #[test]
    fn masks_secret_arguments() {
        let cmd = CommandLine::new("svn")
            .arg("--password")
            .secret_arg("hunter2");
        assert_eq!(cmd.to_string(), "svn --password ********");
        assert_eq!(cmd.argv_lossy(), vec!["--password", "hunter2"]);
    }

    #[test]
    fn quotes_embedded_single_quotes() {
        let cmd = CommandLine::new("echo").arg("it's");
        assert_eq!(cmd.to_string(), r"echo 'it'\''s'");
    }

    #[test]
    fn keeps_working_directory() {
        let cmd = CommandLine::new("svn").arg("status").current_dir("/tmp/x");
        assert_eq!(cmd.cwd(), Some(Path::new("/tmp/x")));
        assert_eq!(cmd.program(), "svn");
    }
}
