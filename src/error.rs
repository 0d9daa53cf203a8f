//! Error types for plugin deployment.
//!
//! Every failure carries the process exit status it maps to, so the binary
//! performs exactly one `process::exit` at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for validation failures (missing flag, readme, build dir).
pub const EXIT_VALIDATION: i32 = 1;

/// Exit status for a required tool missing from `PATH`, as reported by a shell.
pub const EXIT_TOOL_NOT_FOUND: i32 = 127;

/// Result type alias for deploy operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Main error type for all deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// CLI argument errors
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Readme parsing errors
    #[error(transparent)]
    Readme(#[from] ReadmeError),

    /// Plugin/repository layout errors
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// External command errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Missing required argument
    #[error("need --{argument}=x")]
    MissingArgument {
        /// Flag name without the leading dashes
        argument: String,
    },

    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

/// Errors reading the plugin readme
#[derive(Error, Debug)]
pub enum ReadmeError {
    /// readme.txt missing from the plugin directory
    #[error("No readme.txt found at {path}")]
    NotFound {
        /// Expected readme location
        path: PathBuf,
    },

    /// Readme header has no `Stable tag:` line
    #[error("No stable tag found in readme {path}")]
    NoStableTag {
        /// Readme that was scanned
        path: PathBuf,
    },
}

/// Plugin and repository layout errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Plugin directory does not exist
    #[error("Plugin directory {path} does not exist")]
    PluginDirNotFound {
        /// Resolved plugin directory
        path: PathBuf,
    },

    /// Plugin directory has no final path segment to use as slug
    #[error("Cannot derive a plugin slug from {path}")]
    NoSlug {
        /// Resolved plugin directory
        path: PathBuf,
    },

    /// Plugin directory is not inside the reported git top-level directory
    #[error("Plugin directory {plugin_dir} is not inside git repository {root}")]
    OutsideRepository {
        /// Resolved plugin directory
        plugin_dir: PathBuf,
        /// Reported git top-level directory
        root: PathBuf,
    },

    /// Build directory name that leaves the plugin directory
    #[error("Build dir {name} must be a relative path inside the plugin directory")]
    InvalidBuildDir {
        /// Entry as given on the command line
        name: String,
    },

    /// Wiping the scratch directory would delete protected data
    #[error("Refusing to use {scratch} as scratch directory, it would delete {protected}")]
    UnsafeScratchRoot {
        /// Requested scratch directory
        scratch: PathBuf,
        /// Directory the wipe would reach
        protected: PathBuf,
    },

    /// Declared build directory is missing
    #[error("Build dir {path} does not exist.")]
    MissingBuildDir {
        /// Expected build directory location
        path: PathBuf,
    },
}

/// External command errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Required tool is not installed
    #[error("Required tool `{tool}` not found in PATH")]
    ToolNotFound {
        /// Program name
        tool: String,
    },

    /// The process could not be started
    #[error("Failed to execute `{command}`: {source}")]
    Spawn {
        /// Rendered command line
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully
    #[error("Command `{command}` failed. Exit Code: {code}")]
    Failed {
        /// Rendered command line
        command: String,
        /// Exit status of the process
        code: i32,
    },

    /// The process succeeded but printed nothing where output was required
    #[error("Command `{command}` produced no output")]
    EmptyOutput {
        /// Rendered command line
        command: String,
    },
}

impl CommandError {
    /// Exit status the deploy process should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::ToolNotFound { .. } => EXIT_TOOL_NOT_FOUND,
            CommandError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                EXIT_TOOL_NOT_FOUND
            }
            CommandError::Spawn { .. } | CommandError::EmptyOutput { .. } => EXIT_VALIDATION,
            CommandError::Failed { code, .. } => *code,
        }
    }
}

impl DeployError {
    /// Exit status the deploy process should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::Command(e) => e.exit_code(),
            DeployError::Cli(_)
            | DeployError::Readme(_)
            | DeployError::Workspace(_)
            | DeployError::Io(_) => EXIT_VALIDATION,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            DeployError::Cli(CliError::MissingArgument { argument }) if argument == "version" => {
                vec![
                    "Pass the git tag to release: --version=1.2.3".to_string(),
                    "Or update only readme and assets: --readme-and-assets-only".to_string(),
                ]
            }
            DeployError::Readme(ReadmeError::NoStableTag { .. }) => vec![
                "Add a 'Stable tag: x.y.z' line to the readme.txt header".to_string(),
            ],
            DeployError::Workspace(WorkspaceError::MissingBuildDir { .. }) => vec![
                "Build the plugin assets before deploying".to_string(),
                "Check the names passed to --build-dirs".to_string(),
            ],
            DeployError::Workspace(WorkspaceError::UnsafeScratchRoot { .. }) => vec![
                "Point --tmp-dir or WP_DEPLOY_TMP_DIR at a dedicated directory outside the repository"
                    .to_string(),
            ],
            DeployError::Command(CommandError::ToolNotFound { tool }) => {
                vec![format!("Install {tool} and make sure it is on PATH")]
            }
            _ => Vec::new(),
        }
    }
}
