//! # wp-plugin-deploy
//!
//! Deploys a WordPress plugin kept in git to its WordPress.org SVN repository.
//!
//! A full release exports the tagged tree into `trunk`, layers optional build
//! directories on top, mirrors `.wordpress-org/` into `assets` and copies
//! `trunk` to `tags/<version>` in the same commit. The readme-only mode just
//! refreshes `readme.txt` and the assets.
//!
//! ## Usage
//!
//! ```bash
//! wp-plugin-deploy --version=1.2.3 --svn-user=me --svn-pass=secret
//! wp-plugin-deploy --version=1.2.3 --build-dirs=build,vendor --dry-run
//! wp-plugin-deploy --readme-and-assets-only
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod deploy;
pub mod error;
pub mod git;
pub mod process;
pub mod readme;
pub mod svn;
pub mod sync;

pub use cli::Args;
pub use deploy::{DeployContext, DeployMode, DeployOptions, DeployOutcome, Deployer};
pub use error::{CliError, DeployError, Result};
pub use process::{CommandLine, CommandRunner, SystemRunner};
