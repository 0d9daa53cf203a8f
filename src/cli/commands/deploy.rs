//! The deploy command.

use crate::cli::{Args, RuntimeConfig};
use crate::deploy::{DeployContext, Deployer, normalize_environment};
use crate::error::Result;
use crate::git;
use crate::process::{SystemRunner, ensure_tools};

/// Resolve arguments, discover the repository and run the deploy
pub(super) async fn execute_deploy(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let options = args.deploy_options()?;
    if args.has_partial_credentials() {
        config.warning_println(
            "Both --svn-user and --svn-pass are needed to commit non-interactively; ignoring the one given",
        );
    }

    ensure_tools(options.mode.required_tools())?;

    let output = config.output();
    let runner = SystemRunner::new(output.clone());
    normalize_environment(&runner, &options.plugin_dir, git::running_in_ci()).await?;

    let ctx = DeployContext::discover(options, &runner).await?;
    let _ = output.verbose(&format!("{ctx:#?}"));

    let outcome = Deployer::new(&ctx, &runner, output).run().await?;
    log::info!("deploy of {} finished: {outcome:?}", ctx.slug);
    Ok(())
}
