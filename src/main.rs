//! wp-plugin-deploy: release a WordPress plugin from git to WordPress.org SVN.

use std::process;

use wp_plugin_deploy::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    process::exit(cli::run().await);
}
