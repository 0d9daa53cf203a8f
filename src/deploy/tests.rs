use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::*;
use crate::error::{CommandError, DeployError, WorkspaceError};
use crate::process::CommandLine;
use crate::svn::Credentials;

/// Records every command and fakes the on-disk effects the pipeline relies on
#[derive(Default)]
struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    status: String,
    fail: Option<(&'static str, i32)>,
    checkout_assets: Vec<&'static str>,
}

impl RecordingRunner {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn position(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .position(|c| c.starts_with(prefix))
            .unwrap_or_else(|| panic!("no call starting with {prefix:?} in {:#?}", self.calls()))
    }

    fn simulate(&self, cmd: &CommandLine) {
        let argv = cmd.argv_lossy();
        match (cmd.program(), argv.first().map(String::as_str)) {
            ("svn", Some("checkout")) => {
                let wc = PathBuf::from(argv.last().unwrap());
                for dir in ["trunk", "assets", "tags"] {
                    std::fs::create_dir_all(wc.join(dir)).unwrap();
                }
                for asset in &self.checkout_assets {
                    std::fs::write(wc.join("assets").join(asset), b"img").unwrap();
                }
            }
            ("svn", Some("update")) if argv[2] == "immediates" => {
                std::fs::create_dir_all(&argv[3]).unwrap();
            }
            _ => {}
        }
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, cmd: &CommandLine) -> std::result::Result<String, CommandError> {
        let line = format!("{} {}", cmd.program(), cmd.argv_lossy().join(" "));
        self.calls.borrow_mut().push(line.clone());

        if let Some((prefix, code)) = self.fail
            && line.starts_with(prefix)
        {
            return Err(CommandError::Failed {
                command: cmd.to_string(),
                code,
            });
        }

        self.simulate(cmd);
        if line == "svn status" {
            return Ok(self.status.clone());
        }
        Ok(String::new())
    }

    async fn pipe(
        &self,
        producer: &CommandLine,
        consumer: &CommandLine,
    ) -> std::result::Result<(), CommandError> {
        self.calls.borrow_mut().push(format!(
            "{} {} | {} {}",
            producer.program(),
            producer.argv_lossy().join(" "),
            consumer.program(),
            consumer.argv_lossy().join(" ")
        ));
        Ok(())
    }
}

struct Fixture {
    _plugin_root: TempDir,
    _scratch: TempDir,
    plugin_dir: PathBuf,
    scratch_root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let plugin_root = tempfile::tempdir().unwrap();
        let plugin_dir = plugin_root.path().join("plugins").join("my-plugin");
        std::fs::create_dir_all(plugin_dir.join(ASSETS_SOURCE_DIR)).unwrap();
        std::fs::write(
            plugin_dir.join("readme.txt"),
            "=== My Plugin ===\nStable tag: 2.1.0\n\nA plugin.\n",
        )
        .unwrap();

        let scratch = tempfile::tempdir().unwrap();
        let scratch_root = scratch.path().join("wp-deploy");
        Self {
            _plugin_root: plugin_root,
            _scratch: scratch,
            plugin_dir,
            scratch_root,
        }
    }

    fn context(&self, mode: DeployMode) -> DeployContext {
        let options = DeployOptions {
            plugin_dir: self.plugin_dir.clone(),
            mode,
            build_dirs: Vec::new(),
            credentials: None,
            dry_run: false,
            scratch_root: self.scratch_root.clone(),
        };
        let root = self.plugin_dir.parent().unwrap().parent().unwrap().to_path_buf();
        DeployContext::new(options, root, "plugins/my-plugin".to_string()).unwrap()
    }
}

fn release(version: &str) -> DeployMode {
    DeployMode::FullRelease {
        version: version.to_string(),
    }
}

fn quiet() -> OutputManager {
    OutputManager::new(false, true)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[tokio::test]
async fn full_release_dry_run_stages_everything_but_never_commits() {
    let fx = Fixture::new();
    let mut ctx = fx.context(release("1.0.0"));
    ctx.dry_run = true;
    let runner = RecordingRunner {
        status: "?       trunk/new.php\n!       trunk/removed.php\n".to_string(),
        ..Default::default()
    };

    let outcome = Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();
    assert_eq!(outcome, DeployOutcome::DryRun);

    let svn_dir = display(&ctx.svn_dir);
    let export_dir = display(&ctx.export_dir);
    let root = display(&ctx.vcs_root_dir);
    let expected = vec![
        format!(
            "svn checkout --depth immediates https://plugins.svn.wordpress.org/my-plugin/ {svn_dir}"
        ),
        "svn update --set-depth infinity assets".to_string(),
        "svn update --set-depth infinity trunk".to_string(),
        format!(
            "git --git-dir={root}/.git archive 1.0.0:plugins/my-plugin | tar x --directory={export_dir}"
        ),
        format!("rsync -rc {export_dir}/ {svn_dir}/trunk --delete --delete-excluded"),
        format!(
            "rsync -rc {}/.wordpress-org/ {svn_dir}/assets --delete",
            display(&fx.plugin_dir)
        ),
        "svn add . --force --quiet".to_string(),
        "svn status".to_string(),
        "svn rm trunk/removed.php@ --quiet".to_string(),
        "svn cp trunk tags/1.0.0".to_string(),
        "svn status".to_string(),
    ];
    assert_eq!(runner.calls(), expected);
    assert!(ctx.export_dir.is_dir());
}

#[tokio::test]
async fn full_release_commits_with_credentials() {
    let fx = Fixture::new();
    let mut ctx = fx.context(release("1.0.0"));
    ctx.credentials = Credentials::from_parts(Some("deployer".into()), Some("pw".into()));
    let runner = RecordingRunner::default();

    let outcome = Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();
    assert_eq!(outcome, DeployOutcome::Committed);

    let calls = runner.calls();
    assert_eq!(
        calls.last().unwrap(),
        "svn commit -m Update plugin to version 1.0.0 with NextgenThemes WordPress Plugin Deploy \
         --no-auth-cache --non-interactive --username deployer --password pw"
    );
    // tag copy and trunk update go out in the same commit
    assert!(runner.position("svn cp trunk tags/1.0.0") < runner.position("svn commit"));
}

#[tokio::test]
async fn commit_without_credentials_stays_interactive() {
    let fx = Fixture::new();
    let ctx = fx.context(release("3.0"));
    let runner = RecordingRunner::default();

    Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();
    assert_eq!(
        runner.calls().last().unwrap(),
        "svn commit -m Update plugin to version 3.0 with NextgenThemes WordPress Plugin Deploy"
    );
}

#[tokio::test]
async fn build_dirs_are_mirrored_in_order_after_snapshot() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.plugin_dir.join("build")).unwrap();
    std::fs::create_dir_all(fx.plugin_dir.join("vendor")).unwrap();
    let mut ctx = fx.context(release("1.0.0"));
    ctx.build_dirs = vec!["vendor".to_string(), "build".to_string()];
    ctx.dry_run = true;
    let runner = RecordingRunner::default();

    Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();

    let plugin = display(&fx.plugin_dir);
    let trunk = format!("{}/trunk/", display(&ctx.svn_dir));
    let vendor = runner.position(&format!("rsync -rc {plugin}/vendor {trunk} --delete"));
    let build = runner.position(&format!("rsync -rc {plugin}/build {trunk} --delete"));
    let snapshot = runner.position(&format!("rsync -rc {}/", display(&ctx.export_dir)));
    assert!(snapshot < vendor && vendor < build);
}

#[tokio::test]
async fn missing_build_dir_aborts_before_mirroring_it() {
    let fx = Fixture::new();
    let mut ctx = fx.context(release("1.0.0"));
    ctx.build_dirs = vec!["dist".to_string()];
    let runner = RecordingRunner::default();

    let err = Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap_err();
    let expected_path = fx.plugin_dir.join("dist");
    assert!(matches!(
        &err,
        DeployError::Workspace(WorkspaceError::MissingBuildDir { path }) if *path == expected_path
    ));
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains(&display(&expected_path)));

    let calls = runner.calls();
    assert!(!calls.iter().any(|c| c.contains("/dist")));
    assert!(!calls.iter().any(|c| c.starts_with("svn commit")));
}

#[tokio::test]
async fn readme_only_copies_readme_into_trunk_and_stable_tag() {
    let fx = Fixture::new();
    let ctx = fx.context(DeployMode::ReadmeOnly);
    let runner = RecordingRunner::default();

    let outcome = Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();
    assert_eq!(outcome, DeployOutcome::Committed);

    let tag_dir = ctx.svn_dir.join("tags").join("2.1.0");
    runner.position(&format!(
        "svn update --set-depth immediates {}",
        display(&tag_dir)
    ));
    let readme = std::fs::read(fx.plugin_dir.join("readme.txt")).unwrap();
    assert_eq!(std::fs::read(tag_dir.join("readme.txt")).unwrap(), readme);
    assert_eq!(
        std::fs::read(ctx.svn_dir.join("trunk").join("readme.txt")).unwrap(),
        readme
    );

    let calls = runner.calls();
    assert!(!calls.iter().any(|c| c.starts_with("git ")));
    assert!(!calls.iter().any(|c| c.starts_with("svn cp")));
    assert_eq!(
        calls.last().unwrap(),
        "svn commit -m Update readme and assets with NextgenThemes WordPress Plugin Deploy"
    );
}

#[tokio::test]
async fn readme_only_without_stable_tag_fails() {
    let fx = Fixture::new();
    std::fs::write(fx.plugin_dir.join("readme.txt"), "=== My Plugin ===\n").unwrap();
    let ctx = fx.context(DeployMode::ReadmeOnly);
    let runner = RecordingRunner::default();

    let err = Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap_err();
    assert_eq!(err.to_string(), format!(
        "No stable tag found in readme {}",
        display(&fx.plugin_dir.join("readme.txt"))
    ));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn asset_mime_types_are_set_per_extension() {
    let fx = Fixture::new();
    let mut ctx = fx.context(release("1.0.0"));
    ctx.dry_run = true;
    let runner = RecordingRunner {
        checkout_assets: vec!["banner-772x250.png", "icon-128x128.png", "icon.svg"],
        ..Default::default()
    };

    Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();

    let propsets: Vec<_> = runner
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("svn propset"))
        .collect();
    assert_eq!(
        propsets,
        vec![
            "svn propset svn:mime-type image/png assets/banner-772x250.png assets/icon-128x128.png",
            "svn propset svn:mime-type image/svg+xml assets/icon.svg",
        ]
    );
    assert!(runner.position("svn propset") > runner.position("svn cp"));
}

#[tokio::test]
async fn failing_command_stops_the_run_with_its_exit_code() {
    let fx = Fixture::new();
    let ctx = fx.context(release("1.0.0"));
    let runner = RecordingRunner {
        fail: Some(("svn update --set-depth infinity trunk", 5)),
        ..Default::default()
    };

    let err = Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap_err();
    assert_eq!(err.exit_code(), 5);
    assert_eq!(
        runner.calls().last().unwrap(),
        "svn update --set-depth infinity trunk"
    );
}

#[tokio::test]
async fn previous_scratch_workspace_is_wiped() {
    let fx = Fixture::new();
    let ctx = fx.context(release("1.0.0"));
    let stale = ctx.svn_dir.join("trunk").join("stale.php");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, "<?php").unwrap();
    let runner = RecordingRunner::default();

    Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();
    assert!(!stale.exists());
    assert!(ctx.scratch_dir.is_dir());
}

#[tokio::test]
async fn configured_scratch_root_keeps_unrelated_content() {
    let fx = Fixture::new();
    let ctx = fx.context(release("1.0.0"));
    let unrelated = ctx.scratch_dir.join("notes.txt");
    std::fs::create_dir_all(&ctx.export_dir).unwrap();
    std::fs::write(ctx.export_dir.join("old.php"), "<?php").unwrap();
    std::fs::write(&unrelated, "keep me").unwrap();
    let runner = RecordingRunner::default();

    Deployer::new(&ctx, &runner, &quiet()).run().await.unwrap();
    assert_eq!(std::fs::read_to_string(&unrelated).unwrap(), "keep me");
    assert!(!ctx.export_dir.join("old.php").exists());
}
