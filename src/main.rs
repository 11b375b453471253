use anyhow::{Context, Result};
use ghrun::config::{LauncherConfig, launcher_dir};
use ghrun::github::GitHubRepo;
use ghrun::launch;
use ghrun::runtime::RealRuntime;

/// The GitHub repository the tool binary is released from.
const TOOL_REPO: &str = "bytaesu/create-github-app";

/// Name of the tool binary, also used as the asset name prefix and the
/// User-Agent of release requests.
const TOOL_NAME: &str = "create-github-app";

/// The launcher defines no flags of its own: every argument, `--help`
/// included, belongs to the tool and is forwarded verbatim. The launcher's
/// exit code is the tool's exit code, or 1 on any internal failure.
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}: {:#}", TOOL_NAME, err);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let repo: GitHubRepo = TOOL_REPO.parse()?;

    let current_exe =
        std::env::current_exe().context("Failed to locate the launcher executable")?;
    let install_dir = launcher_dir(&current_exe)
        .context("Launcher executable has no parent directory")?;

    let config = LauncherConfig::new(repo, TOOL_NAME, install_dir);
    let runtime = RealRuntime;

    let binary = launch::ensure_installed(&runtime, &config).await?;
    launch::run_tool(&binary, std::env::args_os().skip(1))
}
