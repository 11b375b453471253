//! The launcher: makes sure the tool binary is installed, then runs it with
//! the caller's arguments and stdio, relaying its exit code.

use anyhow::Result;
use log::{debug, info};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::github::GitHub;
use crate::http::HttpClient;
use crate::install::install_binary;
use crate::platform::PlatformKey;
use crate::runtime::Runtime;

/// Returns the path to the tool binary, fetching it from the latest release
/// first if it is not already installed. When the binary exists no network
/// client is even constructed.
#[tracing::instrument(skip(runtime, config))]
pub async fn ensure_installed<R: Runtime>(
    runtime: &R,
    config: &LauncherConfig,
) -> Result<PathBuf> {
    let binary_path = config.binary_path();

    if runtime.exists(&binary_path) {
        debug!("Found {} at {:?}", config.tool_name, binary_path);
        return Ok(binary_path);
    }

    info!("{} is not installed yet, fetching it...", config.tool_name);

    let platform = PlatformKey::detect()?;
    let client = config.http_client()?;
    let github = GitHub::new(client.clone(), config.api_url.clone());
    let http = HttpClient::new(client);

    install_binary(runtime, &github, &http, config, &platform).await
}

/// Spawns the tool binary with inherited stdio, forwarding `args` verbatim
/// and in order, and waits for it to finish. Returns the exit code the
/// launcher process should terminate with.
#[tracing::instrument(skip(args))]
pub fn run_tool<I, S>(binary: &Path, args: I) -> Result<i32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let status = Command::new(binary).args(args).status().map_err(|e| {
        LaunchError::Spawn(format!("could not spawn {}: {}", binary.display(), e))
    })?;

    Ok(exit_code(status))
}

/// Maps a child exit status to the launcher's own exit code.
///
/// A normal exit relays the child's code unchanged. On unix a
/// signal-terminated child maps to `128 + signal`, the shell convention.
/// Anything else (neither code nor signal) maps to 1.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
