use anyhow::Result;
use reqwest::{Client, redirect::Policy};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::github::GitHubRepo;
use crate::platform::{Os, PlatformKey};

/// Connect timeout applied to every request the launcher makes.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for one launcher invocation.
///
/// The binary entry point builds this from compiled-in constants and the
/// launcher's own location; tests build it against a mockito server and a
/// temporary directory.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub repo: GitHubRepo,
    pub tool_name: String,
    pub install_dir: PathBuf,
    pub api_url: Option<String>,
}

impl LauncherConfig {
    pub fn new(repo: GitHubRepo, tool_name: impl Into<String>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            tool_name: tool_name.into(),
            install_dir: install_dir.into(),
            api_url: None,
        }
    }

    /// Overrides the GitHub API URL (used by tests to point at a mock server).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// The fixed local path the tool binary is installed to, colocated with
    /// the launcher. Carries the host's executable suffix (".exe" on Windows).
    pub fn binary_path(&self) -> PathBuf {
        self.install_dir.join(format!(
            "{}{}",
            self.tool_name,
            std::env::consts::EXE_SUFFIX
        ))
    }

    /// The release asset name expected for `platform`, following the
    /// `<tool>-<os>-<arch>[.exe]` convention.
    pub fn asset_name(&self, platform: &PlatformKey) -> String {
        let suffix = if platform.os == Os::Windows { ".exe" } else { "" };
        format!("{}-{}{}", self.tool_name, platform, suffix)
    }

    /// Builds the HTTP client used for both the metadata fetch and the asset
    /// download. Redirects are disabled here; the download path follows them
    /// itself with a bounded hop count.
    pub fn http_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(self.tool_name.clone())
            .redirect(Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(client)
    }
}

/// Returns the directory the launcher executable lives in, which doubles as
/// the install directory for the tool binary.
pub fn launcher_dir(current_exe: &Path) -> Option<PathBuf> {
    current_exe.parent().map(Path::to_path_buf)
}
