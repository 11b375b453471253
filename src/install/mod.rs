//! The fetcher: resolves the expected asset for a platform, downloads it next
//! to the launcher and marks it executable.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::github::{GetLatestRelease, Release, ReleaseAsset};
use crate::http::HttpClient;
use crate::platform::PlatformKey;
use crate::runtime::Runtime;

/// Downloads the tool binary for `platform` from the latest release and
/// installs it at the configured binary path with owner-executable
/// permission. Returns the installed path.
///
/// A failed download removes the partially written file on a best-effort
/// basis; a leftover partial is never reported as success.
#[tracing::instrument(skip(runtime, github, http, config))]
pub async fn install_binary<R: Runtime, G: GetLatestRelease>(
    runtime: &R,
    github: &G,
    http: &HttpClient,
    config: &LauncherConfig,
    platform: &PlatformKey,
) -> Result<PathBuf> {
    let asset_name = config.asset_name(platform);

    let release = github.get_latest_release(&config.repo).await?;
    let asset = select_asset(&release, &asset_name)?;

    info!("Downloading {} ({})...", asset.name, release.tag_name);

    runtime
        .create_dir_all(&config.install_dir)
        .with_context(|| format!("Failed to create install directory {:?}", config.install_dir))?;

    let binary_path = config.binary_path();
    let download = http
        .download_file(&asset.browser_download_url, || {
            runtime
                .create_file(&binary_path)
                .with_context(|| format!("Failed to create file at {:?}", binary_path))
        })
        .await;

    if let Err(err) = download {
        if let Err(remove_err) = runtime.remove_file(&binary_path) {
            debug!("Could not remove partial download: {}", remove_err);
        }
        return Err(err);
    }

    runtime.set_executable(&binary_path).map_err(|e| {
        LaunchError::Permission(format!(
            "could not mark {} as executable: {}",
            binary_path.display(),
            e
        ))
    })?;

    info!("Done.");
    Ok(binary_path)
}

/// Picks the asset whose name matches `wanted` exactly. Prefix or substring
/// matches do not count; release pages routinely carry checksums and sibling
/// platforms that share most of the name.
fn select_asset<'a>(release: &'a Release, wanted: &str) -> Result<&'a ReleaseAsset, LaunchError> {
    release
        .assets
        .iter()
        .find(|asset| asset.name == wanted)
        .ok_or_else(|| LaunchError::AssetNotFound {
            wanted: wanted.to_string(),
            available: release.assets.iter().map(|a| a.name.clone()).collect(),
        })
}
