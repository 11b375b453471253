use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use super::repo::GitHubRepo;
use super::types::Release;
use crate::error::{LaunchError, classify_request_error};

/// Deadline for the release metadata request.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetLatestRelease: Send + Sync {
    async fn get_latest_release(&self, repo: &GitHubRepo) -> Result<Release>;
}

pub struct GitHub {
    pub client: Client,
    pub api_url: String,
}

impl GitHub {
    #[tracing::instrument(skip(client, api_url))]
    pub fn new(client: Client, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| "https://api.github.com".to_string());
        Self { client, api_url }
    }
}

#[async_trait]
impl GetLatestRelease for GitHub {
    #[tracing::instrument(skip(self, repo))]
    async fn get_latest_release(&self, repo: &GitHubRepo) -> Result<Release> {
        GitHub::fetch_latest_release(repo, &self.client, &self.api_url).await
    }
}

impl GitHub {
    #[tracing::instrument(skip(client, api_url))]
    pub async fn fetch_latest_release(
        repo: &GitHubRepo,
        client: &Client,
        api_url: &str,
    ) -> Result<Release> {
        let url = format!("{}/repos/{}/{}/releases/latest", api_url, repo.owner, repo.repo);

        debug!("Fetching latest release from {}...", url);

        let response = client
            .get(&url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify_request_error(&e, "release metadata request"))?;

        let response = response.error_for_status().map_err(|e| {
            LaunchError::Network(format!("release metadata request to {}: {}", url, e))
        })?;

        let release = response.json::<Release>().await.map_err(|e| {
            LaunchError::Network(format!("parsing release metadata from {}: {}", url, e))
        })?;

        debug!(
            "Latest release is {} with {} asset(s)",
            release.tag_name,
            release.assets.len()
        );

        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> GitHubRepo {
        GitHubRepo {
            owner: "test-owner".to_string(),
            repo: "test-repo".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_latest_release() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/repos/test-owner/test-repo/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "tag_name": "v1.0.0",
                    "assets": [
                        {
                            "name": "tool-linux-amd64",
                            "browser_download_url": "https://example.com/tool-linux-amd64"
                        },
                        {
                            "name": "tool-darwin-amd64",
                            "browser_download_url": "https://example.com/tool-darwin-amd64"
                        }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = Client::new();
        let release = GitHub::fetch_latest_release(&test_repo(), &client, &url)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(release.tag_name, "v1.0.0");
        assert_eq!(release.assets.len(), 2);
        assert_eq!(release.assets[0].name, "tool-linux-amd64");
    }

    #[tokio::test]
    async fn test_get_latest_release_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/repos/test-owner/test-repo/releases/latest")
            .with_status(404)
            .create_async()
            .await;

        let client = Client::new();
        let err = GitHub::fetch_latest_release(&test_repo(), &client, &url)
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_get_latest_release_non_parseable_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/repos/test-owner/test-repo/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>rate limited</html>")
            .create_async()
            .await;

        let client = Client::new();
        let err = GitHub::fetch_latest_release(&test_repo(), &client, &url)
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_get_latest_release_unreachable_endpoint() {
        let client = Client::new();
        let err = GitHub::fetch_latest_release(&test_repo(), &client, "http://127.0.0.1:1")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_trait_impl_uses_configured_api_url() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/repos/test-owner/test-repo/releases/latest")
            .with_status(200)
            .with_body(r#"{"tag_name": "v2.0.0", "assets": []}"#)
            .create_async()
            .await;

        let github = GitHub::new(Client::new(), Some(url));
        let release = github.get_latest_release(&test_repo()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.tag_name, "v2.0.0");
    }

    #[test]
    fn test_default_api_url() {
        let github = GitHub::new(Client::new(), None);
        assert_eq!(github.api_url, "https://api.github.com");
    }
}
