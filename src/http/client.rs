use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Url, header::LOCATION};
use std::io::Write;
use std::time::Duration;

use crate::error::LaunchError;

/// Maximum number of redirect hops followed during a download. GitHub asset
/// downloads normally redirect once, to object storage; anything past this
/// bound is treated as a loop and fails closed.
pub const MAX_REDIRECTS: usize = 10;

/// Deadline for a single download request, body included.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP client for streaming release assets to disk.
///
/// The wrapped reqwest client is built with redirects disabled; this client
/// follows them itself so the hop count stays bounded.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Downloads a file from a URL, following up to [`MAX_REDIRECTS`] redirect
    /// responses, and streams the terminal response body into the writer
    /// produced by `create_writer`. Returns the number of bytes written.
    ///
    /// The writer is only created once a non-redirect response has arrived,
    /// so a failed redirect chain leaves no file behind.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        let response = self.get_following_redirects(url).await?;

        let mut response = response.error_for_status().map_err(|e| {
            LaunchError::Download(format!("request for {} was rejected: {}", url, e))
        })?;

        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) if e.is_timeout() => {
                    return Err(LaunchError::Timeout(format!("downloading {}: {}", url, e)).into());
                }
                Err(e) => {
                    return Err(
                        LaunchError::Download(format!("stream from {} failed: {}", url, e)).into(),
                    );
                }
            };

            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }

    /// Issues GET requests until a non-redirect response arrives, resolving
    /// each `Location` header against the current URL. Fails with
    /// [`LaunchError::RedirectLoop`] once the hop limit is exceeded.
    async fn get_following_redirects(&self, url: &str) -> Result<reqwest::Response> {
        let mut current = Url::parse(url).with_context(|| format!("Invalid download URL {}", url))?;

        for _hop in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(current.clone())
                .timeout(DOWNLOAD_TIMEOUT)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        LaunchError::Timeout(format!("downloading {}: {}", current, e))
                    } else {
                        LaunchError::Download(format!("request to {} failed: {}", current, e))
                    }
                })?;

            if !response.status().is_redirection() {
                return Ok(response);
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| {
                    LaunchError::Download(format!(
                        "redirect from {} carried no Location header",
                        current
                    ))
                })?;

            let next = current.join(location).map_err(|e| {
                LaunchError::Download(format!(
                    "redirect from {} to invalid location {}: {}",
                    current, location, e
                ))
            })?;

            debug!("Following redirect {} -> {}", current, next);
            current = next;
        }

        Err(LaunchError::RedirectLoop {
            url: url.to_string(),
            limit: MAX_REDIRECTS,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::redirect::Policy;
    use tempfile::tempdir;

    fn no_redirect_client() -> HttpClient {
        HttpClient::new(
            Client::builder()
                .redirect(Policy::none())
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_download_file_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/file.bin")
            .with_status(200)
            .with_body("test content")
            .create_async()
            .await;

        let client = no_redirect_client();
        let bytes = client
            .download_file(&format!("{}/file.bin", url), || Ok(std::io::sink()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 12);
    }

    #[tokio::test]
    async fn test_download_file_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/file.bin")
            .with_status(404)
            .create_async()
            .await;

        let client = no_redirect_client();
        let err = client
            .download_file(&format!("{}/file.bin", url), || Ok(std::io::sink()))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::Download(_))
        ));
    }

    #[tokio::test]
    async fn test_download_follows_redirect_chain() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        // Relative and absolute Location headers, terminating in a 200.
        let hop1 = server
            .mock("GET", "/step1")
            .with_status(302)
            .with_header("location", "/step2")
            .create_async()
            .await;
        let hop2 = server
            .mock("GET", "/step2")
            .with_status(301)
            .with_header("location", &format!("{}/final", url))
            .create_async()
            .await;
        let terminal = server
            .mock("GET", "/final")
            .with_status(200)
            .with_body("binary payload bytes")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let dest_for_writer = dest.clone();

        let client = no_redirect_client();
        let bytes = client
            .download_file(&format!("{}/step1", url), move || {
                Ok(std::fs::File::create(&dest_for_writer)?)
            })
            .await
            .unwrap();

        hop1.assert_async().await;
        hop2.assert_async().await;
        terminal.assert_async().await;
        assert_eq!(bytes, 20);
        assert_eq!(std::fs::read(&dest).unwrap(), b"binary payload bytes");
    }

    #[tokio::test]
    async fn test_download_fails_closed_on_redirect_loop() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        // Self-referential redirect. Initial request plus MAX_REDIRECTS hops.
        let mock = server
            .mock("GET", "/loop")
            .with_status(302)
            .with_header("location", "/loop")
            .expect(MAX_REDIRECTS + 1)
            .create_async()
            .await;

        let client = no_redirect_client();
        let err = client
            .download_file(&format!("{}/loop", url), || Ok(std::io::sink()))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::RedirectLoop { limit: MAX_REDIRECTS, .. })
        ));
    }

    #[tokio::test]
    async fn test_download_redirect_without_location_fails() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/broken")
            .with_status(302)
            .create_async()
            .await;

        let client = no_redirect_client();
        let err = client
            .download_file(&format!("{}/broken", url), || Ok(std::io::sink()))
            .await
            .unwrap_err();

        mock.assert_async().await;
        let launch_err = err.downcast_ref::<LaunchError>().unwrap();
        assert!(matches!(launch_err, LaunchError::Download(_)));
        assert!(launch_err.to_string().contains("Location"));
    }

    #[tokio::test]
    async fn test_download_unreachable_host() {
        let client = no_redirect_client();
        let err = client
            .download_file("http://127.0.0.1:1/file.bin", || Ok(std::io::sink()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::Download(_))
        ));
    }

    #[tokio::test]
    async fn test_download_invalid_url() {
        let client = no_redirect_client();
        let result = client
            .download_file("not a url", || Ok(std::io::sink()))
            .await;
        assert!(result.is_err());
    }
}
