//! HTTP transport for Maven repositories: GET, HEAD probes and PUT uploads.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use kompo_util::errors::KompoError;

use crate::auth;
use crate::repository::MavenRepository;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a shared reqwest client for repository traffic.
pub fn build_client() -> miette::Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("kompo/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            KompoError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// Send a request with authentication, retrying server errors, timeouts
/// and connection failures.
///
/// Returns `Ok(None)` for 404. Any other non-success status is an error.
async fn send_with_retries<F>(
    repo: &MavenRepository,
    url: &str,
    build: F,
) -> miette::Result<Option<Response>>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY * attempt).await;
        }

        let req = auth::apply_auth(build(), repo);

        match req.send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    continue;
                }
                if !status.is_success() {
                    return Err(KompoError::Network {
                        message: format!("HTTP {status} from {url}"),
                    }
                    .into());
                }
                return Ok(Some(resp));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = format!("{e}");
                continue;
            }
            Err(e) => {
                return Err(KompoError::Network {
                    message: format!("Request to {url} failed: {e}"),
                }
                .into());
            }
        }
    }

    Err(KompoError::Network {
        message: format!("Failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    }
    .into())
}

/// Download raw bytes from a URL. `Ok(None)` means the repository does not
/// have the file.
pub async fn download_bytes(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
) -> miette::Result<Option<Vec<u8>>> {
    let Some(resp) = send_with_retries(repo, url, || client.get(url)).await? else {
        return Ok(None);
    };
    let bytes = resp.bytes().await.map_err(|e| KompoError::Network {
        message: format!("Failed to read response from {url}: {e}"),
    })?;
    Ok(Some(bytes.to_vec()))
}

/// Download a text file (metadata, checksum sidecar).
pub async fn download_text(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
) -> miette::Result<Option<String>> {
    match download_bytes(client, repo, url).await? {
        Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).to_string())),
        None => Ok(None),
    }
}

/// Check whether a file exists with a `HEAD` request.
pub async fn exists(client: &Client, repo: &MavenRepository, url: &str) -> miette::Result<bool> {
    let found = send_with_retries(repo, url, || client.head(url)).await?;
    tracing::debug!("HEAD {url}: {}", if found.is_some() { "found" } else { "missing" });
    Ok(found.is_some())
}

/// Upload a file with `PUT`.
pub async fn upload(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
    data: Vec<u8>,
) -> miette::Result<()> {
    let sent = send_with_retries(repo, url, || client.put(url).body(data.clone())).await?;
    if sent.is_none() {
        return Err(KompoError::Publish {
            message: format!("{} rejected upload to {url} (HTTP 404)", repo.name),
        }
        .into());
    }
    tracing::debug!("PUT {url}");
    Ok(())
}
