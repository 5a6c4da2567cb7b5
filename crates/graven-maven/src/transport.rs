//! HTTP transport to Maven repositories: metadata fetches and uploads.

use std::time::Duration;

use graven_util::errors::GravenError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::repository::MavenRepository;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the shared client used for every repository request.
pub fn build_client() -> miette::Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("graven/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            GravenError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// Send a request, retrying on timeouts, connection failures and 5xx.
///
/// `request` is called once per attempt. Any other status is returned to the
/// caller as-is.
async fn send_with_retry(
    url: &str,
    request: impl Fn() -> RequestBuilder,
) -> miette::Result<Response> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY * attempt).await;
            tracing::debug!("Retrying {url} (attempt {})", attempt + 1);
        }

        match request().send().await {
            Ok(resp) if resp.status().is_server_error() => {
                last_err = format!("HTTP {}", resp.status());
            }
            Ok(resp) => return Ok(resp),
            Err(e) if e.is_timeout() || e.is_connect() => last_err = e.to_string(),
            Err(e) => {
                return Err(GravenError::Network {
                    message: format!("Request to {url} failed: {e}"),
                }
                .into());
            }
        }
    }

    Err(GravenError::Network {
        message: format!("Failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    }
    .into())
}

/// GET a text file. `Ok(None)` when the repository answers 404.
pub async fn fetch_text(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
) -> miette::Result<Option<String>> {
    let resp = send_with_retry(url, || repo.authorize(client.get(url))).await?;
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(GravenError::Network {
            message: format!("HTTP {status} fetching {url}"),
        }
        .into());
    }

    let text = resp.text().await.map_err(|e| GravenError::Network {
        message: format!("Failed to read response from {url}: {e}"),
    })?;
    Ok(Some(text))
}

/// PUT `data` at `url`.
pub async fn upload(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
    data: &[u8],
) -> miette::Result<()> {
    let resp = send_with_retry(url, || {
        repo.authorize(client.put(url)).body(data.to_vec())
    })
    .await?;

    let status = resp.status();
    if status.is_success() {
        tracing::debug!("Uploaded {url} ({} bytes)", data.len());
        return Ok(());
    }

    let hint = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if !repo.has_auth() => {
            " (no credentials configured)"
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => " (check credentials)",
        StatusCode::BAD_REQUEST if !url.contains("SNAPSHOT") => {
            " (release versions can usually not be redeployed)"
        }
        _ => "",
    };
    Err(GravenError::Publish {
        message: format!("HTTP {status} uploading to {url}{hint}"),
    }
    .into())
}
