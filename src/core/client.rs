/// HTTP client for a remote pulse-dash server
///
/// Lets the dashboard watch another host: metrics come from `GET /metrics`
/// and container actions go to `POST /container/action`.

use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::core::docker::ContainerAction;
use crate::core::telemetry::SystemMetrics;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
}

#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch_metrics(&self) -> Result<SystemMetrics, ClientError> {
        let response = self.client.get(self.endpoint("/metrics")).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn container_action(
        &self,
        action: ContainerAction,
        container_id: &str,
    ) -> Result<(), ClientError> {
        debug!("Remote container {}: {} via {}", action, container_id, self.base_url);
        let payload = json!({
            "container_id": container_id,
            "action": action.as_str(),
        });

        let response = self
            .client
            .post(self.endpoint("/container/action"))
            .json(&payload)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.client.get(self.endpoint("/health")).send().await?;
        Ok(response.status().is_success())
    }
}

/// Trim trailing slashes and require an http(s) scheme
fn normalize_base_url(url: &str) -> Result<String, ClientError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::InvalidUrl(url.to_string()));
    }
    Ok(trimmed.to_string())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status,
        message: error_message(&body),
    })
}

/// Pull `error` out of a `{"error": ...}` body, else return the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = RemoteClient::new("http://nuc.local:8080/").unwrap();
        assert_eq!(client.base_url(), "http://nuc.local:8080");
        assert_eq!(client.endpoint("/metrics"), "http://nuc.local:8080/metrics");
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        assert!(matches!(
            RemoteClient::new("nuc.local:8080"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error":"invalid action"}"#), "invalid action");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
