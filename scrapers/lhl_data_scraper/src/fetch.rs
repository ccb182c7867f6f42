use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::config::HttpConfig;

pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("Failed to create HTTP client")
}

pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request failed: {}", url))?
        .error_for_status()
        .with_context(|| format!("Bad response status from {}", url))?;
    response
        .text()
        .await
        .with_context(|| format!("Failed to read body from {}", url))
}
