// src/fetch.rs

use anyhow::{Context, Result};
use reqwest::Client;
use url::Url;

/// Fetch one planning-application case page and return its HTML body.
///
/// A plain GET; failures surface per page so the caller can decide whether
/// one broken case should sink the batch.
pub async fn fetch_case_page(client: &Client, url: &Url) -> Result<String> {
    let html = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("requesting {}", url))?
        .error_for_status()
        .with_context(|| format!("bad status from {}", url))?
        .text()
        .await
        .with_context(|| format!("reading body of {}", url))?;
    Ok(html)
}
