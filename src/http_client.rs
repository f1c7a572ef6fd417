use std::fs;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let resp = http_client()?
        .get(url)
        .send()
        .with_context(|| format!("request {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status} for {url}"));
    }
    let bytes = resp
        .bytes()
        .with_context(|| format!("read body of {url}"))?;
    Ok(bytes.to_vec())
}

/// Reads an artifact from an http(s) URL or the local filesystem. No retries.
pub fn read_location(location: &str) -> Result<Vec<u8>> {
    if is_remote(location) {
        return fetch_bytes(location);
    }
    fs::read(location).with_context(|| format!("read {location}"))
}
