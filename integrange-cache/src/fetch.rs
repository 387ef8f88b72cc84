use std::fs::read;

use anyhow::Result;
use log::debug;
use reqwest::blocking::Client;

///
/// Source of raw file bytes. Errors are returned to the caller as they are.
///
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches `http(s)://` URLs with a blocking reqwest client and reads
/// `file://` URLs from disk.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(read(path)?);
        }
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
