use std::time::Duration;

use async_trait::async_trait;
use log::*;
use reqwest::{Client, Url};

use crate::error::ProviderError;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.fixer.io/latest";
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// A remote source of rate tables. Implementations hand back the response body untouched.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch(&self, base: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Fetches the latest rates from a fixer.io compatible endpoint, `GET <url>?base=<currency>`.
#[derive(Clone)]
pub struct FixerProvider {
    client: Client,
    url: Url,
}

impl FixerProvider {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    fn latest_url(&self, base: &str) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("base", base);
        url
    }
}

#[async_trait]
impl RateProvider for FixerProvider {
    async fn fetch(&self, base: &str) -> Result<Vec<u8>, ProviderError> {
        let url = self.latest_url(base);
        debug!("Requesting rates from {url}");
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status()));
        }
        let body = resp.bytes().await?;
        trace!("Provider returned {} bytes for {base}", body.len());
        Ok(body.to_vec())
    }
}
