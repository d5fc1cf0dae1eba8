use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::models::{Chain, Metadata, MoralisErrorBody, MoralisNft, MoralisNftPage, MoralisToken};
use crate::utils::AppError;

/// Upstream token indexer used by the holdings gateway
#[async_trait]
pub trait IndexerApi: Send + Sync {
    /// ERC-20 balances of `address`
    async fn fetch_erc20(&self, address: &str, chain: Chain) -> Result<Vec<MoralisToken>, AppError>;

    /// NFTs owned by `address` (first page)
    async fn fetch_nfts(&self, address: &str, chain: Chain) -> Result<Vec<MoralisNft>, AppError>;

    /// Metadata document behind an NFT's token URI.
    /// Failures are reported as `AppError::MetadataFetch`.
    async fn fetch_metadata(&self, uri: &str) -> Result<Metadata, AppError>;
}

/// Moralis deep-index v2 client
pub struct MoralisClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MoralisClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn erc20_url(&self, address: &str, chain: Chain) -> String {
        format!(
            "{}/{}/erc20?chain={}",
            self.base_url,
            urlencoding::encode(address),
            chain.as_str()
        )
    }

    fn nft_url(&self, address: &str, chain: Chain) -> String {
        format!(
            "{}/{}/nft?chain={}&format=decimal&normalizeMetadata=true",
            self.base_url,
            urlencoding::encode(address),
            chain.as_str()
        )
    }

    async fn get_indexed<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .header("X-API-Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                AppError::upstream(
                    e.status().map(|s| s.as_u16()),
                    format!("Failed to reach indexer: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                Some(status.as_u16()),
                upstream_error_message(status.as_u16(), status.canonical_reason(), &body),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::upstream(None, format!("Failed to parse indexer response: {}", e)))
    }
}

#[async_trait]
impl IndexerApi for MoralisClient {
    async fn fetch_erc20(&self, address: &str, chain: Chain) -> Result<Vec<MoralisToken>, AppError> {
        log::info!("🪙 Fetching ERC-20 balances for {} on {}", address, chain);
        let tokens: Vec<MoralisToken> = self.get_indexed(&self.erc20_url(address, chain)).await?;
        log::debug!("Indexer returned {} ERC-20 balances", tokens.len());
        Ok(tokens)
    }

    async fn fetch_nfts(&self, address: &str, chain: Chain) -> Result<Vec<MoralisNft>, AppError> {
        log::info!("🖼️  Fetching NFTs for {} on {}", address, chain);
        let page: MoralisNftPage = self.get_indexed(&self.nft_url(address, chain)).await?;
        if page.cursor.is_some() {
            log::debug!("More NFTs available for {}; only the first page is used", address);
        }
        log::debug!("Indexer returned {} NFTs", page.result.len());
        Ok(page.result)
    }

    async fn fetch_metadata(&self, uri: &str) -> Result<Metadata, AppError> {
        // Token URIs are arbitrary third-party hosts: no API key
        let response = self
            .http
            .get(uri)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::MetadataFetch(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::MetadataFetch(format!("HTTP {}", status)));
        }

        response
            .json::<Metadata>()
            .await
            .map_err(|e| AppError::MetadataFetch(format!("invalid metadata document: {}", e)))
    }
}

/// Picks the most useful message out of a failed indexer response
pub fn upstream_error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<MoralisErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    match reason {
        Some(reason) => format!("Indexer request failed with status {} ({})", status, reason),
        None => format!("Indexer request failed with status {}", status),
    }
}
