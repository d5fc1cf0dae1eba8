use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::models::{Chain, Holding};

pub const FALLBACK_ERROR: &str = "Failed to fetch tokens";

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Input is not an EVM address; no request was sent
    InvalidAddress,
    /// The holdings endpoint answered with an error status
    Server(String),
    /// The request never produced a usable response
    Transport(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidAddress => f.write_str("Invalid address"),
            ClientError::Server(msg) | ClientError::Transport(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Transport used by the viewer to reach `/api/getTokens`
#[async_trait]
pub trait HoldingsApi: Send + Sync {
    async fn get_tokens(&self, address: &str) -> Result<Vec<Holding>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for a running holdings service
pub struct HttpHoldingsApi {
    http: reqwest::Client,
    base_url: String,
    chain: Option<Chain>,
}

impl HttpHoldingsApi {
    pub fn new(base_url: &str, chain: Option<Chain>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain,
        })
    }

    /// Holdings URL for `address`, with the chain when one is set
    pub fn tokens_url(&self, address: &str) -> String {
        let mut url = format!(
            "{}/api/getTokens?address={}",
            self.base_url,
            urlencoding::encode(address)
        );
        if let Some(chain) = self.chain {
            url.push_str("&chain=");
            url.push_str(chain.as_str());
        }
        url
    }
}

#[async_trait]
impl HoldingsApi for HttpHoldingsApi {
    async fn get_tokens(&self, address: &str) -> Result<Vec<Holding>, ClientError> {
        let url = self.tokens_url(address);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("⚠️  Holdings request failed with {}", status);
            return Err(ClientError::Server(server_error_message(&body)));
        }

        response
            .json::<Vec<Holding>>()
            .await
            .map_err(|e| ClientError::Transport(format!("Invalid response: {}", e)))
    }
}

/// Message from an error body (`{"error": "..."}`), or the generic fallback
pub fn server_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR.to_string())
}
