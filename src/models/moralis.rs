use serde::{Deserialize, Serialize};

/// Item of `GET /{address}/erc20`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoralisToken {
    pub token_address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    /// Usually a string ("18"), sometimes a number
    #[serde(default)]
    pub decimals: Option<serde_json::Value>,
    #[serde(default)]
    pub balance: Option<String>,
}

/// Page returned by `GET /{address}/nft`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoralisNftPage {
    #[serde(default)]
    pub result: Vec<MoralisNft>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoralisNft {
    pub token_address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    pub token_id: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Raw metadata document serialized as a JSON string
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub normalized_metadata: Option<serde_json::Value>,
}

/// Error payload of the indexer (`{"message": "..."}`)
#[derive(Debug, Deserialize)]
pub struct MoralisErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
