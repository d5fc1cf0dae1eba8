use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// ERC-20 balance held by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FungibleTokenEntry {
    #[serde(rename = "token_address")]
    pub contract_address: String,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "logo", default)]
    pub logo_url: Option<String>,
    pub decimals: u32,
    /// Integer amount in the token's smallest unit, kept as text to avoid precision loss
    #[serde(rename = "balance")]
    pub raw_balance: String,
}

/// NFT held by a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NonFungibleTokenEntry {
    #[serde(rename = "token_address")]
    pub contract_address: String,
    pub name: String,
    pub symbol: String,
    pub token_id: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Normalized holding returned by `/api/getTokens`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum Holding {
    #[serde(rename = "ERC-20")]
    Erc20(FungibleTokenEntry),
    #[serde(rename = "NFT")]
    Nft(NonFungibleTokenEntry),
}

impl Holding {
    pub fn kind(&self) -> &'static str {
        match self {
            Holding::Erc20(_) => "ERC-20",
            Holding::Nft(_) => "NFT",
        }
    }

    pub fn contract_address(&self) -> &str {
        match self {
            Holding::Erc20(token) => &token.contract_address,
            Holding::Nft(nft) => &nft.contract_address,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Holding::Erc20(token) => &token.name,
            Holding::Nft(nft) => &nft.name,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Holding::Erc20(token) => &token.symbol,
            Holding::Nft(nft) => &nft.symbol,
        }
    }
}

/// NFT display metadata (name, image, traits)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "image", alias = "image_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_type: Option<String>,
    #[schema(value_type = Object)]
    pub value: AttributeValue,
}

/// Trait value: either text or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Text(text) => f.write_str(text),
            AttributeValue::Number(number) => write!(f, "{}", number),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Booleans show up in the wild; they are kept as text
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => Ok(AttributeValue::Text(text)),
            serde_json::Value::Number(number) => Ok(AttributeValue::Number(number)),
            serde_json::Value::Bool(flag) => Ok(AttributeValue::Text(flag.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "unsupported attribute value: {}",
                other
            ))),
        }
    }
}

/// Keeps the attributes that parse. A null or non-array field gives no attributes.
fn lenient_attributes<'de, D>(deserializer: D) -> Result<Vec<Attribute>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Attribute>(item) {
            Ok(attribute) => Some(attribute),
            Err(e) => {
                log::debug!("Skipping NFT attribute: {}", e);
                None
            }
        })
        .collect())
}
