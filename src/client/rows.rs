use alloy_primitives::utils::{ParseUnits, Unit};
use alloy_primitives::U256;

use crate::models::{Chain, Holding};

const NOT_AVAILABLE: &str = "N/A";

/// Scales an integer amount by `10^decimals`, exactly.
///
/// Always keeps one fractional digit and trims trailing zeros:
/// `("1500000", 6)` gives `"1.5"`, `("42", 0)` gives `"42.0"`.
/// Returns `None` when `raw` is not an integer that fits in 256 bits, or when
/// `decimals` is beyond what a U256 amount can carry.
pub fn format_units(raw: &str, decimals: u32) -> Option<String> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let unit = u8::try_from(decimals).ok().and_then(Unit::new)?;
    let amount = U256::from_str_radix(digits, 10).ok()?;
    let formatted = ParseUnits::U256(amount).format_units(unit);

    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    let sign = if negative && !amount.is_zero() { "-" } else { "" };
    Some(format!("{}{}.{}", sign, whole, fraction))
}

/// One display line of the holdings table
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingRow {
    pub kind: &'static str,
    pub name: String,
    pub symbol: String,
    /// Formatted balance for ERC-20, token id for NFTs
    pub amount: String,
    pub contract: String,
    pub explorer_link: String,
    pub image: Option<String>,
    /// Metadata summary for NFTs (name, description, traits)
    pub details: Vec<String>,
}

impl HoldingRow {
    pub fn from_holding(holding: &Holding, chain: Chain) -> Self {
        let (amount, image, details) = match holding {
            Holding::Erc20(token) => {
                let amount = if token.decimals == 0 || token.raw_balance.is_empty() {
                    None
                } else {
                    format_units(&token.raw_balance, token.decimals)
                };
                (amount, token.logo_url.clone(), Vec::new())
            }
            Holding::Nft(nft) => {
                let amount = Some(nft.token_id.clone()).filter(|id| !id.is_empty());
                let image = nft.metadata.as_ref().and_then(|m| m.image_url.clone());
                let details = match &nft.metadata {
                    Some(metadata) => {
                        let mut lines = vec![
                            metadata.name.clone().unwrap_or_else(|| "No name".to_string()),
                            metadata
                                .description
                                .clone()
                                .unwrap_or_else(|| "No description".to_string()),
                        ];
                        lines.extend(metadata.attributes.iter().map(|attr| {
                            format!(
                                "{}: {}",
                                attr.trait_type.as_deref().unwrap_or("Trait"),
                                attr.value
                            )
                        }));
                        lines
                    }
                    None => Vec::new(),
                };
                (amount, image, details)
            }
        };

        Self {
            kind: holding.kind(),
            name: or_placeholder(holding.name(), "Unknown"),
            symbol: or_placeholder(holding.symbol(), NOT_AVAILABLE),
            amount: amount.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            contract: holding.contract_address().to_string(),
            explorer_link: chain.token_url(holding.contract_address()),
            image,
            details,
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}
