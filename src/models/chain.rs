use std::fmt;
use std::str::FromStr;

use crate::utils::AppError;

/// EVM chains supported by the indexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chain {
    Eth,
    #[default]
    Base,
    Polygon,
    Bsc,
    Arbitrum,
    Optimism,
    Avalanche,
}

impl Chain {
    pub const ALL: [Chain; 7] = [
        Chain::Eth,
        Chain::Base,
        Chain::Polygon,
        Chain::Bsc,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Avalanche,
    ];

    /// Identifier used in the indexer's `chain` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Eth => "eth",
            Chain::Base => "base",
            Chain::Polygon => "polygon",
            Chain::Bsc => "bsc",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Avalanche => "avalanche",
        }
    }

    pub fn hex_id(&self) -> &'static str {
        match self {
            Chain::Eth => "0x1",
            Chain::Base => "0x2105",
            Chain::Polygon => "0x89",
            Chain::Bsc => "0x38",
            Chain::Arbitrum => "0xa4b1",
            Chain::Optimism => "0xa",
            Chain::Avalanche => "0xa86a",
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            Chain::Eth => "https://etherscan.io",
            Chain::Base => "https://basescan.org",
            Chain::Polygon => "https://polygonscan.com",
            Chain::Bsc => "https://bscscan.com",
            Chain::Arbitrum => "https://arbiscan.io",
            Chain::Optimism => "https://optimistic.etherscan.io",
            Chain::Avalanche => "https://snowtrace.io",
        }
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url(), address)
    }

    pub fn token_url(&self, contract: &str) -> String {
        format!("{}/token/{}", self.explorer_url(), contract)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let alias = match normalized.as_str() {
            "ethereum" | "mainnet" => Some(Chain::Eth),
            "matic" => Some(Chain::Polygon),
            "avax" => Some(Chain::Avalanche),
            _ => None,
        };

        alias
            .or_else(|| {
                Chain::ALL
                    .into_iter()
                    .find(|chain| chain.as_str() == normalized || chain.hex_id() == normalized)
            })
            .ok_or_else(|| AppError::Validation(format!("Unsupported chain: {}", s.trim())))
    }
}
