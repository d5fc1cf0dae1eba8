use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::AppConfig;
use crate::models::{Chain, Holding};
use crate::services::HoldingsService;
use crate::utils::AppError;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HoldingsQuery {
    /// Wallet address (0x-prefixed)
    pub address: Option<String>,
    /// Chain id such as `base`, `eth` or `0x2105`. Defaults to the server's DEFAULT_CHAIN.
    pub chain: Option<String>,
}

/// GET /api/getTokens?address=0x...&chain=base
/// ERC-20 balances followed by NFTs held by the address
#[utoipa::path(
    get,
    path = "/api/getTokens",
    tag = "Holdings",
    params(HoldingsQuery),
    responses(
        (status = 200, description = "ERC-20 entries followed by NFT entries", body = [Holding]),
        (status = 400, description = "Missing address or unsupported chain"),
        (status = 500, description = "API key missing or indexer failure"),
        (status = 429, description = "Indexer rate limit (upstream status forwarded)")
    )
)]
pub async fn get_tokens(
    query: web::Query<HoldingsQuery>,
    service: web::Data<HoldingsService>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let address = match query.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => address,
        _ => {
            log::warn!("⚠️  GET /api/getTokens without address");
            return AppError::Validation("Address is required".to_string()).error_response();
        }
    };

    let chain = match query.chain.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(raw) => match raw.parse::<Chain>() {
            Ok(chain) => chain,
            Err(e) => {
                log::warn!("⚠️  {}", e);
                return e.error_response();
            }
        },
        None => config.default_chain,
    };

    log::info!("📊 GET /api/getTokens?address={}&chain={}", address, chain);

    match service.fetch_holdings(address, chain).await {
        Ok(holdings) => {
            log::info!("✅ Returning {} holdings for {}", holdings.len(), address);
            HttpResponse::Ok().json(holdings)
        }
        Err(e) => {
            log::error!("❌ Failed to fetch holdings for {}: {}", address, e);
            e.error_response()
        }
    }
}
