use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::services::HoldingsService;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when no indexer key is configured
    pub status: String,
    pub service: String,
    pub version: String,
    pub indexer_configured: bool,
    pub default_chain: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up; `status` tells whether holdings can be served", body = HealthResponse)
    )
)]
pub async fn health_check(
    service: web::Data<HoldingsService>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let indexer_configured = service.is_configured();
    HttpResponse::Ok().json(HealthResponse {
        status: if indexer_configured { "healthy" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        indexer_configured,
        default_chain: config.default_chain.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
