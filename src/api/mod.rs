use actix_web::web;

use crate::utils::AppError;

pub mod health;
pub mod holdings;
pub mod metrics;
pub mod swagger;

/// Registers every HTTP route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Malformed query strings answer with the same `{error}` body as other 400s
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            log::warn!("⚠️  Rejected query string: {}", err);
            AppError::Validation(format!("Invalid query string: {}", err)).into()
        }))
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Holdings: ERC-20 + NFTs via the indexer
        .route("/api/getTokens", web::get().to(holdings::get_tokens));
}
