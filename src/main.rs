use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use holdings_service::api;
use holdings_service::config::AppConfig;
use holdings_service::middleware;
use holdings_service::services::{HoldingsService, IndexerApi, MoralisClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();

    log::info!("🚀 Starting Holdings Service...");
    log::info!("🔗 Indexer: {}", config.moralis_api_base);
    log::info!("⛓️  Default chain: {}", config.default_chain);

    // The server still starts without a key; requests then fail with a configuration error
    let indexer: Option<Arc<dyn IndexerApi>> = match config.moralis_api_key.as_deref() {
        Some(api_key) => {
            let client: Arc<dyn IndexerApi> = Arc::new(
                MoralisClient::new(&config.moralis_api_base, api_key, config.upstream_timeout)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
            );
            log::info!("✅ Indexer client ready");
            Some(client)
        }
        None => {
            log::warn!("⚠️  MORALIS_API_KEY is not set; /api/getTokens will answer 500");
            None
        }
    };

    let service_data = web::Data::new(HoldingsService::new(indexer, config.metadata_timeout));
    let config_data = web::Data::new(config.clone());

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", config.host, config.port);

    let allowed_origins = config.cors_allowed_origins.clone();

    // Start HTTP server
    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::HeaderName::from_static(
                    middleware::request_tracking::REQUEST_ID_HEADER,
                ),
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(service_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(middleware::RequestTracking)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
