use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Holdings Service API",
        version = "1.0.0",
        description = "Wallet holdings lookup. \n\n**Features:**\n- ERC-20 balances and NFTs for an EVM address\n- NFT metadata resolved from token URIs when the indexer has none\n- Health monitoring and metrics"
    ),
    paths(
        // Holdings
        crate::api::holdings::get_tokens,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            // Holdings
            crate::models::Holding,
            crate::models::FungibleTokenEntry,
            crate::models::NonFungibleTokenEntry,
            crate::models::Metadata,
            crate::models::Attribute,

            // Health & Metrics
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Holdings", description = "Tokens and NFTs held by a wallet address, fetched from the blockchain indexer."),
        (name = "Health", description = "Health check and system metrics endpoints for monitoring service status."),
    )
)]
pub struct ApiDoc;
