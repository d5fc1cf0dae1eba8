use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::api::metrics;
use crate::models::{
    Chain, FungibleTokenEntry, Holding, Metadata, MoralisNft, MoralisToken, NonFungibleTokenEntry,
};
use crate::services::IndexerApi;
use crate::utils::AppError;

pub const UNKNOWN_NFT_NAME: &str = "Unknown NFT";
pub const UNKNOWN_NFT_SYMBOL: &str = "N/A";

/// Largest decimals value a U256 amount can be scaled by
pub const MAX_DECIMALS: u32 = 77;

/// Gateway between the HTTP API and the token indexer.
///
/// Fetches ERC-20 balances and NFTs concurrently, normalizes both into [`Holding`]s
/// and resolves missing NFT metadata from token URIs. A failed metadata lookup only
/// blanks that NFT's metadata; indexer failures abort the whole request.
pub struct HoldingsService {
    indexer: Option<Arc<dyn IndexerApi>>,
    metadata_timeout: Duration,
}

impl HoldingsService {
    /// `indexer` is `None` when no API credential is configured
    pub fn new(indexer: Option<Arc<dyn IndexerApi>>, metadata_timeout: Duration) -> Self {
        Self {
            indexer,
            metadata_timeout,
        }
    }

    /// Whether an indexer credential was configured at startup
    pub fn is_configured(&self) -> bool {
        self.indexer.is_some()
    }

    /// ERC-20 entries followed by NFT entries, each in indexer order
    pub async fn fetch_holdings(&self, address: &str, chain: Chain) -> Result<Vec<Holding>, AppError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::Validation("Address is required".to_string()));
        }

        let indexer = self.indexer.as_ref().ok_or_else(|| {
            log::error!("❌ MORALIS_API_KEY is not defined");
            AppError::Configuration("Server configuration error: API key missing".to_string())
        })?;

        log::info!("🔍 Fetching holdings for {} on {}", address, chain);

        let (tokens, nfts) = futures::try_join!(
            indexer.fetch_erc20(address, chain),
            indexer.fetch_nfts(address, chain)
        )?;

        let mut holdings: Vec<Holding> = tokens
            .into_iter()
            .map(|token| Holding::Erc20(normalize_token(token)))
            .collect();
        let fungible_count = holdings.len();

        let nft_entries = join_all(
            nfts.into_iter()
                .map(|nft| self.normalize_nft(indexer.as_ref(), nft)),
        )
        .await;
        holdings.extend(nft_entries.into_iter().map(Holding::Nft));

        log::info!(
            "✅ {} holdings for {} ({} ERC-20, {} NFT)",
            holdings.len(),
            address,
            fungible_count,
            holdings.len() - fungible_count
        );

        Ok(holdings)
    }

    async fn normalize_nft(&self, indexer: &dyn IndexerApi, nft: MoralisNft) -> NonFungibleTokenEntry {
        let metadata = match inline_metadata(&nft) {
            Some(metadata) => Some(metadata),
            None => match nft.token_uri.as_deref().filter(|uri| !uri.trim().is_empty()) {
                Some(uri) => self.fetch_metadata_isolated(indexer, &nft.token_id, uri).await,
                None => None,
            },
        };

        NonFungibleTokenEntry {
            contract_address: nft.token_address,
            name: non_empty(nft.name).unwrap_or_else(|| UNKNOWN_NFT_NAME.to_string()),
            symbol: non_empty(nft.symbol).unwrap_or_else(|| UNKNOWN_NFT_SYMBOL.to_string()),
            token_id: nft.token_id,
            metadata,
        }
    }

    /// Bounded metadata lookup; every failure degrades to `None`
    async fn fetch_metadata_isolated(
        &self,
        indexer: &dyn IndexerApi,
        token_id: &str,
        uri: &str,
    ) -> Option<Metadata> {
        let result = match tokio::time::timeout(self.metadata_timeout, indexer.fetch_metadata(uri)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::MetadataFetch(format!(
                "timed out after {}ms",
                self.metadata_timeout.as_millis()
            ))),
        };

        match result {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                metrics::increment_metadata_failure_count();
                log::warn!("⚠️  Failed to fetch metadata for token {}: {}", token_id, e);
                None
            }
        }
    }
}

fn normalize_token(token: MoralisToken) -> FungibleTokenEntry {
    let decimals = parse_decimals(token.decimals.as_ref());
    FungibleTokenEntry {
        contract_address: token.token_address,
        name: token.name.unwrap_or_default(),
        symbol: token.symbol.unwrap_or_default(),
        logo_url: non_empty(token.logo),
        decimals,
        raw_balance: token.balance.unwrap_or_else(|| "0".to_string()),
    }
}

/// Token decimals from the indexer. Never fails: unparseable values and values
/// above [`MAX_DECIMALS`] become 0.
///
/// Strings are read like `parseInt(value, 10)`: surrounding whitespace is ignored
/// and parsing stops at the first non-digit.
pub fn parse_decimals(raw: Option<&serde_json::Value>) -> u32 {
    let parsed = match raw {
        Some(serde_json::Value::String(text)) => {
            let text = text.trim();
            let text = text.strip_prefix('+').unwrap_or(text);
            let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        }
        Some(serde_json::Value::Number(number)) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };

    parsed.filter(|decimals| *decimals <= MAX_DECIMALS).unwrap_or_else(|| {
        log::warn!("⚠️  Invalid token decimals {:?}, defaulting to 0", raw);
        0
    })
}

/// Metadata the indexer already attached to the NFT, if any is usable
fn inline_metadata(nft: &MoralisNft) -> Option<Metadata> {
    if let Some(raw) = nft.metadata.as_deref().filter(|raw| !raw.trim().is_empty()) {
        match serde_json::from_str::<Option<Metadata>>(raw) {
            Ok(Some(metadata)) => return Some(metadata),
            Ok(None) => {}
            Err(e) => log::warn!(
                "⚠️  Ignoring malformed inline metadata for token {}: {}",
                nft.token_id,
                e
            ),
        }
    }

    nft.normalized_metadata
        .as_ref()
        .filter(|value| value.is_object())
        .and_then(|value| serde_json::from_value::<Metadata>(value.clone()).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub enum FakeMetadata {
        Ok(Metadata),
        Fail,
        Hang,
    }

    /// In-memory indexer
    pub struct FakeIndexer {
        pub tokens: Result<Vec<MoralisToken>, AppError>,
        pub nfts: Result<Vec<MoralisNft>, AppError>,
        pub metadata: HashMap<String, FakeMetadata>,
        pub metadata_calls: AtomicUsize,
    }

    impl FakeIndexer {
        pub fn new(tokens: serde_json::Value, nfts: serde_json::Value) -> Self {
            Self {
                tokens: Ok(serde_json::from_value(tokens).unwrap()),
                nfts: Ok(serde_json::from_value(nfts).unwrap()),
                metadata: HashMap::new(),
                metadata_calls: AtomicUsize::new(0),
            }
        }

        pub fn with_metadata(mut self, uri: &str, metadata: FakeMetadata) -> Self {
            self.metadata.insert(uri.to_string(), metadata);
            self
        }
    }

    #[async_trait]
    impl IndexerApi for FakeIndexer {
        async fn fetch_erc20(&self, _address: &str, _chain: Chain) -> Result<Vec<MoralisToken>, AppError> {
            self.tokens.clone()
        }

        async fn fetch_nfts(&self, _address: &str, _chain: Chain) -> Result<Vec<MoralisNft>, AppError> {
            self.nfts.clone()
        }

        async fn fetch_metadata(&self, uri: &str) -> Result<Metadata, AppError> {
            self.metadata_calls.fetch_add(1, Ordering::SeqCst);
            match self.metadata.get(uri) {
                Some(FakeMetadata::Ok(metadata)) => Ok(metadata.clone()),
                Some(FakeMetadata::Hang) => futures::future::pending::<Result<Metadata, AppError>>().await,
                Some(FakeMetadata::Fail) | None => {
                    Err(AppError::MetadataFetch("connection refused".to_string()))
                }
            }
        }
    }

    pub fn service(indexer: FakeIndexer) -> HoldingsService {
        HoldingsService::new(Some(Arc::new(indexer)), Duration::from_millis(100))
    }

    fn named(name: &str) -> Metadata {
        Metadata {
            name: Some(name.to_string()),
            ..Metadata::default()
        }
    }

    #[tokio::test]
    async fn test_erc20_normalization() {
        let indexer = FakeIndexer::new(
            json!([{
                "token_address": "0x1", "name": "Foo", "symbol": "FOO",
                "decimals": "18", "balance": "1000000000000000000"
            }]),
            json!([]),
        );

        let holdings = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap();

        assert_eq!(
            holdings,
            vec![Holding::Erc20(FungibleTokenEntry {
                contract_address: "0x1".to_string(),
                name: "Foo".to_string(),
                symbol: "FOO".to_string(),
                logo_url: None,
                decimals: 18,
                raw_balance: "1000000000000000000".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn test_tokens_come_before_nfts_in_upstream_order() {
        let indexer = FakeIndexer::new(
            json!([
                { "token_address": "0xb", "name": "B", "symbol": "B", "decimals": "6", "balance": "1" },
                { "token_address": "0xa", "name": "A", "symbol": "A", "decimals": "6", "balance": "2" }
            ]),
            json!([
                { "token_address": "0xn2", "token_id": "2" },
                { "token_address": "0xn1", "token_id": "1" }
            ]),
        );

        let holdings = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap();

        let contracts: Vec<&str> = holdings.iter().map(|h| h.contract_address()).collect();
        assert_eq!(contracts, vec!["0xb", "0xa", "0xn2", "0xn1"]);
        assert_eq!(holdings[2].name(), UNKNOWN_NFT_NAME);
        assert_eq!(holdings[2].symbol(), UNKNOWN_NFT_SYMBOL);
    }

    #[tokio::test]
    async fn test_empty_upstream_is_not_an_error() {
        let holdings = service(FakeIndexer::new(json!([]), json!([])))
            .fetch_holdings("0xABC", Chain::Eth)
            .await
            .unwrap();
        assert!(holdings.is_empty());
    }

    #[tokio::test]
    async fn test_inline_metadata_skips_uri_fetch() {
        let indexer = FakeIndexer::new(
            json!([]),
            json!([{
                "token_address": "0xn", "name": "Art", "symbol": "ART", "token_id": "9",
                "token_uri": "https://meta.test/9",
                "metadata": "{\"name\":\"Art #9\",\"image\":\"https://img.test/9.png\"}"
            }]),
        );
        let service = service(indexer);

        let holdings = service.fetch_holdings("0xABC", Chain::Base).await.unwrap();

        match &holdings[0] {
            Holding::Nft(nft) => {
                let metadata = nft.metadata.as_ref().unwrap();
                assert_eq!(metadata.name.as_deref(), Some("Art #9"));
                assert_eq!(metadata.image_url.as_deref(), Some("https://img.test/9.png"));
            }
            other => panic!("unexpected holding: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inline_metadata_with_bad_attribute_keeps_name_and_image() {
        let indexer = FakeIndexer::new(
            json!([]),
            json!([{
                "token_address": "0xn", "token_id": "3",
                "token_uri": "https://meta.test/3",
                "metadata": "{\"name\":\"Art #3\",\"image\":\"https://img.test/3.png\",\"attributes\":[{\"value\":null},{\"trait_type\":\"A\",\"value\":\"x\"}]}"
            }]),
        );
        let service = service(indexer);

        let holdings = service.fetch_holdings("0xABC", Chain::Base).await.unwrap();

        match &holdings[0] {
            Holding::Nft(nft) => {
                let metadata = nft.metadata.as_ref().unwrap();
                assert_eq!(metadata.name.as_deref(), Some("Art #3"));
                assert_eq!(metadata.image_url.as_deref(), Some("https://img.test/3.png"));
                assert_eq!(metadata.attributes.len(), 1);
                assert_eq!(metadata.attributes[0].trait_type.as_deref(), Some("A"));
            }
            other => panic!("unexpected holding: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_uri_metadata_fetched_when_not_inlined() {
        let indexer = FakeIndexer::new(
            json!([]),
            json!([{ "token_address": "0xn", "token_id": "1", "token_uri": "https://meta.test/1" }]),
        )
        .with_metadata("https://meta.test/1", FakeMetadata::Ok(named("From URI")));

        let holdings = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap();

        match &holdings[0] {
            Holding::Nft(nft) => assert_eq!(nft.metadata, Some(named("From URI"))),
            other => panic!("unexpected holding: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_normalized_metadata_used_before_uri() {
        let indexer = FakeIndexer::new(
            json!([]),
            json!([{
                "token_address": "0xn", "token_id": "1", "token_uri": "https://meta.test/1",
                "metadata": null,
                "normalized_metadata": { "name": "Normalized", "attributes": [] }
            }]),
        );

        let holdings = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap();

        match &holdings[0] {
            Holding::Nft(nft) => assert_eq!(nft.metadata, Some(named("Normalized"))),
            other => panic!("unexpected holding: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_metadata_timeout_is_isolated() {
        let indexer = FakeIndexer::new(
            json!([{ "token_address": "0x1", "name": "Foo", "symbol": "FOO", "decimals": "18", "balance": "5" }]),
            json!([
                { "token_address": "0xn", "token_id": "1", "token_uri": "https://meta.test/1" },
                { "token_address": "0xn", "token_id": "2", "token_uri": "https://meta.test/2" },
                { "token_address": "0xn", "token_id": "3", "token_uri": "https://meta.test/3" }
            ]),
        )
        .with_metadata("https://meta.test/1", FakeMetadata::Ok(named("One")))
        .with_metadata("https://meta.test/2", FakeMetadata::Hang)
        .with_metadata("https://meta.test/3", FakeMetadata::Ok(named("Three")));

        let holdings = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap();

        assert_eq!(holdings.len(), 4);
        let metadata: Vec<Option<Metadata>> = holdings[1..]
            .iter()
            .map(|h| match h {
                Holding::Nft(nft) => nft.metadata.clone(),
                other => panic!("unexpected holding: {:?}", other),
            })
            .collect();
        assert_eq!(metadata, vec![Some(named("One")), None, Some(named("Three"))]);
    }

    #[tokio::test]
    async fn test_failed_metadata_fetch_keeps_entry() {
        let indexer = FakeIndexer::new(
            json!([]),
            json!([{ "token_address": "0xn", "token_id": "1", "token_uri": "https://down.test/1" }]),
        )
        .with_metadata("https://down.test/1", FakeMetadata::Fail);

        let holdings = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap();

        assert_eq!(holdings.len(), 1);
        assert!(matches!(&holdings[0], Holding::Nft(nft) if nft.metadata.is_none()));
    }

    #[tokio::test]
    async fn test_malformed_inline_metadata_falls_back_to_uri() {
        let indexer = FakeIndexer::new(
            json!([]),
            json!([{
                "token_address": "0xn", "token_id": "1",
                "token_uri": "https://meta.test/1", "metadata": "{not json"
            }]),
        )
        .with_metadata("https://meta.test/1", FakeMetadata::Ok(named("Recovered")));

        let holdings = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap();

        assert!(matches!(&holdings[0], Holding::Nft(nft) if nft.metadata == Some(named("Recovered"))));
    }

    #[tokio::test]
    async fn test_no_uri_means_no_fetch() {
        let indexer = Arc::new(FakeIndexer::new(
            json!([]),
            json!([{ "token_address": "0xn", "token_id": "1", "token_uri": null }]),
        ));
        let service = HoldingsService::new(Some(indexer.clone()), Duration::from_millis(100));

        let holdings = service.fetch_holdings("0xABC", Chain::Base).await.unwrap();

        assert_eq!(holdings.len(), 1);
        assert_eq!(indexer.metadata_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_same_upstream_state_gives_same_output() {
        let indexer = FakeIndexer::new(
            json!([
                { "token_address": "0x1", "name": "Foo", "symbol": "FOO", "decimals": "18", "balance": "5" },
                { "token_address": "0x2", "name": "Bar", "symbol": "BAR", "decimals": "x", "balance": "7" }
            ]),
            json!([
                { "token_address": "0xn", "token_id": "1", "token_uri": "https://meta.test/1" },
                { "token_address": "0xn", "token_id": "2", "token_uri": "https://meta.test/2" }
            ]),
        )
        .with_metadata("https://meta.test/1", FakeMetadata::Ok(named("One")))
        .with_metadata("https://meta.test/2", FakeMetadata::Fail);
        let service = service(indexer);

        let first = service.fetch_holdings("0xABC", Chain::Base).await.unwrap();
        let second = service.fetch_holdings("0xABC", Chain::Base).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upstream_error_aborts_request() {
        let mut indexer = FakeIndexer::new(json!([]), json!([]));
        indexer.nfts = Err(AppError::upstream(Some(429), "Rate limit exceeded"));

        let err = service(indexer)
            .fetch_holdings("0xABC", Chain::Base)
            .await
            .unwrap_err();

        assert_eq!(err, AppError::upstream(Some(429), "Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let service = HoldingsService::new(None, Duration::from_secs(5));
        let err = service.fetch_holdings("0xABC", Chain::Base).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_blank_address_is_validation_error() {
        let service = HoldingsService::new(None, Duration::from_secs(5));
        let err = service.fetch_holdings("   ", Chain::Base).await.unwrap_err();
        assert_eq!(err, AppError::Validation("Address is required".to_string()));
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse_decimals(Some(&json!("18"))), 18);
        assert_eq!(parse_decimals(Some(&json!(" 6 "))), 6);
        assert_eq!(parse_decimals(Some(&json!("8.0"))), 8);
        assert_eq!(parse_decimals(Some(&json!(9))), 9);
        assert_eq!(parse_decimals(Some(&json!("abc"))), 0);
        assert_eq!(parse_decimals(Some(&json!(""))), 0);
        assert_eq!(parse_decimals(Some(&json!("-1"))), 0);
        assert_eq!(parse_decimals(Some(&json!("99999999999999999999"))), 0);
        assert_eq!(parse_decimals(Some(&json!("77"))), 77);
        assert_eq!(parse_decimals(Some(&json!("78"))), 0);
        assert_eq!(parse_decimals(Some(&json!("4294967295"))), 0);
        assert_eq!(parse_decimals(Some(&json!(4_294_967_295u64))), 0);
        assert_eq!(parse_decimals(Some(&json!(1.5))), 0);
        assert_eq!(parse_decimals(Some(&json!(null))), 0);
        assert_eq!(parse_decimals(None), 0);
    }

    #[test]
    fn test_missing_logo_and_balance() {
        let token: MoralisToken = serde_json::from_value(json!({
            "token_address": "0x1", "name": "Foo", "symbol": "FOO", "logo": "", "decimals": "2"
        }))
        .unwrap();

        let entry = normalize_token(token);
        assert_eq!(entry.logo_url, None);
        assert_eq!(entry.raw_balance, "0");
    }
}
