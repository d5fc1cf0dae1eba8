use std::ops::{Deref, DerefMut};

use crate::client::{ClientError, HoldingRow, HoldingsApi};
use crate::models::{Chain, Holding};
use crate::utils::is_valid_address;

/// What the wallet view currently shows
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewState {
    pub address: String,
    pub holdings: Vec<Holding>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Clears `loading` when dropped, including when the request future is cancelled
struct LoadingGuard<'a>(&'a mut ViewState);

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a mut ViewState) -> Self {
        state.loading = true;
        Self(state)
    }
}

impl Deref for LoadingGuard<'_> {
    type Target = ViewState;

    fn deref(&self) -> &ViewState {
        self.0
    }
}

impl DerefMut for LoadingGuard<'_> {
    fn deref_mut(&mut self) -> &mut ViewState {
        self.0
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.loading = false;
    }
}

/// Address form + holdings table, without the rendering.
///
/// `submit` borrows the viewer mutably, so only one request can be in flight.
pub struct WalletViewer<A> {
    api: A,
    chain: Chain,
    state: ViewState,
}

impl<A: HoldingsApi> WalletViewer<A> {
    pub fn new(api: A, chain: Chain) -> Self {
        Self {
            api,
            chain,
            state: ViewState::default(),
        }
    }

    pub async fn submit(&mut self, raw_address: &str) {
        let address = raw_address.trim();

        if !is_valid_address(address) {
            log::warn!("⚠️  Rejected address input '{}'", address);
            self.state.holdings.clear();
            self.state.error = Some(ClientError::InvalidAddress.to_string());
            return;
        }

        let mut state = LoadingGuard::start(&mut self.state);
        state.address = address.to_string();
        state.error = None;
        state.holdings.clear();

        match self.api.get_tokens(address).await {
            Ok(holdings) => {
                log::info!("✅ {} holdings for {}", holdings.len(), address);
                state.holdings = holdings;
            }
            Err(e) => {
                log::error!("❌ Failed to load holdings for {}: {}", address, e);
                state.error = Some(e.to_string());
            }
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.state.holdings
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Explorer link of the last submitted address
    pub fn address_link(&self) -> Option<String> {
        Some(&self.state.address)
            .filter(|address| !address.is_empty())
            .map(|address| self.chain.address_url(address))
    }

    pub fn rows(&self) -> Vec<HoldingRow> {
        self.state
            .holdings
            .iter()
            .map(|holding| HoldingRow::from_holding(holding, self.chain))
            .collect()
    }
}
