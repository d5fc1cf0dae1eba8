pub mod holdings_service;
pub mod moralis_client;

pub use holdings_service::*;
pub use moralis_client::*;
