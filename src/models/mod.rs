pub mod chain;
pub mod holding;
pub mod moralis;

pub use chain::*;
pub use holding::*;
pub use moralis::*;
