// Utility functions
pub mod address;
pub mod error;

pub use address::*;
pub use error::*;
