// Presentation client for the holdings endpoint
pub mod api;
pub mod rows;
pub mod viewer;

pub use api::*;
pub use rows::*;
pub use viewer::*;
