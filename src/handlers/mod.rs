//! HTTP handlers for the product endpoints.

pub mod product;
pub use product::*;
