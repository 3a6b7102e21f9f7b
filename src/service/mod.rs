//! Validation and transaction handling between the handlers and the repository.

mod transaction;
mod validation;
pub use transaction::TransactionScope;
pub use validation::{ProductValidator, INVALID_CATEGORY};
