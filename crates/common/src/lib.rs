//! Shared kernel for the promotions system.
//!
//! Holds the identifier value objects that more than one bounded context refers to.

pub mod types;

pub use types::{CustomerId, IdError, ProductId};
