//! Repositories: one narrow, stateless operation per endpoint.
//!
//! Each repository borrows a `WdClient`, shapes the query (eager-load hints,
//! filters, paging), issues the call and hydrates the result. Only lookup
//! paths translate bad responses into `ApiError::NotFound`.

mod inventory;
mod product;
mod transaction;

pub use inventory::InventoryRepository;
pub use product::{IterateOptions, ProductRepository, LISTING_RELATIONS, LOOKUP_RELATIONS};
pub use transaction::{allocation_map, TransactionRepository, TRANSACTION_RELATIONS};
