//! Synchronous client SDK for the Web Distribution API.
//!
//! # Overview
//! Wraps the products, inventory and transactions endpoints of a Web
//! Distribution instance behind typed repositories. Responses are hydrated
//! from nested JSON into flat records through declarative mapping tables.
//!
//! # Design
//! - `WdClient` holds configuration and a `Transport`; it builds plain-data
//!   `HttpRequest`s and parses `HttpResponse`s. The transport performs the
//!   round-trip (`UreqTransport` by default), so everything above it is
//!   deterministic and testable with scripted responses.
//! - Repositories borrow the client and expose one narrow operation per
//!   endpoint. Nothing is cached; every call is independent.
//! - `Hydrate` types declare a `Shape` (destination ← dotted source path,
//!   nested shapes, derived values) consulted by one reshape routine before
//!   serde deserialization.
//!
//! ```no_run
//! use webdist_core::{ClientConfig, Company, IterateOptions, WdClient};
//!
//! # fn main() -> webdist_core::Result<()> {
//! let client = WdClient::from_config(&ClientConfig::from_env()?)?;
//! client.products().iterate(&Company::new(1), &IterateOptions::default(), |product| {
//!     println!("{} {}", product.item_number, product.style_name);
//!     Ok::<_, webdist_core::ApiError>(())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod custom_fields;
pub mod error;
pub mod http;
pub mod hydrate;
pub mod query;
pub mod repositories;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::WdClient;
pub use config::ClientConfig;
pub use custom_fields::{CustomField, CustomFields, HasCustomFields};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use hydrate::{Hydrate, Shape};
pub use query::Query;
pub use repositories::{
    InventoryRepository, IterateOptions, ProductRepository, TransactionRepository,
};
pub use types::{
    Address, Allocation, Company, Country, Customer, FreightRequest, FreightResponse, Hold,
    Inventory, InventoryRow, Line, Product, State, Transaction, TransactionItem,
    TransactionItemRef,
};
