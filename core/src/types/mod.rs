//! Typed records hydrated from Web Distribution responses.
//!
//! # Design
//! Every record is flat: nested source paths are declared in each type's
//! `Hydrate::SHAPE` table rather than mirrored as nested structs. Records
//! live only as long as the caller keeps them; nothing is cached or
//! tracked, and changes are made by sending fields back through a
//! repository.

mod company;
mod freight;
mod inventory;
mod product;
mod transaction;

pub use company::{Company, Line};
pub use freight::{FreightRequest, FreightResponse};
pub use inventory::{Inventory, InventoryRow};
pub use product::Product;
pub use transaction::{
    Address, Allocation, Country, Customer, Hold, State, Transaction, TransactionItem,
    TransactionItemRef,
};
