use std::collections::BTreeMap;

use serde_json::Value;
use tracing::instrument;

use crate::client::WdClient;
use crate::error::{ApiError, Result};
use crate::hydrate::{kind, Hydrate};
use crate::http::Transport;
use crate::query::Query;
use crate::types::{Allocation, Company, Inventory, Transaction, TransactionItem, TransactionItemRef};

/// Relations eager-loaded for a transaction lookup.
pub const TRANSACTION_RELATIONS: [&str; 14] = [
    "customer.country",
    "customer.primaryAddress.country",
    "customer.primaryAddress.state",
    "holds.hold",
    "items.allocatedPieces.piece.warehouse",
    "items.item.style.millUnit",
    "items.item.style.productCategoryCode",
    "items.item.style.sellingUnit",
    "rep1",
    "shipToCountry",
    "shipToState",
    "specifier.country",
    "specifier.primaryAddress.country",
    "specifier.primaryAddress.state",
];

/// Build the piece-id → quantity map for a reallocation. A piece listed
/// twice keeps its last quantity.
pub fn allocation_map(allocations: &[Allocation]) -> BTreeMap<i64, f64> {
    let mut map = BTreeMap::new();
    for allocation in allocations {
        map.insert(allocation.inventory_id, allocation.quantity);
    }
    map
}

/// Sales transactions and item allocation.
#[derive(Debug)]
pub struct TransactionRepository<'a, T> {
    client: &'a WdClient<T>,
}

impl<'a, T: Transport> TransactionRepository<'a, T> {
    pub(crate) fn new(client: &'a WdClient<T>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, company), fields(company_id = company.id))]
    pub fn find_by_transaction_number(
        &self,
        company: &Company,
        transaction_number: &str,
    ) -> Result<Transaction> {
        let query = Query::new()
            .with(TRANSACTION_RELATIONS)
            .param("company", company.id)
            .param("transaction_number", transaction_number)
            .flag("transaction_number_exact", true);
        let not_found = || format!("Transaction with number {transaction_number} not found");

        let response = self
            .client
            .get_json("api/transaction", &query)
            .map_err(|e| e.into_not_found(not_found))?;
        match response {
            Value::Array(rows) => match rows.into_iter().next() {
                Some(row) => Transaction::hydrate(row),
                None => Err(ApiError::NotFound(not_found())),
            },
            other => Err(ApiError::Response(format!(
                "expected a list of transactions, got {}",
                kind(&other)
            ))),
        }
    }

    /// Release every allocation of a transaction item.
    #[instrument(skip_all)]
    pub fn unallocate<'i>(&self, item: impl Into<TransactionItemRef<'i>>) -> Result<()> {
        let id = item.into().id();
        self.client
            .post(&format!("api/transaction-item/{id}/unallocate"), None)?;
        Ok(())
    }

    /// Allocate the item's full ordered quantity from one piece.
    pub fn allocate_single(&self, item: &TransactionItem, piece: &Inventory) -> Result<()> {
        self.allocate_single_id(item.id, piece.id, item.quantity_ordered)
    }

    pub fn allocate_single_id(&self, item_id: i64, piece_id: i64, quantity: f64) -> Result<()> {
        self.allocate_id(item_id, &BTreeMap::from([(piece_id, quantity)]))
    }

    /// Replace the item's allocations with `allocations`.
    pub fn allocate(&self, item: &TransactionItem, allocations: &[Allocation]) -> Result<()> {
        self.allocate_id(item.id, &allocation_map(allocations))
    }

    /// Replace the allocations of item `item_id` with the given piece-id →
    /// quantity map. Pieces not in the map are released.
    #[instrument(skip(self, allocations), fields(pieces = allocations.len()))]
    pub fn allocate_id(&self, item_id: i64, allocations: &BTreeMap<i64, f64>) -> Result<()> {
        let body = serde_json::to_value(allocations)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.client
            .post(&format!("api/transaction-item/{item_id}/reallocate"), Some(&body))?;
        Ok(())
    }
}
