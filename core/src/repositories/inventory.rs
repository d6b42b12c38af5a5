use tracing::instrument;

use crate::client::WdClient;
use crate::error::Result;
use crate::hydrate::Hydrate;
use crate::http::Transport;
use crate::query::Query;
use crate::types::{Inventory, InventoryRow, Product};

/// Inventory pieces (`api/inventory`).
#[derive(Debug)]
pub struct InventoryRepository<'a, T> {
    client: &'a WdClient<T>,
}

impl<'a, T: Transport> InventoryRepository<'a, T> {
    pub(crate) fn new(client: &'a WdClient<T>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: i64) -> Result<Inventory> {
        let query = Query::new().with(["item.style"]);
        let response = self
            .client
            .get_json(&format!("api/inventory/{id}"), &query)
            .map_err(|e| e.into_not_found(|| format!("Inventory with id {id} not found")))?;
        Inventory::hydrate(response)
    }

    /// All pieces of `product`, each carrying the product's item number,
    /// style and color.
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub fn list_by_product(&self, product: &Product) -> Result<Vec<Inventory>> {
        let query = Query::new()
            .with(["item.style"])
            .param("item", product.id);
        let response = self
            .client
            .get_json(&format!("api/item/{}/inventory", product.id), &query)?;

        Ok(InventoryRow::hydrate_list(response)?
            .into_iter()
            .map(|row| row.into_inventory(product))
            .collect())
    }
}
