use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::client::WdClient;
use crate::error::{ApiError, Result};
use crate::hydrate::{kind, Hydrate};
use crate::http::Transport;
use crate::query::Query;
use crate::types::{Company, FreightRequest, FreightResponse, Product};

/// Relations eager-loaded when paging through products.
pub const LISTING_RELATIONS: [&str; 7] = [
    "style.productCategoryCode",
    "style.primaryPrice",
    "company",
    "line",
    "primaryBook",
    "style.sellingUnit",
    "style.millUnit",
];

/// Relations eager-loaded for single-product lookups.
pub const LOOKUP_RELATIONS: [&str; 8] = [
    "style.productCategoryCode",
    "style.primaryPrice",
    "company",
    "discontinueCode",
    "line",
    "primaryBook",
    "style.sellingUnit",
    "style.millUnit",
];

/// Options for `ProductRepository::iterate`.
#[derive(Debug, Clone)]
pub struct IterateOptions {
    /// Filter by line instead of by company.
    ///
    /// The API accepts only one of the two filters. A line that belongs to a
    /// different company yields that company's products.
    pub line_id: Option<i64>,
    pub per_page: u32,
}

impl Default for IterateOptions {
    fn default() -> Self {
        Self {
            line_id: None,
            per_page: 128,
        }
    }
}

#[derive(Serialize)]
struct StyleUpdate<'a> {
    name: &'a str,
    content: Option<&'a str>,
    width: Option<&'a str>,
    repeat: Option<&'a str>,
}

#[derive(Serialize)]
struct ItemUpdate<'a> {
    item_number: &'a str,
    color_name: Option<&'a str>,
    warehouse_location: Option<&'a str>,
    sample_warehouse_location: Option<&'a str>,
}

/// Products (`api/item`) and their styles.
#[derive(Debug)]
pub struct ProductRepository<'a, T> {
    client: &'a WdClient<T>,
}

impl<'a, T: Transport> ProductRepository<'a, T> {
    pub(crate) fn new(client: &'a WdClient<T>) -> Self {
        Self { client }
    }

    /// Page through every product of `company`, calling `callback` once per
    /// product in server order. Stops at the first empty page.
    ///
    /// Pages are fetched one at a time, after the previous page's callbacks
    /// have returned. An `Err` from the callback stops iteration and is
    /// returned as is.
    #[instrument(skip_all, fields(company_id = company.id, line_id = ?options.line_id))]
    pub fn iterate<F, E>(
        &self,
        company: &Company,
        options: &IterateOptions,
        mut callback: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(Product) -> std::result::Result<(), E>,
        E: From<ApiError>,
    {
        let mut query = Query::new()
            .with(LISTING_RELATIONS)
            .param("count", options.per_page)
            .param("page", 1);

        match options.line_id.filter(|id| *id != 0) {
            Some(line_id) => {
                warn!(
                    company_id = company.id,
                    line_id,
                    "filtering by line only; products are not checked against the company"
                );
                query = query.param("line", line_id);
            }
            None => query = query.param("company", company.id),
        }

        let mut page: u32 = 1;
        loop {
            let rows = match self.client.get_json("api/item", &query)? {
                Value::Array(rows) => rows,
                other => {
                    return Err(ApiError::Response(format!(
                        "expected a page of products, got {}",
                        kind(&other)
                    ))
                    .into())
                }
            };
            if rows.is_empty() {
                break;
            }
            debug!(page, count = rows.len(), "product page");
            for row in rows {
                callback(Product::hydrate(row)?)?;
            }
            page += 1;
            query.set("page", page);
        }
        Ok(())
    }

    /// Exact item-number lookup within `company`, trashed items included.
    #[instrument(skip(self, company), fields(company_id = company.id))]
    pub fn find(&self, company: &Company, item_number: &str) -> Result<Product> {
        let query = Query::new()
            .param("company", company.id)
            .param("search", format!("#{item_number}"))
            .param("trashed", "true")
            .with(LOOKUP_RELATIONS);

        match self.client.get_json("api/item", &query)? {
            Value::Array(rows) => match rows.into_iter().next() {
                Some(row) => Product::hydrate(row),
                None => Err(ApiError::NotFound(format!(
                    "product {item_number} not found in company {}",
                    company.id
                ))),
            },
            other => Err(ApiError::Response(format!(
                "expected a list of products, got {}",
                kind(&other)
            ))),
        }
    }

    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: i64) -> Result<Product> {
        let query = Query::new().with(LOOKUP_RELATIONS);
        let response = self
            .client
            .get_json(&format!("api/item/{id}"), &query)
            .map_err(|e| e.into_not_found(|| format!("product with id {id} not found")))?;
        Product::hydrate(response)
    }

    /// Write the style fields, then the item fields, then re-read the
    /// product by company and item number.
    ///
    /// The two writes are independent requests: if the item write fails the
    /// style write has already been applied.
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub fn update(&self, product: &Product) -> Result<Product> {
        let style_id = product.style_id.ok_or_else(|| {
            ApiError::Response(format!("product {} has no style id", product.id))
        })?;
        let company = product.company.as_ref().ok_or_else(|| {
            ApiError::Response(format!("product {} has no company", product.id))
        })?;

        let style = StyleUpdate {
            name: &product.style_name,
            content: product.content.as_deref(),
            width: product.width.as_deref(),
            repeat: product.repeat.as_deref(),
        };
        self.client.put_json(&format!("api/style/{style_id}"), &style)?;

        let item = ItemUpdate {
            item_number: &product.item_number,
            color_name: product.color_name.as_deref(),
            warehouse_location: product.warehouse_location.as_deref(),
            sample_warehouse_location: product.warehouse_location_sample.as_deref(),
        };
        self.client.put_json(&format!("api/item/{}", product.id), &item)?;

        self.find(company, &product.item_number)
    }

    /// Quote freight for shipping `request.quantity` of `product`.
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub fn freight(&self, product: &Product, request: &FreightRequest) -> Result<FreightResponse> {
        request.check()?;

        let query = Query::new()
            .param("postal_code", &request.postal_code)
            .param("quantity", request.quantity)
            .param("country", &request.country);
        let response = self
            .client
            .get_json(&format!("api/item/{}/freight", product.id), &query)?;
        FreightResponse::hydrate(response)
    }
}
