use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::product::Product;
use crate::custom_fields::HasCustomFields;
use crate::hydrate::{as_number, lenient, Derived, FieldMap, Hydrate, Shape};

/// One physical piece (roll, bolt, lot) of a product in a warehouse.
///
/// `quantity_available` is computed once, at hydration, as
/// `on_hand - allocated`. It goes stale if either changes server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    pub id: i64,
    #[serde(deserialize_with = "lenient::string_value")]
    pub item_number: String,
    pub style_name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub color_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub lot: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub piece: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub warehouse_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub approved: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub pre_receipt: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub seconds: bool,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub vendor_piece: Option<String>,
    #[serde(deserialize_with = "lenient::f64_value")]
    pub quantity_on_hand: f64,
    #[serde(deserialize_with = "lenient::f64_value")]
    pub quantity_available: f64,
}

fn available_quantity(source: &Map<String, Value>) -> Option<Value> {
    let on_hand = as_number(source.get("on_hand")?)?;
    let allocated = as_number(source.get("allocated")?)?;
    Some(json!(on_hand - allocated))
}

impl Hydrate for Inventory {
    const NAME: &'static str = "Inventory";
    const SHAPE: Shape = Shape {
        fields: &[
            FieldMap { dest: "item_number", source: "item.item_number" },
            FieldMap { dest: "style_name", source: "item.style.name" },
            FieldMap { dest: "color_name", source: "item.color_name" },
            FieldMap { dest: "vendor_piece", source: "mill_piece" },
            FieldMap { dest: "quantity_on_hand", source: "on_hand" },
        ],
        nested: &[],
        derived: &[Derived { dest: "quantity_available", compute: available_quantity }],
        ignored: &[],
    };
}

impl HasCustomFields for Inventory {}

/// Raw row of `api/item/{id}/inventory`, before it borrows the product's
/// identity.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryRow {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub lot: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub piece: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub warehouse_location: Option<String>,
    #[serde(default)]
    pub seconds: Value,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub mill_piece: Option<String>,
    #[serde(deserialize_with = "lenient::f64_value")]
    pub on_hand: f64,
    #[serde(deserialize_with = "lenient::f64_value")]
    pub allocated: f64,
}

impl Hydrate for InventoryRow {
    const NAME: &'static str = "InventoryRow";
}

impl InventoryRow {
    /// Denormalize into an `Inventory`, taking item number, style and color
    /// from `product`. Listed pieces are always active, approved and
    /// received; only an integer `seconds` of exactly `1` marks seconds.
    pub fn into_inventory(self, product: &Product) -> Inventory {
        Inventory {
            id: self.id,
            item_number: product.item_number.clone(),
            style_name: product.style_name.clone(),
            color_name: product.color_name.clone(),
            lot: self.lot,
            piece: self.piece,
            warehouse_location: self.warehouse_location,
            active: true,
            approved: true,
            pre_receipt: false,
            seconds: self.seconds.as_i64() == Some(1),
            comment: self.comment,
            vendor_piece: self.mill_piece,
            quantity_on_hand: self.on_hand,
            quantity_available: self.on_hand - self.allocated,
        }
    }
}
