use serde::{Deserialize, Serialize};

use super::company::{Company, Line};
use crate::custom_fields::{CustomFields, HasCustomFields};
use crate::hydrate::{lenient, FieldMap, Hydrate, Nested, Shape};

/// A sellable item, flattened from an `api/item` row and its eager-loaded
/// style, price, units and relations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    #[serde(deserialize_with = "lenient::string_value")]
    pub item_number: String,
    #[serde(default)]
    pub style_id: Option<i64>,
    pub style_name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub color_name: Option<String>,
    pub category: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub width: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub repeat: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub selling_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub mill_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub discontinue_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub primary_book: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub warehouse_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub warehouse_location_sample: Option<String>,
    #[serde(default)]
    pub company: Option<Company>,
    #[serde(default)]
    pub line: Option<Line>,
    #[serde(flatten)]
    pub custom_fields: CustomFields,
}

impl Hydrate for Product {
    const NAME: &'static str = "Product";
    const SHAPE: Shape = Shape {
        fields: &[
            FieldMap { dest: "style_id", source: "style.id" },
            FieldMap { dest: "style_name", source: "style.name" },
            FieldMap { dest: "category", source: "style.product_category_code.name" },
            FieldMap { dest: "content", source: "style.content" },
            FieldMap { dest: "width", source: "style.width" },
            FieldMap { dest: "repeat", source: "style.repeat" },
            FieldMap { dest: "price", source: "style.primary_price.wholesale_price" },
            FieldMap { dest: "selling_unit", source: "style.selling_unit.name" },
            FieldMap { dest: "mill_unit", source: "style.mill_unit.name" },
            FieldMap { dest: "discontinue_code", source: "discontinue_code.name" },
            FieldMap { dest: "primary_book", source: "primary_book.name" },
            FieldMap { dest: "warehouse_location_sample", source: "sample_warehouse_location" },
        ],
        nested: &[
            Nested { dest: "company", source: "company", reshape: <Company as Hydrate>::reshape },
            Nested { dest: "line", source: "line", reshape: <Line as Hydrate>::reshape },
        ],
        derived: &[],
        ignored: &[
            "company_id",
            "line_id",
            "discontinue_code_id",
            "primary_book_id",
            "created_at",
            "updated_at",
            "deleted_at",
        ],
    };
}

impl HasCustomFields for Product {
    fn custom_fields(&self) -> Option<&CustomFields> {
        Some(&self.custom_fields)
    }
}
