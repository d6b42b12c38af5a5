use serde::{Deserialize, Serialize};

use crate::custom_fields::{CustomFields, HasCustomFields};
use crate::hydrate::{lenient, FieldMap, Hydrate, Nested, Shape};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub code: Option<String>,
}

impl Hydrate for Country {
    const NAME: &'static str = "Country";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct State {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub code: Option<String>,
}

impl Hydrate for State {
    const NAME: &'static str = "State";
}

/// Postal address of a customer or specifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address_1: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address_2: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<Country>,
    #[serde(default)]
    pub state: Option<State>,
}

impl Hydrate for Address {
    const NAME: &'static str = "Address";
    const SHAPE: Shape = Shape {
        fields: &[],
        nested: &[
            Nested { dest: "country", source: "country", reshape: <Country as Hydrate>::reshape },
            Nested { dest: "state", source: "state", reshape: <State as Hydrate>::reshape },
        ],
        derived: &[],
        ignored: &[],
    };
}

/// A customer or specifier attached to a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub customer_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<Country>,
    #[serde(default)]
    pub primary_address: Option<Address>,
}

impl Hydrate for Customer {
    const NAME: &'static str = "Customer";
    const SHAPE: Shape = Shape {
        fields: &[],
        nested: &[
            Nested { dest: "country", source: "country", reshape: <Country as Hydrate>::reshape },
            Nested {
                dest: "primary_address",
                source: "primary_address",
                reshape: <Address as Hydrate>::reshape,
            },
        ],
        derived: &[],
        ignored: &[],
    };
}

/// A hold placed on a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hold {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub hold_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub comment: Option<String>,
}

impl Hydrate for Hold {
    const NAME: &'static str = "Hold";
    const SHAPE: Shape = Shape {
        fields: &[FieldMap { dest: "name", source: "hold.name" }],
        ..Shape::FLAT
    };
}

/// A quantity of one inventory piece assigned to a transaction item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    #[serde(default)]
    pub id: Option<i64>,
    pub inventory_id: i64,
    #[serde(deserialize_with = "lenient::f64_value")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub lot: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub piece: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub warehouse: Option<String>,
}

impl Allocation {
    pub fn new(inventory_id: i64, quantity: f64) -> Self {
        Self {
            id: None,
            inventory_id,
            quantity,
            lot: None,
            piece: None,
            warehouse: None,
        }
    }
}

impl Hydrate for Allocation {
    const NAME: &'static str = "Allocation";
    const SHAPE: Shape = Shape {
        fields: &[
            FieldMap { dest: "inventory_id", source: "piece_id" },
            FieldMap { dest: "lot", source: "piece.lot" },
            FieldMap { dest: "piece", source: "piece.piece" },
            FieldMap { dest: "warehouse", source: "piece.warehouse.name" },
        ],
        ..Shape::FLAT
    };
}

/// One line of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionItem {
    pub id: i64,
    #[serde(default)]
    pub transaction_id: Option<i64>,
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub item_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub style_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub color_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::f64_value")]
    pub quantity_ordered: f64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

impl TransactionItem {
    pub fn allocated_quantity(&self) -> f64 {
        self.allocations.iter().fold(0.0, |total, a| total + a.quantity)
    }
}

impl Hydrate for TransactionItem {
    const NAME: &'static str = "TransactionItem";
    const SHAPE: Shape = Shape {
        fields: &[
            FieldMap { dest: "item_number", source: "item.item_number" },
            FieldMap { dest: "style_name", source: "item.style.name" },
            FieldMap { dest: "color_name", source: "item.color_name" },
            FieldMap { dest: "category", source: "item.style.product_category_code.name" },
        ],
        nested: &[Nested {
            dest: "allocations",
            source: "allocated_pieces",
            reshape: <Allocation as Hydrate>::reshape,
        }],
        derived: &[],
        ignored: &[],
    };
}

/// Either a hydrated transaction item or just its id.
#[derive(Debug, Clone, Copy)]
pub enum TransactionItemRef<'a> {
    Item(&'a TransactionItem),
    Id(i64),
}

impl TransactionItemRef<'_> {
    pub fn id(&self) -> i64 {
        match self {
            TransactionItemRef::Item(item) => item.id,
            TransactionItemRef::Id(id) => *id,
        }
    }
}

impl<'a> From<&'a TransactionItem> for TransactionItemRef<'a> {
    fn from(item: &'a TransactionItem) -> Self {
        TransactionItemRef::Item(item)
    }
}

impl From<i64> for TransactionItemRef<'_> {
    fn from(id: i64) -> Self {
        TransactionItemRef::Id(id)
    }
}

/// A sales transaction header with its customer, holds and line items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    #[serde(deserialize_with = "lenient::string_value")]
    pub transaction_number: String,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub specifier: Option<Customer>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ship_to_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ship_to_address_1: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ship_to_address_2: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ship_to_city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ship_to_postal_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ship_to_state: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ship_to_country: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub rep: Option<String>,
    #[serde(default)]
    pub holds: Vec<Hold>,
    #[serde(default)]
    pub items: Vec<TransactionItem>,
    #[serde(flatten)]
    pub custom_fields: CustomFields,
}

impl Transaction {
    pub fn is_on_hold(&self) -> bool {
        !self.holds.is_empty()
    }
}

impl Hydrate for Transaction {
    const NAME: &'static str = "Transaction";
    const SHAPE: Shape = Shape {
        fields: &[
            FieldMap { dest: "ship_to_state", source: "ship_to_state.code" },
            FieldMap { dest: "ship_to_country", source: "ship_to_country.code" },
            FieldMap { dest: "rep", source: "rep1.name" },
        ],
        nested: &[
            Nested { dest: "customer", source: "customer", reshape: <Customer as Hydrate>::reshape },
            Nested { dest: "specifier", source: "specifier", reshape: <Customer as Hydrate>::reshape },
            Nested { dest: "holds", source: "holds", reshape: <Hold as Hydrate>::reshape },
            Nested { dest: "items", source: "items", reshape: <TransactionItem as Hydrate>::reshape },
        ],
        derived: &[],
        ignored: &[
            "customer_id",
            "specifier_id",
            "rep1_id",
            "ship_to_state_id",
            "ship_to_country_id",
            "created_at",
            "updated_at",
            "deleted_at",
        ],
    };
}

impl HasCustomFields for Transaction {
    fn custom_fields(&self) -> Option<&CustomFields> {
        Some(&self.custom_fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn hydrates_header_items_and_allocations() {
        let transaction = Transaction::hydrate(json!({
            "id": 500,
            "transaction_number": 70001,
            "company_id": 1,
            "customer_id": 8,
            "sidemark": "Smith residence",
            "ship_to_name": "Smith",
            "ship_to_state": {"id": 11, "code": "GA", "name": "Georgia"},
            "ship_to_country": {"id": 1, "code": "US"},
            "rep1": {"id": 4, "name": "Dana Rep"},
            "customer": {
                "id": 8,
                "name": "Design House",
                "country": {"code": "US"},
                "primary_address": {
                    "address_1": "1 Peachtree St",
                    "city": "Atlanta",
                    "state": {"code": "GA"},
                    "country": null
                }
            },
            "specifier": null,
            "holds": [{"id": 1, "hold_id": 2, "hold": {"name": "Credit"}}],
            "items": [{
                "id": 900,
                "item_id": 101,
                "quantity_ordered": "12.00",
                "item": {
                    "item_number": "1001-01",
                    "color_name": "Ivory",
                    "style": {"name": "Belgian Linen", "product_category_code": {"name": "Drapery"}}
                },
                "allocated_pieces": [
                    {"id": 1, "piece_id": 9, "quantity": 5, "piece": {"lot": "L-44", "piece": "3", "warehouse": {"name": "Main"}}},
                    {"id": 2, "piece_id": 10, "quantity": "2.5"}
                ]
            }]
        }))
        .unwrap();

        assert_eq!(transaction.transaction_number, "70001");
        assert_eq!(transaction.ship_to_state.as_deref(), Some("GA"));
        assert_eq!(transaction.ship_to_country.as_deref(), Some("US"));
        assert_eq!(transaction.rep.as_deref(), Some("Dana Rep"));
        assert!(transaction.specifier.is_none());
        assert!(transaction.is_on_hold());
        assert_eq!(transaction.holds[0].name.as_deref(), Some("Credit"));

        let customer = transaction.customer.as_ref().unwrap();
        let address = customer.primary_address.as_ref().unwrap();
        assert_eq!(address.state.as_ref().unwrap().code.as_deref(), Some("GA"));
        assert!(address.country.is_none());

        let item = &transaction.items[0];
        assert_eq!(item.item_number.as_deref(), Some("1001-01"));
        assert_eq!(item.category.as_deref(), Some("Drapery"));
        assert_eq!(item.quantity_ordered, 12.0);
        assert_eq!(item.allocations.len(), 2);
        assert_eq!(item.allocations[0].inventory_id, 9);
        assert_eq!(item.allocations[0].warehouse.as_deref(), Some("Main"));
        assert_eq!(item.allocations[1].lot, None);
        assert_eq!(item.allocated_quantity(), 7.5);

        let custom: Vec<&str> = transaction.all_custom_fields().iter().map(|f| f.key()).collect();
        assert_eq!(custom, vec!["sidemark"]);
    }

    #[test]
    fn item_ref_resolves_to_id() {
        let item = TransactionItem {
            id: 900,
            transaction_id: None,
            item_id: None,
            item_number: None,
            style_name: None,
            color_name: None,
            category: None,
            quantity_ordered: 1.0,
            price: None,
            allocations: Vec::new(),
        };
        assert_eq!(TransactionItemRef::from(&item).id(), 900);
        assert_eq!(TransactionItemRef::from(77_i64).id(), 77);
    }

    #[test]
    fn allocated_quantity_sums_allocations() {
        let mut item = TransactionItem::hydrate(json!({"id": 1, "quantity_ordered": 5})).unwrap();
        assert_eq!(item.allocated_quantity(), 0.0);
        assert!(item.allocated_quantity().is_sign_positive());

        item.allocations = vec![Allocation::new(5, 2.0), Allocation::new(7, 1.5)];
        assert_eq!(item.allocated_quantity(), 3.5);
    }
}
