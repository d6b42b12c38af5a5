//! In-memory stand-in for the Web Distribution REST API.
//!
//! Serves the item, style, inventory and transaction endpoints the SDK
//! talks to, over a small seeded catalog. Responses mimic the real API's
//! nesting (eager-loaded `style`, `company`, `item.style`, ...) so the SDK's
//! hydration runs against realistic shapes.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct Line {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct Style {
    pub id: i64,
    pub name: String,
    pub content: Option<String>,
    pub width: Option<String>,
    pub repeat: Option<String>,
    pub category: String,
    pub wholesale_price: String,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub id: i64,
    pub style_id: i64,
    pub company_id: i64,
    pub line_id: i64,
    pub item_number: String,
    pub color_name: Option<String>,
    pub warehouse_location: Option<String>,
    pub sample_warehouse_location: Option<String>,
    pub trashed: bool,
}

#[derive(Clone, Debug)]
pub struct Piece {
    pub id: i64,
    pub item_id: i64,
    pub lot: String,
    pub piece: String,
    pub warehouse_location: String,
    pub seconds: i64,
    pub comment: Option<String>,
    pub mill_piece: Option<String>,
    pub on_hand: f64,
}

#[derive(Clone, Debug)]
pub struct TransactionItem {
    pub id: i64,
    pub item_id: i64,
    pub quantity_ordered: f64,
    /// piece id → allocated quantity
    pub allocations: BTreeMap<i64, f64>,
}

#[derive(Clone, Debug)]
pub struct Transaction {
    pub id: i64,
    pub company_id: i64,
    pub transaction_number: String,
    pub customer_name: String,
    pub on_hold: bool,
    pub items: Vec<TransactionItem>,
}

/// Everything the mock knows about.
#[derive(Clone, Debug, Default)]
pub struct Store {
    pub companies: Vec<Company>,
    pub lines: Vec<Line>,
    pub styles: Vec<Style>,
    pub items: Vec<Item>,
    pub pieces: Vec<Piece>,
    pub transactions: Vec<Transaction>,
}

impl Store {
    /// Two companies, three lines, five items (one trashed), a few pieces
    /// and one open transaction.
    pub fn seeded() -> Self {
        let companies = vec![
            Company { id: 1, name: "Acme Textiles".to_string() },
            Company { id: 2, name: "Borealis Fabrics".to_string() },
        ];
        let lines = vec![
            Line { id: 10, company_id: 1, name: "Heritage".to_string() },
            Line { id: 11, company_id: 1, name: "Coastal".to_string() },
            Line { id: 20, company_id: 2, name: "Nordic".to_string() },
        ];
        let styles = vec![
            Style {
                id: 100,
                name: "Belgian Linen".to_string(),
                content: Some("100% Linen".to_string()),
                width: Some("54".to_string()),
                repeat: None,
                category: "Drapery".to_string(),
                wholesale_price: "42.50".to_string(),
            },
            Style {
                id: 101,
                name: "Harbor Stripe".to_string(),
                content: Some("60% Cotton 40% Poly".to_string()),
                width: Some("56".to_string()),
                repeat: Some("3.5\"".to_string()),
                category: "Upholstery".to_string(),
                wholesale_price: "28.00".to_string(),
            },
            Style {
                id: 200,
                name: "Fjord Boucle".to_string(),
                content: None,
                width: None,
                repeat: None,
                category: "Upholstery".to_string(),
                wholesale_price: "61.25".to_string(),
            },
        ];
        let item = |id, style_id, company_id, line_id, number: &str, color: &str, trashed| Item {
            id,
            style_id,
            company_id,
            line_id,
            item_number: number.to_string(),
            color_name: Some(color.to_string()),
            warehouse_location: Some(format!("A-{id}")),
            sample_warehouse_location: None,
            trashed,
        };
        let items = vec![
            item(1001, 100, 1, 10, "1001-01", "Ivory", false),
            item(1002, 100, 1, 10, "1001-02", "Flax", false),
            item(1003, 101, 1, 11, "2040-07", "Navy", false),
            item(1004, 101, 1, 11, "2040-09", "Sand", true),
            item(2001, 200, 2, 20, "9000-01", "Snow", false),
        ];
        let pieces = vec![
            Piece {
                id: 501,
                item_id: 1001,
                lot: "L-44".to_string(),
                piece: "1".to_string(),
                warehouse_location: "B-2".to_string(),
                seconds: 0,
                comment: None,
                mill_piece: Some("MP-778".to_string()),
                on_hand: 40.0,
            },
            Piece {
                id: 502,
                item_id: 1001,
                lot: "L-45".to_string(),
                piece: "2".to_string(),
                warehouse_location: "B-3".to_string(),
                seconds: 1,
                comment: Some("slub at 3yd".to_string()),
                mill_piece: None,
                on_hand: 12.5,
            },
            Piece {
                id: 503,
                item_id: 1003,
                lot: "L-90".to_string(),
                piece: "1".to_string(),
                warehouse_location: "C-1".to_string(),
                seconds: 0,
                comment: None,
                mill_piece: Some("MP-900".to_string()),
                on_hand: 30.0,
            },
        ];
        let transactions = vec![Transaction {
            id: 7000,
            company_id: 1,
            transaction_number: "70001".to_string(),
            customer_name: "Design House".to_string(),
            on_hold: true,
            items: vec![TransactionItem {
                id: 9001,
                item_id: 1001,
                quantity_ordered: 10.0,
                allocations: BTreeMap::from([(501, 4.0)]),
            }],
        }];

        Self {
            companies,
            lines,
            styles,
            items,
            pieces,
            transactions,
        }
    }

    fn allocated(&self, piece_id: i64) -> f64 {
        self.transactions
            .iter()
            .flat_map(|t| &t.items)
            .filter_map(|i| i.allocations.get(&piece_id))
            .fold(0.0, |total, quantity| total + quantity)
    }

    fn item_json(&self, item: &Item) -> Value {
        let style = self.styles.iter().find(|s| s.id == item.style_id);
        let company = self.companies.iter().find(|c| c.id == item.company_id);
        let line = self.lines.iter().find(|l| l.id == item.line_id);
        json!({
            "id": item.id,
            "item_number": item.item_number,
            "color_name": item.color_name,
            "company_id": item.company_id,
            "line_id": item.line_id,
            "style_id": item.style_id,
            "warehouse_location": item.warehouse_location,
            "sample_warehouse_location": item.sample_warehouse_location,
            "deleted_at": if item.trashed { json!("2024-01-01T00:00:00Z") } else { Value::Null },
            "style": style.map(style_json),
            "company": company.map(|c| json!({"id": c.id, "name": c.name})),
            "line": line.map(|l| json!({"id": l.id, "name": l.name, "company_id": l.company_id})),
            "primary_book": null,
            "discontinue_code": null,
        })
    }

    fn piece_row(&self, piece: &Piece) -> Value {
        json!({
            "id": piece.id,
            "item_id": piece.item_id,
            "lot": piece.lot,
            "piece": piece.piece,
            "warehouse_location": piece.warehouse_location,
            "seconds": piece.seconds,
            "comment": piece.comment,
            "mill_piece": piece.mill_piece,
            "on_hand": format!("{:.2}", piece.on_hand),
            "allocated": format!("{:.2}", self.allocated(piece.id)),
        })
    }

    fn transaction_json(&self, transaction: &Transaction) -> Value {
        let items: Vec<Value> = transaction
            .items
            .iter()
            .map(|line| {
                let item = self.items.iter().find(|i| i.id == line.item_id);
                let allocated: Vec<Value> = line
                    .allocations
                    .iter()
                    .map(|(piece_id, quantity)| {
                        let piece = self.pieces.iter().find(|p| p.id == *piece_id);
                        json!({
                            "piece_id": piece_id,
                            "quantity": quantity,
                            "piece": piece.map(|p| json!({
                                "id": p.id,
                                "lot": p.lot,
                                "piece": p.piece,
                                "warehouse": {"name": "Main"},
                            })),
                        })
                    })
                    .collect();
                json!({
                    "id": line.id,
                    "transaction_id": transaction.id,
                    "item_id": line.item_id,
                    "quantity_ordered": format!("{:.2}", line.quantity_ordered),
                    "item": item.map(|i| self.item_json(i)),
                    "allocated_pieces": allocated,
                })
            })
            .collect();
        let holds = if transaction.on_hold {
            json!([{"id": 1, "hold_id": 3, "hold": {"id": 3, "name": "Credit"}}])
        } else {
            json!([])
        };
        json!({
            "id": transaction.id,
            "company_id": transaction.company_id,
            "transaction_number": transaction.transaction_number,
            "sidemark": "Lobby",
            "ship_to_name": transaction.customer_name,
            "ship_to_city": "Atlanta",
            "ship_to_state": {"id": 11, "code": "GA", "name": "Georgia"},
            "ship_to_country": {"id": 1, "code": "US", "name": "United States"},
            "rep1": {"id": 4, "name": "Dana Rep"},
            "customer": {
                "id": 8,
                "name": transaction.customer_name,
                "country": {"code": "US"},
                "primary_address": {"address_1": "1 Peachtree St", "city": "Atlanta", "state": {"code": "GA"}},
            },
            "specifier": null,
            "holds": holds,
            "items": items,
        })
    }
}

fn style_json(style: &Style) -> Value {
    json!({
        "id": style.id,
        "name": style.name,
        "content": style.content,
        "width": style.width,
        "repeat": style.repeat,
        "product_category_code": {"name": style.category},
        "primary_price": {"wholesale_price": style.wholesale_price},
        "selling_unit": {"name": "Yard"},
        "mill_unit": {"name": "Yard"},
    })
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/item", get(list_items))
        .route("/api/item/{id}", get(get_item).put(update_item))
        .route("/api/item/{id}/freight", get(freight_quote))
        .route("/api/item/{id}/inventory", get(list_item_inventory))
        .route("/api/style/{id}", put(update_style))
        .route("/api/inventory/{id}", get(get_inventory))
        .route("/api/transaction", get(list_transactions))
        .route("/api/transaction-item/{id}/unallocate", post(unallocate))
        .route("/api/transaction-item/{id}/reallocate", post(reallocate))
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), "mock Web Distribution API listening");
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Result<Response, StatusCode> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());
    if authorized {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Raw query pairs; `with[]` repeats, so a map will not do.
type Pairs = Vec<(String, String)>;

fn first<'a>(pairs: &'a Pairs, key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn number<T: std::str::FromStr>(pairs: &Pairs, key: &str) -> Result<Option<T>, StatusCode> {
    first(pairs, key)
        .map(|v| v.parse().map_err(|_| StatusCode::UNPROCESSABLE_ENTITY))
        .transpose()
}

async fn list_items(
    State(db): State<Db>,
    Query(pairs): Query<Pairs>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let company: Option<i64> = number(&pairs, "company")?;
    let line: Option<i64> = number(&pairs, "line")?;
    let count = number::<usize>(&pairs, "count")?.unwrap_or(15).max(1);
    let page = number::<usize>(&pairs, "page")?.unwrap_or(1).max(1);
    let trashed = first(&pairs, "trashed") == Some("true");
    let search = first(&pairs, "search");

    let store = db.read().await;
    let matches: Vec<Value> = store
        .items
        .iter()
        .filter(|i| trashed || !i.trashed)
        .filter(|i| company.is_none_or(|c| i.company_id == c))
        .filter(|i| line.is_none_or(|l| i.line_id == l))
        .filter(|i| match search {
            Some(s) => match s.strip_prefix('#') {
                Some(exact) => i.item_number == exact,
                None => i.item_number.contains(s),
            },
            None => true,
        })
        .skip((page - 1) * count)
        .take(count)
        .map(|i| store.item_json(i))
        .collect();
    Ok(Json(matches))
}

async fn get_item(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store
        .items
        .iter()
        .find(|i| i.id == id)
        .map(|i| Json(store.item_json(i)))
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
pub struct ItemUpdate {
    pub item_number: String,
    pub color_name: Option<String>,
    pub warehouse_location: Option<String>,
    pub sample_warehouse_location: Option<String>,
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<ItemUpdate>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let item = store
        .items
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    item.item_number = input.item_number;
    item.color_name = input.color_name;
    item.warehouse_location = input.warehouse_location;
    item.sample_warehouse_location = input.sample_warehouse_location;
    let item = item.clone();
    Ok(Json(store.item_json(&item)))
}

#[derive(Deserialize)]
pub struct StyleUpdate {
    pub name: String,
    pub content: Option<String>,
    pub width: Option<String>,
    pub repeat: Option<String>,
}

async fn update_style(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<StyleUpdate>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let style = store
        .styles
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    style.name = input.name;
    style.content = input.content;
    style.width = input.width;
    style.repeat = input.repeat;
    Ok(Json(style_json(style)))
}

async fn freight_quote(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(pairs): Query<Pairs>,
) -> Result<Json<Value>, StatusCode> {
    let quantity: f64 = number(&pairs, "quantity")?.ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let country = first(&pairs, "country").ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    if first(&pairs, "postal_code").is_none_or(str::is_empty) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    if !db.read().await.items.iter().any(|i| i.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let domestic = country.eq_ignore_ascii_case("US");
    let base = if domestic { 12.0 } else { 45.0 };
    Ok(Json(json!({
        "rate": format!("{:.2}", base + quantity * 0.75),
        "currency": "USD",
        "carrier": if domestic { "UPS" } else { "DHL" },
        "service": "Ground",
        "transit_days": if domestic { 3 } else { 8 },
    })))
}

async fn list_item_inventory(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let store = db.read().await;
    if !store.items.iter().any(|i| i.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(
        store
            .pieces
            .iter()
            .filter(|p| p.item_id == id)
            .map(|p| store.piece_row(p))
            .collect(),
    ))
}

async fn get_inventory(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let piece = store
        .pieces
        .iter()
        .find(|p| p.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let mut row = store.piece_row(piece);
    row["active"] = json!(1);
    row["approved"] = json!(1);
    row["pre_receipt"] = json!(0);
    row["item"] = store
        .items
        .iter()
        .find(|i| i.id == piece.item_id)
        .map(|i| store.item_json(i))
        .unwrap_or(Value::Null);
    Ok(Json(row))
}

async fn list_transactions(
    State(db): State<Db>,
    Query(pairs): Query<Pairs>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let company: Option<i64> = number(&pairs, "company")?;
    let number_filter = first(&pairs, "transaction_number");
    let exact = matches!(first(&pairs, "transaction_number_exact"), Some("1" | "true"));

    let store = db.read().await;
    Ok(Json(
        store
            .transactions
            .iter()
            .filter(|t| company.is_none_or(|c| t.company_id == c))
            .filter(|t| match number_filter {
                Some(n) if exact => t.transaction_number == n,
                Some(n) => t.transaction_number.contains(n),
                None => true,
            })
            .map(|t| store.transaction_json(t))
            .collect(),
    ))
}

fn find_line(store: &mut Store, id: i64) -> Result<&mut TransactionItem, StatusCode> {
    store
        .transactions
        .iter_mut()
        .flat_map(|t| t.items.iter_mut())
        .find(|i| i.id == id)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn unallocate(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    find_line(&mut store, id)?.allocations.clear();
    Ok(StatusCode::NO_CONTENT)
}

async fn reallocate(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<BTreeMap<String, f64>>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let mut allocations = BTreeMap::new();
    for (piece_id, quantity) in input {
        let piece_id: i64 = piece_id.parse().map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
        if !store.pieces.iter().any(|p| p.id == piece_id) || quantity <= 0.0 {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
        allocations.insert(piece_id, quantity);
    }
    let line = find_line(&mut store, id)?;
    line.allocations = allocations;
    let total = line.allocations.values().fold(0.0, |total, q| total + q);
    Ok(Json(json!({"id": id, "allocated": total})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_has_one_trashed_item() {
        let store = Store::seeded();
        assert_eq!(store.items.iter().filter(|i| i.trashed).count(), 1);
    }

    #[test]
    fn item_json_nests_style_and_relations() {
        let store = Store::seeded();
        let json = store.item_json(&store.items[0]);
        assert_eq!(json["style"]["name"], "Belgian Linen");
        assert_eq!(json["style"]["product_category_code"]["name"], "Drapery");
        assert_eq!(json["style"]["primary_price"]["wholesale_price"], "42.50");
        assert_eq!(json["company"]["id"], 1);
        assert_eq!(json["line"]["id"], 10);
        assert!(json["deleted_at"].is_null());
    }

    #[test]
    fn piece_row_reports_allocations_across_transactions() {
        let store = Store::seeded();
        let row = store.piece_row(&store.pieces[0]);
        assert_eq!(row["on_hand"], "40.00");
        assert_eq!(row["allocated"], "4.00");
        assert_eq!(row["mill_piece"], "MP-778");
    }

    #[test]
    fn unallocated_piece_reports_zero() {
        let store = Store::seeded();
        assert_eq!(store.allocated(502), 0.0);
        assert!(store.allocated(502).is_sign_positive());
        assert_eq!(store.piece_row(&store.pieces[1])["allocated"], "0.00");
    }

    #[test]
    fn transaction_json_lists_allocated_pieces() {
        let store = Store::seeded();
        let json = store.transaction_json(&store.transactions[0]);
        let line = &json["items"][0];
        assert_eq!(line["allocated_pieces"][0]["piece_id"], 501);
        assert_eq!(line["allocated_pieces"][0]["piece"]["lot"], "L-44");
        assert_eq!(json["holds"][0]["hold"]["name"], "Credit");
    }

    #[test]
    fn item_update_requires_item_number() {
        let result: Result<ItemUpdate, _> = serde_json::from_str(r#"{"color_name":"Red"}"#);
        assert!(result.is_err());
    }
}
