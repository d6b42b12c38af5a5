//! End-to-end flows against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port (so store mutations
//! never leak between tests), then drives the repositories over real HTTP
//! through `UreqTransport`.

use webdist_core::{
    Allocation, ApiError, ClientConfig, Company, FreightRequest, IterateOptions, UreqTransport,
    WdClient,
};

fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client() -> WdClient<UreqTransport> {
    let config = ClientConfig::new(&spawn_server(), "integration-token");
    WdClient::from_config(&config).unwrap()
}

fn acme() -> Company {
    Company::new(1)
}

#[test]
fn iterate_walks_every_page_in_order() {
    let client = client();
    let options = IterateOptions {
        per_page: 2,
        ..IterateOptions::default()
    };
    let mut seen = Vec::new();
    client
        .products()
        .iterate(&acme(), &options, |product| {
            seen.push(product.item_number);
            Ok::<_, ApiError>(())
        })
        .unwrap();
    assert_eq!(seen, ["1001-01", "1001-02", "2040-07"]);
}

#[test]
fn iterate_by_line_ignores_company() {
    let client = client();
    let options = IterateOptions {
        line_id: Some(20),
        ..IterateOptions::default()
    };
    let mut seen = Vec::new();
    client
        .products()
        .iterate(&acme(), &options, |product| {
            seen.push((product.item_number, product.company.map(|c| c.id)));
            Ok::<_, ApiError>(())
        })
        .unwrap();
    assert_eq!(seen, [("9000-01".to_string(), Some(2))]);
}

#[test]
fn iterate_stops_when_callback_fails() {
    let client = client();
    let mut calls = 0;
    let err = client
        .products()
        .iterate(&acme(), &IterateOptions::default(), |_| {
            calls += 1;
            Err(ApiError::Response("stop".to_string()))
        })
        .unwrap_err();
    assert_eq!(calls, 1);
    assert!(matches!(err, ApiError::Response(ref m) if m == "stop"));
}

#[test]
fn find_includes_trashed_and_reports_missing() {
    let client = client();
    let products = client.products();

    let trashed = products.find(&acme(), "2040-09").unwrap();
    assert_eq!(trashed.id, 1004);
    assert_eq!(trashed.style_name, "Harbor Stripe");
    assert_eq!(trashed.category, "Upholstery");
    assert_eq!(trashed.price, Some(28.0));

    let err = products.find(&acme(), "nope").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    let err = products.find_by_id(42).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn update_writes_style_and_item_then_refetches() {
    let client = client();
    let products = client.products();

    let mut product = products.find_by_id(1002).unwrap();
    assert_eq!(product.color_name.as_deref(), Some("Flax"));
    product.color_name = Some("Oat".to_string());
    product.style_name = "Belgian Linen Washed".to_string();
    product.warehouse_location_sample = Some("S-1".to_string());
    // Not sent by `update`; the re-read must restore the server's values.
    product.category = "Local only".to_string();
    product.price = None;

    let updated = products.update(&product).unwrap();
    assert_eq!(updated.id, 1002);
    assert_eq!(updated.color_name.as_deref(), Some("Oat"));
    assert_eq!(updated.style_name, "Belgian Linen Washed");
    assert_eq!(updated.warehouse_location_sample.as_deref(), Some("S-1"));
    assert_eq!(updated.category, "Drapery");
    assert_eq!(updated.price, Some(42.5));

    // Style is shared, so the sibling item sees the new name.
    let sibling = products.find_by_id(1001).unwrap();
    assert_eq!(sibling.style_name, "Belgian Linen Washed");
}

#[test]
fn freight_quote_round_trip() {
    let client = client();
    let products = client.products();
    let product = products.find_by_id(1001).unwrap();

    let quote = products
        .freight(&product, &FreightRequest::new("30303", 10.0, "US"))
        .unwrap();
    assert_eq!(quote.rate, 19.5);
    assert_eq!(quote.carrier.as_deref(), Some("UPS"));
    assert_eq!(quote.transit_days, Some(3));

    let err = products
        .freight(&product, &FreightRequest::new("", 10.0, "US"))
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
fn inventory_lookups() {
    let client = client();
    let product = client.products().find_by_id(1001).unwrap();

    let pieces = client.inventory().list_by_product(&product).unwrap();
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].quantity_available, 36.0);
    assert_eq!(pieces[0].vendor_piece.as_deref(), Some("MP-778"));
    assert!(!pieces[0].seconds);
    assert!(pieces[1].seconds);
    assert_eq!(pieces[1].comment.as_deref(), Some("slub at 3yd"));
    assert!(pieces.iter().all(|p| p.style_name == "Belgian Linen" && p.active));

    let piece = client.inventory().find_by_id(503).unwrap();
    assert_eq!(piece.item_number, "2040-07");
    assert_eq!(piece.style_name, "Harbor Stripe");
    assert_eq!(piece.quantity_available, 30.0);

    let err = client.inventory().find_by_id(1).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Inventory with id 1 not found"));
}

#[test]
fn allocation_lifecycle() {
    let client = client();
    let transactions = client.transactions();

    // Step 1: look up the open transaction.
    let transaction = transactions
        .find_by_transaction_number(&acme(), "70001")
        .unwrap();
    assert!(transaction.is_on_hold());
    assert_eq!(transaction.ship_to_state.as_deref(), Some("GA"));
    assert_eq!(transaction.rep.as_deref(), Some("Dana Rep"));
    let item = &transaction.items[0];
    assert_eq!(item.item_number.as_deref(), Some("1001-01"));
    assert_eq!(item.allocations[0].inventory_id, 501);
    assert_eq!(item.allocations[0].warehouse.as_deref(), Some("Main"));

    // Step 2: move the allocation to another piece.
    transactions
        .allocate(item, &[Allocation::new(502, 1.0), Allocation::new(502, 2.5)])
        .unwrap();
    let reloaded = transactions
        .find_by_transaction_number(&acme(), "70001")
        .unwrap();
    let allocations = &reloaded.items[0].allocations;
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].inventory_id, 502);
    assert_eq!(allocations[0].quantity, 2.5);

    let product = client.products().find_by_id(1001).unwrap();
    let pieces = client.inventory().list_by_product(&product).unwrap();
    assert_eq!(pieces[0].quantity_available, 40.0);
    assert_eq!(pieces[1].quantity_available, 10.0);

    // Step 3: allocate the ordered quantity from a single piece.
    transactions.allocate_single(item, &pieces[0]).unwrap();
    let reloaded = transactions
        .find_by_transaction_number(&acme(), "70001")
        .unwrap();
    assert_eq!(reloaded.items[0].allocated_quantity(), 10.0);

    // Step 4: release everything.
    transactions.unallocate(&reloaded.items[0]).unwrap();
    let reloaded = transactions
        .find_by_transaction_number(&acme(), "70001")
        .unwrap();
    assert!(reloaded.items[0].allocations.is_empty());

    // Step 5: unknown numbers and lines.
    let err = transactions
        .find_by_transaction_number(&acme(), "7000")
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    let err = transactions.unallocate(1_i64).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
}
