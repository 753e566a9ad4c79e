//! End-to-end storefront flows against an in-memory catalog source, an
//! in-memory cart mirror, and a bridge that records what the host was asked
//! to do.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use minishop_core::{CartEntry, CheckoutMode, PriceFormat, Product, ProductId, UserId, UserIdentity};
use minishop_sheets::{SheetClient, SheetError};
use minishop_store::view::{CartBody, CatalogGrid};
use minishop_store::{
    BridgeError, CartChange, CatalogSource, HostBridge, MemoryCartMirror, ReloadOutcome,
    StoreError, Storefront, StorefrontSettings, ViewSettings,
};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Hands out queued catalog responses; repeats the last one when drained.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<Product>, SheetError>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Vec<Product>, SheetError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    fn serving(products: Vec<Product>) -> Self {
        Self::new(vec![Ok(products)])
    }
}

impl CatalogSource for ScriptedSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, SheetError> {
        let mut queue = self.responses.lock().unwrap();
        let next = queue
            .pop_front()
            .unwrap_or_else(|| Err(SheetError::Rejected("script drained".into())));
        if queue.is_empty() {
            if let Ok(products) = &next {
                queue.push_back(Ok(products.clone()));
            }
        }
        next
    }
}

#[derive(Default)]
struct RecordingBridge {
    alerts: Mutex<Vec<String>>,
    links: Mutex<Vec<String>>,
    clipboard: Mutex<Vec<String>>,
    clipboard_broken: bool,
}

impl RecordingBridge {
    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    fn links(&self) -> Vec<String> {
        self.links.lock().unwrap().clone()
    }

    fn clipboard(&self) -> Vec<String> {
        self.clipboard.lock().unwrap().clone()
    }
}

impl HostBridge for RecordingBridge {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_owned());
    }

    fn open_link(&self, url: &str) -> Result<(), BridgeError> {
        self.links.lock().unwrap().push(url.to_owned());
        Ok(())
    }

    fn write_clipboard(&self, text: &str) -> Result<(), BridgeError> {
        if self.clipboard_broken {
            return Err(BridgeError("clipboard unavailable".into()));
        }
        self.clipboard.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

fn product(id: i64, name: &str, price: i64) -> Product {
    Product {
        id: ProductId::Int(id),
        name: name.to_owned(),
        concentration: "Eau de Parfum".to_owned(),
        volume: "50 ml".to_owned(),
        price: Decimal::from(price),
        image_url: None,
    }
}

fn settings(mode: CheckoutMode) -> StorefrontSettings {
    StorefrontSettings {
        view: ViewSettings {
            price: PriceFormat::default(),
            placeholder_image_url: "placeholder.png".to_owned(),
        },
        manager_username: "@perfume_desk".to_owned(),
        checkout_mode: mode,
        share_origin: Some("https://shop.example.com".to_owned()),
    }
}

fn customer(id: &str) -> UserIdentity {
    UserIdentity {
        id: UserId::new(id),
        first_name: Some("Anna".into()),
        last_name: Some("K".into()),
        username: Some("anna_k".into()),
    }
}

fn storefront(
    source: ScriptedSource,
    mirror: Arc<MemoryCartMirror>,
    identity: UserIdentity,
) -> Storefront<ScriptedSource, MemoryCartMirror> {
    Storefront::new(source, mirror, identity, settings(CheckoutMode::StartParameter))
}

fn visible_ids<S: CatalogSource, M: minishop_store::CartMirror>(shop: &Storefront<S, M>) -> Vec<ProductId> {
    shop.catalog().visible().map(|p| p.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_loads_catalog_and_stored_cart() {
    let user = UserId::new("100").unwrap();
    let mirror = Arc::new(
        MemoryCartMirror::new().with_cart(user, vec![CartEntry::new(2, 3)]),
    );
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300), product(2, "Iris", 100)]),
        mirror,
        customer("100"),
    );
    let bridge = RecordingBridge::default();

    assert!(shop.start(&bridge).await);
    assert_eq!(shop.catalog().len(), 2);
    assert_eq!(shop.cart().entries(), &[CartEntry::new(2, 3)]);
    assert_eq!(shop.frame().cart.item_count, 3);
    assert!(bridge.alerts().is_empty());
}

#[tokio::test]
async fn failed_catalog_fetch_keeps_last_good_catalog_and_alerts() {
    let mut shop = storefront(
        ScriptedSource::new(vec![
            Ok(vec![product(1, "Rose", 300)]),
            Err(SheetError::Rejected("quota exceeded".into())),
        ]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    let bridge = RecordingBridge::default();

    assert!(shop.start(&bridge).await);
    assert!(!shop.start(&bridge).await);

    assert_eq!(shop.catalog().len(), 1);
    let alerts = bridge.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("catalog"), "{alerts:?}");
}

#[tokio::test]
async fn search_then_clear_restores_full_sorted_catalog() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![
            product(1, "Rose Noir", 300),
            product(2, "Iris", 100),
            product(3, "Rose Blanche", 200),
        ]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    shop.load_catalog().await.unwrap();
    assert_eq!(
        visible_ids(&shop),
        vec![ProductId::Int(2), ProductId::Int(3), ProductId::Int(1)]
    );

    shop.set_search("rose");
    assert_eq!(visible_ids(&shop), vec![ProductId::Int(3), ProductId::Int(1)]);

    shop.toggle_sort();
    assert_eq!(visible_ids(&shop), vec![ProductId::Int(1), ProductId::Int(3)]);
    assert_eq!(shop.frame().sort_label, "By price ↓");

    shop.set_search("");
    assert_eq!(
        visible_ids(&shop),
        vec![ProductId::Int(1), ProductId::Int(3), ProductId::Int(2)]
    );

    shop.set_search("oud");
    assert_eq!(shop.frame().catalog, CatalogGrid::NoMatches);
}

// ---------------------------------------------------------------------------
// Modal and cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn modal_commit_adds_pending_quantity_and_closes() {
    let user = UserId::new("7").unwrap();
    let mirror = Arc::new(MemoryCartMirror::new());
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::clone(&mirror),
        customer("7"),
    );
    let bridge = RecordingBridge::default();
    shop.start(&bridge).await;

    shop.open_product(&ProductId::Int(1)).unwrap();
    assert_eq!(shop.increase_pending().unwrap(), 2);
    assert_eq!(shop.increase_pending().unwrap(), 3);
    assert_eq!(shop.decrease_pending().unwrap(), 2);
    assert_eq!(shop.frame().modal.unwrap().pending, 2);

    assert_eq!(shop.commit_modal(&bridge).unwrap(), CartChange::Added);
    assert!(shop.modal().is_none());
    assert_eq!(shop.cart().quantity_of(&ProductId::Int(1)), Some(2));
    assert_eq!(bridge.alerts(), vec!["Added to cart: Rose".to_owned()]);

    shop.flush().await;
    assert_eq!(mirror.stored(&user).unwrap(), vec![CartEntry::new(1, 2)]);
}

#[tokio::test]
async fn modal_operations_need_an_open_known_product() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    shop.load_catalog().await.unwrap();
    let bridge = RecordingBridge::default();

    assert!(matches!(
        shop.open_product(&ProductId::Int(9)),
        Err(StoreError::UnknownProduct(ProductId::Int(9)))
    ));
    assert!(matches!(shop.increase_pending(), Err(StoreError::NoOpenProduct)));
    assert!(matches!(shop.commit_modal(&bridge), Err(StoreError::NoOpenProduct)));

    shop.open_product(&ProductId::Int(1)).unwrap();
    shop.close_modal();
    assert!(shop.frame().modal.is_none());
}

#[tokio::test]
async fn large_negative_adjustment_removes_the_line() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    shop.add_to_cart(ProductId::Int(1), 4).unwrap();
    assert_eq!(shop.adjust_quantity(&ProductId::Int(1), -99), CartChange::Removed);
    assert!(shop.cart().is_empty());
    assert_eq!(shop.frame().cart.body, CartBody::Empty);
}

#[tokio::test]
async fn total_item_count_is_sum_of_quantities() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    for (id, n) in [(1, 2), (2, 5), (3, 1)] {
        shop.add_to_cart(ProductId::Int(id), n).unwrap();
    }
    shop.add_to_cart(ProductId::Int(2), 1).unwrap();
    assert_eq!(shop.cart().total_item_count(), 9);
}

#[tokio::test]
async fn reload_persist_reload_leaves_cart_unchanged() {
    let user = UserId::new("55").unwrap();
    let stored = vec![CartEntry::new(2, 1), CartEntry::new(1, 4)];
    let mirror = Arc::new(MemoryCartMirror::new().with_cart(user.clone(), stored.clone()));
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300), product(2, "Iris", 100)]),
        Arc::clone(&mirror),
        customer("55"),
    );

    shop.load_cart().await.unwrap();
    shop.add_to_cart(ProductId::Int(1), 1).unwrap();
    shop.adjust_quantity(&ProductId::Int(1), -1);
    shop.flush().await;
    let outcome = shop.load_cart().await.unwrap();

    assert_eq!(outcome, ReloadOutcome::Loaded { entries: 2 });
    assert_eq!(shop.cart().entries(), stored.as_slice());
    assert_eq!(mirror.stored(&user).unwrap(), stored);
}

#[tokio::test]
async fn stale_cart_reference_is_dropped_after_catalog_replace() {
    let mut shop = storefront(
        ScriptedSource::new(vec![
            Ok(vec![product(1, "Rose", 300), product(2, "Iris", 50)]),
            Ok(vec![product(2, "Iris", 50)]),
        ]),
        Arc::new(MemoryCartMirror::new()),
        customer("1"),
    );
    shop.load_catalog().await.unwrap();
    shop.add_to_cart(ProductId::Int(1), 2).unwrap();
    shop.add_to_cart(ProductId::Int(2), 1).unwrap();

    shop.load_catalog().await.unwrap();

    assert_eq!(shop.cart().entries().len(), 2, "catalog replace never edits the cart");
    let order = shop.compose_order(chrono::Utc::now()).unwrap();
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].product.id, ProductId::Int(2));
    assert_eq!(order.grand_total, Decimal::from(50));

    let CartBody::Lines { lines, subtotal, .. } = shop.frame().cart.body else {
        panic!("expected cart lines");
    };
    assert_eq!(lines.len(), 1);
    assert_eq!(subtotal, Decimal::from(50));
}

#[tokio::test]
async fn every_state_change_triggers_a_render() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    let mut rx = shop.signal().subscribe();

    shop.load_catalog().await.unwrap();
    assert!(rx.has_changed().unwrap());
    rx.mark_unchanged();

    shop.remove_from_cart(&ProductId::Int(1));
    assert!(!rx.has_changed().unwrap(), "no-op remove must not re-render");

    shop.add_to_cart(ProductId::Int(1), 1).unwrap();
    assert!(rx.has_changed().unwrap());
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn copy_order_writes_rendered_text() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 1500)]),
        Arc::new(MemoryCartMirror::new()),
        customer("3"),
    );
    shop.load_catalog().await.unwrap();
    shop.add_to_cart(ProductId::Int(1), 2).unwrap();
    let bridge = RecordingBridge::default();

    let order = shop.copy_order(&bridge).unwrap();
    let copied = bridge.clipboard();
    assert_eq!(copied.len(), 1);
    assert!(copied[0].starts_with(&format!("ORDER #{}\n\n", order.number)));
    assert!(copied[0].contains("TOTAL: 3\u{a0}000 ₽"));
    assert_eq!(bridge.alerts(), vec!["Order copied!".to_owned()]);
}

#[tokio::test]
async fn copy_failures_are_reported() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 1500)]),
        Arc::new(MemoryCartMirror::new()),
        customer("3"),
    );
    shop.load_catalog().await.unwrap();
    let bridge = RecordingBridge {
        clipboard_broken: true,
        ..RecordingBridge::default()
    };

    assert!(matches!(shop.copy_order(&bridge), Err(StoreError::EmptyCart)));
    assert!(matches!(
        shop.copy_product(&ProductId::Int(1), &bridge),
        Err(StoreError::Bridge(_))
    ));
    assert_eq!(
        bridge.alerts(),
        vec!["Your cart is empty!".to_owned(), "Copy failed".to_owned()]
    );
}

#[tokio::test]
async fn copy_product_includes_share_link() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(4, "Ambre", 900)]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    shop.load_catalog().await.unwrap();
    let bridge = RecordingBridge::default();

    let text = shop.copy_product(&ProductId::Int(4), &bridge).unwrap();
    assert!(text.starts_with("Ambre\n"));
    assert!(text.ends_with("Link: https://shop.example.com?product=4"));
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_cart_checkout_opens_no_link() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::new(MemoryCartMirror::new()),
        customer("10"),
    );
    shop.load_catalog().await.unwrap();
    let bridge = RecordingBridge::default();

    assert!(matches!(shop.checkout(&bridge), Err(StoreError::EmptyCart)));
    assert!(bridge.links().is_empty());
    assert_eq!(bridge.alerts(), vec!["Add items to the cart first!".to_owned()]);
}

#[tokio::test]
async fn anonymous_checkout_is_refused() {
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::new(MemoryCartMirror::new()),
        UserIdentity::anonymous(),
    );
    shop.load_catalog().await.unwrap();
    shop.add_to_cart(ProductId::Int(1), 1).unwrap();
    let bridge = RecordingBridge::default();

    assert!(matches!(shop.checkout(&bridge), Err(StoreError::Anonymous)));
    assert!(bridge.links().is_empty());
}

#[tokio::test]
async fn checkout_persists_and_opens_start_link() {
    let user = UserId::new("123456").unwrap();
    let mirror = Arc::new(MemoryCartMirror::new());
    let mut shop = storefront(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::clone(&mirror),
        customer("123456"),
    );
    shop.load_catalog().await.unwrap();
    shop.add_to_cart(ProductId::Int(1), 1).unwrap();
    let bridge = RecordingBridge::default();

    let checkout = shop.checkout(&bridge).unwrap();
    assert_eq!(checkout.url, "https://t.me/perfume_desk?start=123456");
    assert_eq!(bridge.links(), vec![checkout.url.clone()]);
    assert_eq!(checkout.order.grand_total, Decimal::from(300));

    shop.flush().await;
    assert_eq!(mirror.save_count(), 2);
    assert_eq!(mirror.stored(&user).unwrap(), vec![CartEntry::new(1, 1)]);
}

#[tokio::test]
async fn prefilled_checkout_carries_order_text() {
    let mut shop = Storefront::new(
        ScriptedSource::serving(vec![product(1, "Rose", 300)]),
        Arc::new(MemoryCartMirror::new()),
        customer("9"),
        settings(CheckoutMode::PrefilledMessage),
    );
    shop.load_catalog().await.unwrap();
    shop.add_to_cart(ProductId::Int(1), 1).unwrap();
    let bridge = RecordingBridge::default();

    let checkout = shop.checkout(&bridge).unwrap();
    let expected_prefix = format!(
        "https://t.me/perfume_desk?text=ORDER%20%23{}%0A%0ARose%0A",
        checkout.order.number
    );
    assert!(checkout.url.starts_with(&expected_prefix), "{}", checkout.url);
    assert!(checkout.url.ends_with("Telegram%3A%20%40anna_k"));
}

// ---------------------------------------------------------------------------
// Sheet-backed session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sheet_cart_failure_recovers_to_empty_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("sheet", "Products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 1, "name": "Rose", "price": 300}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("sheet", "Carts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = SheetClient::new(&format!("{}/exec", server.uri()), 5, "minishop-test/0.1").unwrap();
    let mut shop = Storefront::new(
        client.clone(),
        Arc::new(client),
        customer("77"),
        settings(CheckoutMode::StartParameter),
    );

    shop.add_to_cart(ProductId::Int(1), 1).unwrap();
    let bridge = RecordingBridge::default();
    assert!(shop.start(&bridge).await);
    assert!(shop.cart().is_empty());
    assert!(bridge.alerts().is_empty(), "cart load failures stay silent");

    let outcome = shop.load_cart().await.unwrap();
    assert_eq!(outcome, ReloadOutcome::RecoveredEmpty);
}
