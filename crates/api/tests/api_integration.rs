//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::{AppState, Collaborators, Config};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use checkout::InMemoryPaymentGateway;
use common::{CustomerId, Money};
use domain::StaticCouponRepository;
use event_store::InMemoryEventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::InMemoryNotifier;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Who a request is sent as.
#[derive(Clone, Copy)]
enum As {
    Guest,
    Customer(CustomerId),
    Admin,
}

struct TestApp {
    app: Router,
    state: Arc<AppState<InMemoryEventStore>>,
    notifier: Arc<InMemoryNotifier>,
    payments: Arc<InMemoryPaymentGateway>,
}

impl TestApp {
    async fn new() -> Self {
        Self::over(InMemoryEventStore::new()).await
    }

    /// An app over an existing store, as after a process restart.
    async fn over(store: InMemoryEventStore) -> Self {
        let notifier = Arc::new(InMemoryNotifier::new());
        let payments = Arc::new(InMemoryPaymentGateway::new());
        let state = AppState::new(
            store,
            Collaborators {
                notifier: notifier.clone(),
                payments: payments.clone(),
                coupons: Arc::new(StaticCouponRepository::default()),
                currency: "usd".to_string(),
            },
        )
        .await
        .unwrap();
        let state = Arc::new(state);
        let app = api::create_app(state.clone(), get_metrics_handle());
        Self {
            app,
            state,
            notifier,
            payments,
        }
    }

    async fn send(&self, who: As, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        builder = match who {
            As::Guest => builder,
            As::Customer(id) => builder.header("x-customer-id", id.to_string()),
            As::Admin => builder.header("x-role", "admin"),
        };
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn create_product(&self, name: &str, price: &str, stock: u32) -> String {
        let (status, json) = self
            .send(
                As::Admin,
                "POST",
                "/admin/products",
                Some(json!({
                    "name": name,
                    "price": price,
                    "images": [format!("https://cdn.example.com/{name}.jpg")],
                    "stock": stock,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().to_string()
    }

    async fn stock_of(&self, product_id: &str) -> u64 {
        let (_, json) = self
            .send(As::Guest, "GET", &format!("/products/{product_id}"), None)
            .await;
        json["stock"].as_u64().unwrap()
    }

    /// Places a guest order for one unit of a new product and returns its id.
    async fn guest_order(&self, price: &str) -> String {
        let product = self.create_product("poster", price, 5).await;
        let (status, json) = self
            .send(
                As::Guest,
                "POST",
                "/checkout",
                Some(json!({
                    "email": "guest@example.com",
                    "items": [{ "product_id": product, "quantity": 1 }],
                    "shipping_address": address(),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["order"]["id"].as_str().unwrap().to_string()
    }
}

fn address() -> Value {
    json!({
        "full_name": "Ada Lovelace",
        "line1": "12 St James's Square",
        "city": "London",
        "postal_code": "SW1Y 4JH",
        "country": "GB",
    })
}

fn money(value: &Value) -> Money {
    serde_json::from_value(value.clone()).unwrap()
}

fn amount(text: &str) -> Money {
    serde_json::from_value(json!(text)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let (status, json) = app.send(As::Guest, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint_renders_prometheus_text() {
    let app = TestApp::new().await;

    let response = app
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_catalog_writes_are_admin_only() {
    let app = TestApp::new().await;
    let body = json!({ "name": "mug", "price": "9.50", "stock": 3 });

    let (guest, _) = app
        .send(As::Guest, "POST", "/admin/products", Some(body.clone()))
        .await;
    let (customer, json) = app
        .send(As::Customer(CustomerId::new()), "POST", "/admin/products", Some(body))
        .await;

    assert_eq!(guest, StatusCode::FORBIDDEN);
    assert_eq!(customer, StatusCode::FORBIDDEN);
    assert!(json["error"].as_str().unwrap().contains("administrator"));
}

#[tokio::test]
async fn test_restock_and_deactivate_product() {
    let app = TestApp::new().await;
    let product = app.create_product("mug", "9.50", 3).await;

    let (status, json) = app
        .send(
            As::Admin,
            "POST",
            &format!("/admin/products/{product}/restock"),
            Some(json!({ "quantity": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stock"], 10);

    let (status, json) = app
        .send(
            As::Admin,
            "PATCH",
            &format!("/admin/products/{product}"),
            Some(json!({ "active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active"], false);

    let (status, _) = app
        .send(
            As::Customer(CustomerId::new()),
            "POST",
            "/cart/items",
            Some(json!({ "product_id": product, "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_checkout_scenario() {
    let app = TestApp::new().await;
    let customer = CustomerId::new();
    let shirt = app.create_product("shirt", "20.00", 10).await;
    let socks = app.create_product("socks", "15.00", 10).await;

    for (product, quantity) in [(&shirt, 2), (&socks, 1)] {
        let (status, json) = app
            .send(
                As::Customer(customer),
                "POST",
                "/cart/items",
                Some(json!({ "product_id": product, "quantity": quantity })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
    }
    let (status, cart) = app
        .send(
            As::Customer(customer),
            "POST",
            "/cart/coupon",
            Some(json!({ "code": "save10" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 3);
    assert_eq!(money(&cart["totals"]["subtotal"]), amount("55.00"));
    assert_eq!(money(&cart["totals"]["tax"]), amount("4.675"));
    assert_eq!(money(&cart["totals"]["shipping"]), Money::zero());
    assert_eq!(money(&cart["totals"]["discount"]), amount("5.50"));
    assert_eq!(money(&cart["totals"]["total"]), amount("54.175"));

    let (status, _) = app
        .send(
            As::Customer(customer),
            "PUT",
            "/cart/shipping-address",
            Some(address()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, receipt) = app
        .send(
            As::Customer(customer),
            "POST",
            "/checkout",
            Some(json!({ "email": "ada@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert!(receipt["client_secret"].as_str().unwrap().ends_with("_secret"));
    let order = &receipt["order"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment"]["status"], "authorized");
    assert_eq!(order["coupon"]["code"], "SAVE10");
    assert_eq!(order["order_number"].as_str().unwrap().len(), 9);
    assert_eq!(money(&order["totals"]["total"]), amount("54.175"));

    assert_eq!(app.stock_of(&shirt).await, 8);
    assert_eq!(app.stock_of(&socks).await, 9);
    assert_eq!(app.payments.intent_count(), 1);

    let (_, cart) = app.send(As::Customer(customer), "GET", "/cart", None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);

    let (status, listing) = app.send(As::Customer(customer), "GET", "/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["order_id"], order["id"]);

    app.state.processor.run_catch_up().await.unwrap();
    let sent = app.notifier.sent().await;
    assert!(sent.iter().any(|n| n.email == "ada@example.com"));
}

#[tokio::test]
async fn test_cart_item_edits() {
    let app = TestApp::new().await;
    let customer = CustomerId::new();
    let lamp = app.create_product("lamp", "30.00", 4).await;

    let (_, cart) = app
        .send(
            As::Customer(customer),
            "POST",
            "/cart/items",
            Some(json!({ "product_id": lamp, "quantity": 9 })),
        )
        .await;
    assert_eq!(cart["items"][0]["quantity"], 4);
    let item_id = cart["items"][0]["item_id"].as_str().unwrap().to_string();

    let (status, cart) = app
        .send(
            As::Customer(customer),
            "PATCH",
            &format!("/cart/items/{item_id}"),
            Some(json!({ "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 2);

    let (status, _) = app
        .send(
            As::Customer(customer),
            "DELETE",
            &format!("/cart/items/{item_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .send(
            As::Customer(customer),
            "DELETE",
            &format!("/cart/items/{item_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_guests_have_no_cart_or_listing() {
    let app = TestApp::new().await;

    let (cart, _) = app.send(As::Guest, "GET", "/cart", None).await;
    let (orders, _) = app.send(As::Guest, "GET", "/orders", None).await;

    assert_eq!(cart, StatusCode::FORBIDDEN);
    assert_eq!(orders, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_identity_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header("x-customer-id", "someone")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let app = TestApp::new().await;

    let (status, json) = app
        .send(
            As::Customer(CustomerId::new()),
            "POST",
            "/checkout",
            Some(json!({ "email": "ada@example.com", "shipping_address": address() })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_declined_payment_restores_stock() {
    let app = TestApp::new().await;
    app.payments.set_decline_authorizations(true);
    let product = app.create_product("kettle", "40.00", 3).await;

    let (status, _) = app
        .send(
            As::Guest,
            "POST",
            "/checkout",
            Some(json!({
                "email": "guest@example.com",
                "items": [{ "product_id": product, "quantity": 2 }],
                "shipping_address": address(),
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_of(&product).await, 3);
}

#[tokio::test]
async fn test_order_visibility() {
    let app = TestApp::new().await;
    let order_id = app.guest_order("12.00").await;
    let uri = format!("/orders/{order_id}");

    let (admin, json) = app.send(As::Admin, "GET", &uri, None).await;
    let (stranger, _) = app
        .send(As::Customer(CustomerId::new()), "GET", &uri, None)
        .await;
    let (missing, _) = app
        .send(
            As::Admin,
            "GET",
            "/orders/00000000-0000-4000-8000-000000000000",
            None,
        )
        .await;

    assert_eq!(admin, StatusCode::OK);
    assert_eq!(json["email"], "guest@example.com");
    assert_eq!(stranger, StatusCode::FORBIDDEN);
    assert_eq!(missing, StatusCode::NOT_FOUND);

    let (status, summary) = app
        .send(As::Admin, "GET", &format!("{uri}/summary"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_item_count"], 1);
    assert_eq!(summary["status"], "pending");
}

#[tokio::test]
async fn test_status_changes_follow_the_lifecycle() {
    let app = TestApp::new().await;
    let order_id = app.guest_order("25.00").await;
    let uri = format!("/admin/orders/{order_id}/status");

    let (status, json) = app
        .send(As::Admin, "PATCH", &uri, Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "shipped");
    assert!(json["estimated_delivery"].is_string());

    let (backwards, _) = app
        .send(As::Admin, "PATCH", &uri, Some(json!({ "status": "pending" })))
        .await;
    let (unknown, _) = app
        .send(As::Admin, "PATCH", &uri, Some(json!({ "status": "lost" })))
        .await;
    let (customer, _) = app
        .send(
            As::Customer(CustomerId::new()),
            "PATCH",
            &uri,
            Some(json!({ "status": "delivered" })),
        )
        .await;
    let (customer_unknown, _) = app
        .send(
            As::Customer(CustomerId::new()),
            "PATCH",
            &uri,
            Some(json!({ "status": "lost" })),
        )
        .await;

    assert_eq!(backwards, StatusCode::CONFLICT);
    assert_eq!(unknown, StatusCode::BAD_REQUEST);
    assert_eq!(customer, StatusCode::FORBIDDEN);
    assert_eq!(customer_unknown, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_customer_cancels_and_stock_returns() {
    let app = TestApp::new().await;
    let customer = CustomerId::new();
    let product = app.create_product("chair", "60.00", 2).await;
    app.send(
        As::Customer(customer),
        "POST",
        "/cart/items",
        Some(json!({ "product_id": product, "quantity": 2 })),
    )
    .await;
    let (_, receipt) = app
        .send(
            As::Customer(customer),
            "POST",
            "/checkout",
            Some(json!({ "email": "ada@example.com", "shipping_address": address() })),
        )
        .await;
    let order_id = receipt["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.stock_of(&product).await, 0);

    let (status, json) = app
        .send(
            As::Customer(customer),
            "POST",
            &format!("/orders/{order_id}/cancel"),
            Some(json!({ "reason": "changed my mind" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "cancelled");
    assert_eq!(app.stock_of(&product).await, 2);

    let (again, _) = app
        .send(
            As::Customer(customer),
            "POST",
            &format!("/orders/{order_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(again, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_refund_flow_pays_out_on_approval() {
    let app = TestApp::new().await;
    let customer = CustomerId::new();
    let product = app.create_product("desk", "80.00", 1).await;
    app.send(
        As::Customer(customer),
        "POST",
        "/cart/items",
        Some(json!({ "product_id": product, "quantity": 1 })),
    )
    .await;
    let (_, receipt) = app
        .send(
            As::Customer(customer),
            "POST",
            "/checkout",
            Some(json!({ "email": "ada@example.com", "shipping_address": address() })),
        )
        .await;
    let order_id = receipt["order"]["id"].as_str().unwrap().to_string();
    let intent_id = receipt["order"]["payment"]["intent_id"]
        .as_str()
        .unwrap()
        .to_string();
    let refund_uri = format!("/orders/{order_id}/refund");

    let (too_early, _) = app
        .send(
            As::Customer(customer),
            "POST",
            &refund_uri,
            Some(json!({ "reason": "scratched" })),
        )
        .await;
    assert_eq!(too_early, StatusCode::CONFLICT);

    app.send(
        As::Admin,
        "PATCH",
        &format!("/admin/orders/{order_id}/status"),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    let (status, json) = app
        .send(
            As::Customer(customer),
            "POST",
            &refund_uri,
            Some(json!({ "reason": "scratched" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["refund"]["status"], "pending");

    let (twice, _) = app
        .send(
            As::Customer(customer),
            "POST",
            &refund_uri,
            Some(json!({ "reason": "scratched" })),
        )
        .await;
    assert_eq!(twice, StatusCode::CONFLICT);

    let (status, dashboard) = app.send(As::Admin, "GET", "/admin/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["pending_refunds"], 1);

    let (status, json) = app
        .send(
            As::Admin,
            "POST",
            &format!("/admin/orders/{order_id}/refund/approve"),
            Some(json!({ "note": "approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["status"], "refunded");
    assert_eq!(json["refund"]["status"], "completed");
    assert_eq!(json["payment"]["status"], "refunded");
    assert_eq!(app.payments.refunded(&intent_id), money(&json["totals"]["total"]));
}

#[tokio::test]
async fn test_refund_rejection_keeps_the_order() {
    let app = TestApp::new().await;
    let order_id = app.guest_order("10.00").await;
    app.send(
        As::Admin,
        "PATCH",
        &format!("/admin/orders/{order_id}/status"),
        Some(json!({ "status": "shipped" })),
    )
    .await;

    let (no_refund, _) = app
        .send(
            As::Admin,
            "POST",
            &format!("/admin/orders/{order_id}/refund/reject"),
            None,
        )
        .await;

    assert_eq!(no_refund, StatusCode::CONFLICT);
    let (_, json) = app
        .send(As::Admin, "GET", &format!("/orders/{order_id}"), None)
        .await;
    assert_eq!(json["status"], "shipped");
}

#[tokio::test]
async fn test_payment_webhook_records_status_only() {
    let app = TestApp::new().await;
    let order_id = app.guest_order("19.99").await;

    let (status, json) = app
        .send(
            As::Guest,
            "POST",
            "/payments/webhook",
            Some(json!({
                "intent_id": "pi_000001",
                "order_id": order_id,
                "status": "succeeded",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["received"], true);

    let (_, order) = app
        .send(As::Admin, "GET", &format!("/orders/{order_id}"), None)
        .await;
    assert_eq!(order["payment"]["status"], "succeeded");
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn test_discarded_order_disappears() {
    let app = TestApp::new().await;
    let customer = CustomerId::new();
    let product = app.create_product("vase", "22.00", 3).await;
    app.send(
        As::Customer(customer),
        "POST",
        "/cart/items",
        Some(json!({ "product_id": product, "quantity": 1 })),
    )
    .await;
    let (_, receipt) = app
        .send(
            As::Customer(customer),
            "POST",
            "/checkout",
            Some(json!({ "email": "ada@example.com", "shipping_address": address() })),
        )
        .await;
    let order_id = receipt["order"]["id"].as_str().unwrap().to_string();
    let uri = format!("/orders/{order_id}");

    let (by_admin, _) = app.send(As::Admin, "DELETE", &uri, None).await;
    assert_eq!(by_admin, StatusCode::FORBIDDEN);

    let (status, body) = app.send(As::Customer(customer), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.send(As::Customer(customer), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listing) = app.send(As::Customer(customer), "GET", "/orders", None).await;
    assert!(listing.as_array().unwrap().is_empty());
    assert_eq!(app.stock_of(&product).await, 3);
}

#[tokio::test]
async fn test_dashboard_counts_orders_by_status() {
    let app = TestApp::new().await;
    let first = app.guest_order("30.00").await;
    app.guest_order("30.00").await;
    app.send(
        As::Admin,
        "POST",
        &format!("/orders/{first}/cancel"),
        None,
    )
    .await;

    let (forbidden, _) = app
        .send(As::Customer(CustomerId::new()), "GET", "/admin/dashboard", None)
        .await;
    let (status, json) = app.send(As::Admin, "GET", "/admin/dashboard", None).await;

    assert_eq!(forbidden, StatusCode::FORBIDDEN);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_orders"], 2);
    assert_eq!(json["orders_by_status"]["pending"], 1);
    assert_eq!(json["orders_by_status"]["cancelled"], 1);
    assert_eq!(json["orders_by_status"]["delivered"], 0);
    assert_eq!(json["pending_refunds"], 0);
}

#[tokio::test]
async fn test_default_state_registers_views_and_reactions() {
    let config = Config {
        currency: "eur".to_string(),
        ..Config::default()
    };
    let state = api::create_default_state(InMemoryEventStore::new(), &config)
        .await
        .unwrap();
    assert_eq!(state.processor.projection_count(), 4);

    let response = api::create_app(state, get_metrics_handle())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_restart_does_not_resend_notifications() {
    let store = InMemoryEventStore::new();
    let before = TestApp::over(store.clone()).await;
    let order_id = before.guest_order("25.00").await;
    before.state.processor.run_catch_up().await.unwrap();
    assert_eq!(before.notifier.sent().await.len(), 1);

    let after = TestApp::over(store).await;
    after.state.processor.run_catch_up().await.unwrap();
    assert!(after.notifier.sent().await.is_empty());

    // Recipients of earlier orders are still known after the restart.
    let (status, _) = after
        .send(
            As::Admin,
            "PATCH",
            &format!("/admin/orders/{order_id}/status"),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    after.state.processor.run_catch_up().await.unwrap();

    let sent = after.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "guest@example.com");
    assert_eq!(before.notifier.sent().await.len(), 1);
}

#[tokio::test]
async fn test_order_lookup_with_another_stream_id_is_not_found() {
    let app = TestApp::new().await;
    let product = app.create_product("vase", "18.00", 2).await;

    let (status, json) = app
        .send(As::Admin, "GET", &format!("/orders/{product}"), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}
