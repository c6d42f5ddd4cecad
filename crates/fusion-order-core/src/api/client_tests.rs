use super::*;
use crate::api::DEFAULT_FAILURE_MESSAGE;
use crate::auth::MemoryCredentialStore;
use crate::models::{OrderQuery, OrderStatus, OrderSubmission, ProductQuery};
use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Recorded {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

async fn record(State(recorded): State<Recorded>, request: Request, next: Next) -> Response {
    let auth = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    recorded.auth_headers.lock().unwrap().push(auth);
    recorded
        .queries
        .lock()
        .unwrap()
        .push(request.uri().query().unwrap_or_default().to_string());
    next.run(request).await
}

fn envelope(code: i64, message: &str, data: Value) -> Json<Value> {
    Json(json!({
        "code": code,
        "message": message,
        "data": data,
        "timestamp": "2024-05-01T10:00:00"
    }))
}

fn sample_product(id: i64, name: &str, category: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": category,
        "price": 12.5,
        "description": null,
        "imageUrl": null,
        "available": true,
        "createdAt": "2024-03-18T09:15:30"
    })
}

fn sample_order(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "productId": 3,
        "productName": "Steel Bracket",
        "quantity": 10,
        "contactName": "Li Wei",
        "contactPhone": "13800000000",
        "contactEmail": null,
        "requirements": null,
        "status": status,
        "createdAt": "2024-04-02T16:20:00"
    })
}

async fn update_status(
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    if !body.is_empty() {
        let rejection = envelope(400, "unexpected body", Value::Null);
        return (StatusCode::BAD_REQUEST, rejection).into_response();
    }
    let status = params.get("status").cloned().unwrap_or_default();
    envelope(200, "status updated", sample_order(42, &status)).into_response()
}

async fn update_user(Json(update): Json<Value>) -> Json<Value> {
    let mut user = json!({
        "id": 5,
        "username": "bob",
        "email": null,
        "phone": null,
        "role": "USER",
        "enabled": true
    });
    if let (Some(user), Some(update)) = (user.as_object_mut(), update.as_object()) {
        for (key, value) in update {
            user.insert(key.clone(), value.clone());
        }
    }
    envelope(200, "updated", user)
}

async fn spawn_server() -> (String, Recorded) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let recorded = Recorded::default();

    let api = Router::new()
        .route(
            "/widget",
            get(|| async { envelope(200, "ok", json!({"id": 1, "name": "Widget"})) }),
        )
        .route("/raw", get(|| async { Json(json!({"id": 7, "name": "Bolt"})) }))
        .route(
            "/orders",
            post(|| async { envelope(400, "invalid quantity", Value::Null) }),
        )
        .route(
            "/strict/orders",
            post(|| async {
                (StatusCode::BAD_REQUEST, envelope(400, "invalid quantity", Value::Null))
            }),
        )
        .route(
            "/expired",
            get(|| async {
                (StatusCode::UNAUTHORIZED, envelope(401, "token expired", Value::Null))
            }),
        )
        .route("/plain-401", get(|| async { StatusCode::UNAUTHORIZED }))
        .route(
            "/forbidden",
            get(|| async { (StatusCode::FORBIDDEN, envelope(403, "", Value::Null)) }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        )
        .route(
            "/soft-401",
            get(|| async { envelope(401, "please log in", Value::Null) }),
        )
        .route(
            "/auth/login",
            post(|| async {
                envelope(
                    200,
                    "login ok",
                    json!({"token": "jwt-abc", "username": "alice", "role": "ADMIN"}),
                )
            }),
        )
        .route(
            "/products",
            get(|| async {
                envelope(
                    200,
                    "success",
                    json!([
                        sample_product(1, "Steel Bracket", "Hardware"),
                        sample_product(2, "Copper Wire", "Wiring")
                    ]),
                )
            }),
        )
        .route(
            "/products/9",
            delete(|| async { envelope(200, "deleted", Value::Null) }),
        )
        .route(
            "/admin/orders",
            get(|| async { envelope(200, "success", json!([sample_order(42, "PENDING")])) }),
        )
        .route("/orders/42/status", put(update_status))
        .route("/admin/users/5", put(update_user));

    let app = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(recorded.clone(), record));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), recorded)
}

fn client_with(base_url: &str, store: Arc<MemoryCredentialStore>) -> ApiClient {
    ApiClient::new(base_url, store).expect("client")
}

#[tokio::test]
async fn success_envelope_resolves_to_data() {
    let (base_url, _) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::new()));

    let data: Value = client.get("/widget").await.expect("widget");
    assert_eq!(data, json!({"id": 1, "name": "Widget"}));
}

#[tokio::test]
async fn raw_payload_is_returned_unchanged() {
    let (base_url, _) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::new()));

    let data: Value = client.get("raw").await.expect("raw");
    assert_eq!(data, json!({"id": 7, "name": "Bolt"}));
}

#[tokio::test]
async fn logical_failure_rejects_with_server_message() {
    let (base_url, _) = spawn_server().await;
    let store = Arc::new(MemoryCredentialStore::with_token("jwt-abc"));
    let client = client_with(&base_url, store.clone());

    let submission = OrderSubmission::new(3, 0, "Li Wei", "13800000000");
    let err = client.submit_order(&submission).await.expect_err("must reject");
    assert_eq!(err.message(), "invalid quantity");
    assert!(matches!(err, ApiError::Rejected { code: Some(400), .. }));
    // Not an auth failure: the credential stays
    assert_eq!(store.get().unwrap().as_deref(), Some("jwt-abc"));
}

#[tokio::test]
async fn http_error_with_envelope_rejects_with_server_message() {
    let (base_url, _) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::new()));

    let submission = OrderSubmission::new(3, 0, "Li Wei", "13800000000");
    let err = client
        .post::<Value, _>("/strict/orders", &submission)
        .await
        .expect_err("must reject");
    assert_eq!(err.to_string(), "invalid quantity");
}

#[tokio::test]
async fn empty_envelope_message_falls_back() {
    let (base_url, _) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::new()));

    let err = client.get::<Value>("/forbidden").await.expect_err("must reject");
    assert_eq!(err.message(), DEFAULT_FAILURE_MESSAGE);
}

#[tokio::test]
async fn expired_token_clears_credential_and_emits_once() {
    let (base_url, _) = spawn_server().await;
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let client = client_with(&base_url, store.clone());
    let mut events = client.subscribe_auth_events();

    let err = client.get::<Value>("/expired").await.expect_err("must reject");
    assert_eq!(err.message(), "token expired");
    assert!(err.is_auth_failure());
    assert_eq!(store.get().unwrap(), None);

    let event = events.try_recv().expect("auth event");
    assert_eq!(
        event,
        AuthEvent::SessionExpired {
            message: "token expired".to_string(),
            login_path: "/login".to_string(),
        }
    );
    assert_eq!(event.login_path(), "/login");
    assert!(events.try_recv().is_err(), "exactly one event per failure");
}

#[tokio::test]
async fn plain_401_clears_credential_and_keeps_http_error() {
    let (base_url, _) = spawn_server().await;
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let client = client_with(&base_url, store.clone());
    let mut events = client.subscribe_auth_events();

    let err = client.get::<Value>("/plain-401").await.expect_err("must reject");
    assert!(matches!(
        err,
        ApiError::Http { status, .. } if status == reqwest::StatusCode::UNAUTHORIZED
    ));
    assert_eq!(store.get().unwrap(), None);
    assert!(events.try_recv().is_ok());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn non_envelope_http_error_is_propagated() {
    let (base_url, _) = spawn_server().await;
    let store = Arc::new(MemoryCredentialStore::with_token("jwt-abc"));
    let client = client_with(&base_url, store.clone());
    let mut events = client.subscribe_auth_events();

    let err = client.get::<Value>("/broken").await.expect_err("must reject");
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.get().unwrap().as_deref(), Some("jwt-abc"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn envelope_401_on_success_status_only_rejects() {
    let (base_url, _) = spawn_server().await;
    let store = Arc::new(MemoryCredentialStore::with_token("jwt-abc"));
    let client = client_with(&base_url, store.clone());
    let mut events = client.subscribe_auth_events();

    let err = client.get::<Value>("/soft-401").await.expect_err("must reject");
    assert_eq!(err.message(), "please log in");
    assert_eq!(store.get().unwrap().as_deref(), Some("jwt-abc"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn network_failure_returns_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = Arc::new(MemoryCredentialStore::with_token("jwt-abc"));
    let client = client_with(&format!("http://{addr}/api"), store.clone());
    let mut events = client.subscribe_auth_events();

    let err = client.get::<Value>("/widget").await.expect_err("must fail");
    assert!(matches!(err, ApiError::Network(_)), "unexpected error: {err:?}");
    assert_eq!(store.get().unwrap().as_deref(), Some("jwt-abc"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn bearer_header_follows_credential() {
    let (base_url, recorded) = spawn_server().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_with(&base_url, store.clone());

    let _: Value = client.get("/widget").await.expect("anonymous");
    store.set("jwt-abc").unwrap();
    let _: Value = client.get("/widget").await.expect("authenticated");

    assert_eq!(
        recorded.auth_headers(),
        vec![None, Some("Bearer jwt-abc".to_string())]
    );
}

#[tokio::test]
async fn login_stores_token_and_logout_clears_it() {
    let (base_url, recorded) = spawn_server().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_with(&base_url, store.clone());

    let auth = client.login("alice", "secret").await.expect("login");
    assert_eq!(auth.display_name(), "alice");
    assert_eq!(store.get().unwrap().as_deref(), Some("jwt-abc"));
    assert!(client.is_logged_in());
    let session = store.session().unwrap().expect("session");
    assert_eq!(session.username.as_deref(), Some("alice"));
    assert_eq!(session.role, Some(crate::models::Role::Admin));

    let _: Value = client.get("/widget").await.expect("widget");
    assert_eq!(
        recorded.auth_headers().last().cloned().flatten().as_deref(),
        Some("Bearer jwt-abc")
    );

    client.logout().expect("logout");
    assert_eq!(store.get().unwrap(), None);
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn catalog_query_and_typed_products() {
    let (base_url, recorded) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::new()));

    let products = client
        .list_products(&ProductQuery::catalog(None))
        .await
        .expect("products");
    assert_eq!(products.len(), 2);
    assert_eq!(products[1].category, "Wiring");
    assert_eq!(recorded.queries().last().map(String::as_str), Some("available=true"));

    client.search_products("wire").await.expect("search");
    assert_eq!(recorded.queries().last().map(String::as_str), Some("keyword=wire"));
}

#[tokio::test]
async fn order_status_goes_in_query_without_body() {
    let (base_url, recorded) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::with_token("admin")));

    let order = client
        .update_order_status(42, OrderStatus::Cancelled)
        .await
        .expect("status update");
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(recorded.queries().last().map(String::as_str), Some("status=CANCELLED"));
}

#[tokio::test]
async fn delete_resolves_to_unit_on_null_data() {
    let (base_url, _) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::with_token("admin")));

    client.delete_product(9).await.expect("delete");
}

#[tokio::test]
async fn mismatched_payload_is_a_decode_error() {
    let (base_url, _) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::new()));

    // /admin/orders returns orders, not products
    let err = client
        .get::<Vec<crate::models::Product>>("/admin/orders")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::Decode(_)), "unexpected error: {err:?}");

    let orders: Vec<crate::models::Order> = client
        .get_with_query("/admin/orders", &OrderQuery::default())
        .await
        .expect("orders");
    assert_eq!(orders[0].status, OrderStatus::Pending);
}

#[tokio::test]
async fn user_update_sends_only_set_fields() {
    let (base_url, recorded) = spawn_server().await;
    let client = client_with(&base_url, Arc::new(MemoryCredentialStore::with_token("admin")));

    let update = crate::models::UserUpdate {
        role: Some(crate::models::Role::Manager),
        enabled: Some(false),
        ..Default::default()
    };
    let user = client.update_user(5, &update).await.expect("update");
    assert_eq!(user.username, "bob");
    assert_eq!(user.role, crate::models::Role::Manager);
    assert!(!user.is_enabled());
    assert_eq!(
        recorded.auth_headers().last().cloned().flatten().as_deref(),
        Some("Bearer admin")
    );
}
