#![allow(dead_code)]

use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_bazaar::{
    build_app,
    config::Config,
    connect,
    entities::{seed_admin, setup_schema},
};

pub const ADMIN_PASSWORD: &str = "Secret15";
pub const PASSWORD: &str = "Muzion15";

pub struct TestApp {
    pub address: String,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Serves the full router on an ephemeral port over a private in-memory database.
pub async fn spawn_app() -> TestApp {
    serve("sqlite::memory:".to_string(), 1).await
}

/// Same as `spawn_app`, but over a fresh database file shared by a pool of
/// connections, so concurrent requests really contend for the write lock.
pub async fn spawn_file_app(label: &str, pool: u32) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "rust-bazaar-http-{label}-{}-{nanos}.db",
        std::process::id()
    ));
    serve(format!("sqlite://{}?mode=rwc", path.display()), pool).await
}

async fn serve(database_url: String, db_max_connections: u32) -> TestApp {
    let config = Config {
        database_url,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        jwt_secret: "test-secret".to_string(),
        token_ttl_hours: 1,
        db_max_connections,
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    };

    let db = connect(&config.database_url, config.db_max_connections)
        .await
        .expect("Failed to open database");
    setup_schema(&db).await.expect("Failed to create schema");
    seed_admin(&db, ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    let address = format!("http://{}", listener.local_addr().expect("No local addr"));

    let app = build_app(Arc::new(db), Arc::new(config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    TestApp {
        address,
        client: Client::new(),
    }
}

pub fn auth_headers(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Failed to create Authorization header"),
    );
    headers
}

pub async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let response = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse login response JSON");
    body["token"]
        .as_str()
        .expect("Token not found in login response")
        .to_string()
}

pub async fn register_and_login(app: &TestApp, username: &str) -> String {
    let response = app
        .client
        .post(app.url("/register"))
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    login(app, username, PASSWORD).await
}

pub async fn admin_token(app: &TestApp) -> String {
    login(app, "admin", ADMIN_PASSWORD).await
}

pub async fn create_product_type(app: &TestApp, admin: &str, name: &str) -> i64 {
    let response = app
        .client
        .post(app.url("/api/admin/product_types"))
        .headers(auth_headers(admin))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send product type request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.json::<Value>().await.expect("Invalid JSON");
    body["id"].as_i64().expect("Product type id missing")
}

pub async fn sell(
    app: &TestApp,
    token: &str,
    product_type_id: i64,
    title: &str,
    price: &str,
    quantity: i32,
) -> i64 {
    let response = app
        .client
        .post(app.url("/api/sell"))
        .headers(auth_headers(token))
        .json(&json!({
            "product_type_id": product_type_id,
            "title": title,
            "description": "Test product",
            "price": price,
            "quantity": quantity,
            "city": "Nashville"
        }))
        .send()
        .await
        .expect("Failed to send sell request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.json::<Value>().await.expect("Invalid JSON");
    body["id"].as_i64().expect("Product id missing")
}

/// Adds one unit to the caller's cart and returns the order id it landed on.
pub async fn add_to_cart(app: &TestApp, token: &str, product_id: i64) -> i64 {
    let response = app
        .client
        .post(app.url("/api/cart"))
        .headers(auth_headers(token))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to send add to cart request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.json::<Value>().await.expect("Invalid JSON");
    body["line"]["order_id"].as_i64().expect("Order id missing")
}

pub async fn add_payment_method(app: &TestApp, token: &str, name: &str) -> i64 {
    let response = app
        .client
        .post(app.url("/api/payment_methods"))
        .headers(auth_headers(token))
        .json(&json!({ "name": name, "account_number": "1234123412341234" }))
        .send()
        .await
        .expect("Failed to send payment method request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.json::<Value>().await.expect("Invalid JSON");
    body["id"].as_i64().expect("Payment method id missing")
}

pub async fn get_json(app: &TestApp, token: Option<&str>, path: &str) -> (StatusCode, Value) {
    let mut request = app.client.get(app.url(path));
    if let Some(token) = token {
        request = request.headers(auth_headers(token));
    }
    let response = request.send().await.expect("Failed to send request");
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}
