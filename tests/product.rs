mod common;

use common::{
    add_to_cart, admin_token, auth_headers, create_product_type, get_json, register_and_login,
    sell, spawn_app,
};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

#[tokio::test]
async fn test_sell_and_list_products() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;
    let seller = register_and_login(&app, "seller").await;

    let magic = create_product_type(&app, &admin, "Magic").await;
    let paper = create_product_type(&app, &admin, "Paper").await;

    let wand = sell(&app, &seller, magic, "Magic Wand", "5.99", 12).await;
    sell(&app, &seller, paper, "emoji stickers", "1.99", 500).await;
    sell(&app, &seller, paper, "Keys", "3.00", 100).await;

    let (status, body) = get_json(&app, None, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Keys", "emoji stickers", "Magic Wand"]);

    let (_, body) = get_json(&app, None, &format!("/api/products?type_id={paper}&limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Keys");

    let (_, body) = get_json(&app, None, "/api/products?query=wand").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get_json(&app, None, &format!("/api/products/{wand}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 12);
    assert_eq!(body["quantity_sold"], 0);
    let price = Decimal::from_str(body["price"].as_str().unwrap()).unwrap();
    assert_eq!(price, Decimal::new(599, 2));
}

#[tokio::test]
async fn test_get_missing_product() {
    let app = spawn_app().await;

    let (status, body) = get_json(&app, None, "/api/products/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product 9999 not found");
}

#[tokio::test]
async fn test_sell_rejects_bad_input() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;
    let seller = register_and_login(&app, "seller").await;
    let magic = create_product_type(&app, &admin, "Magic").await;

    let response = app
        .client
        .post(app.url("/api/sell"))
        .headers(auth_headers(&seller))
        .json(&json!({
            "product_type_id": magic,
            "title": "Wand",
            "price": "-1.00",
            "quantity": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .client
        .post(app.url("/api/sell"))
        .headers(auth_headers(&seller))
        .json(&json!({
            "product_type_id": 4242,
            "title": "Wand",
            "price": "1.00",
            "quantity": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_seller_edits_and_ordered_products_stay() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;
    let seller = register_and_login(&app, "seller").await;
    let buyer = register_and_login(&app, "buyer").await;
    let magic = create_product_type(&app, &admin, "Magic").await;
    let wand = sell(&app, &seller, magic, "Magic Wand", "5.99", 12).await;

    let response = app
        .client
        .patch(app.url(&format!("/api/sell/{wand}")))
        .headers(auth_headers(&buyer))
        .json(&json!({ "price": "0.01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .patch(app.url(&format!("/api/sell/{wand}")))
        .headers(auth_headers(&seller))
        .json(&json!({ "quantity": 20 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["quantity"], 20);

    add_to_cart(&app, &buyer, wand).await;

    let response = app
        .client
        .delete(app.url(&format!("/api/sell/{wand}")))
        .headers(auth_headers(&seller))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patch_null_clears_city() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;
    let seller = register_and_login(&app, "seller").await;
    let magic = create_product_type(&app, &admin, "Magic").await;
    let wand = sell(&app, &seller, magic, "Magic Wand", "5.99", 12).await;

    let response = app
        .client
        .patch(app.url(&format!("/api/sell/{wand}")))
        .headers(auth_headers(&seller))
        .json(&json!({ "city": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert!(body["city"].is_null());
    assert_eq!(body["description"], "Test product");

    let response = app
        .client
        .patch(app.url(&format!("/api/sell/{wand}")))
        .headers(auth_headers(&seller))
        .json(&json!({ "title": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_product_type_overview() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;
    let seller = register_and_login(&app, "seller").await;
    let stickers = create_product_type(&app, &admin, "Stickers").await;
    for n in 0..4 {
        sell(&app, &seller, stickers, &format!("sticker {n}"), "1.00", 5).await;
    }

    let (status, body) = get_json(&app, None, "/api/product_types").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Stickers");
    assert_eq!(body[0]["product_count"], 4);
    assert_eq!(body[0]["latest"].as_array().unwrap().len(), 3);
    assert_eq!(body[0]["latest"][0]["title"], "sticker 3");

    let (status, body) = get_json(&app, None, &format!("/api/product_types/{stickers}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_type"]["name"], "Stickers");
    assert_eq!(body["products"].as_array().unwrap().len(), 4);

    let response = app
        .client
        .delete(app.url(&format!("/api/admin/product_types/{stickers}")))
        .headers(auth_headers(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .client
        .post(app.url("/api/admin/product_types"))
        .headers(auth_headers(&admin))
        .json(&json!({ "name": "Stickers" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
