mod common;

use common::{add_payment_method, auth_headers, get_json, register_and_login, spawn_app};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_payment_methods_by_name() {
    let app = spawn_app().await;
    let meg = register_and_login(&app, "mducharme").await;
    let other = register_and_login(&app, "other").await;

    add_payment_method(&app, &meg, "Visa").await;
    add_payment_method(&app, &meg, "MasterCard").await;
    add_payment_method(&app, &meg, "AMEX").await;
    add_payment_method(&app, &other, "Discover").await;

    let (status, body) = get_json(&app, Some(&meg), "/api/payment_methods").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["AMEX", "MasterCard", "Visa"]);
}

#[tokio::test]
async fn test_invalid_account_number() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "buyer").await;

    let response = app
        .client
        .post(app.url("/api/payment_methods"))
        .headers(auth_headers(&token))
        .json(&json!({ "name": "Visa", "account_number": "12ab" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_payment_method() {
    let app = spawn_app().await;
    let owner = register_and_login(&app, "owner").await;
    let thief = register_and_login(&app, "thief").await;
    let visa = add_payment_method(&app, &owner, "Visa").await;

    let response = app
        .client
        .delete(app.url(&format!("/api/payment_methods/{visa}")))
        .headers(auth_headers(&thief))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url(&format!("/api/payment_methods/{visa}")))
        .headers(auth_headers(&owner))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (_, body) = get_json(&app, Some(&owner), "/api/payment_methods").await;
    assert!(body.as_array().unwrap().is_empty());
}
