//! Fixtures for unit tests. Users get a throwaway password string instead of a
//! real hash to keep argon2 out of the hot path.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::entities::{payment_method, product, product_type, setup_schema, user};

pub async fn memory_db() -> DatabaseConnection {
    let db = crate::connect("sqlite::memory:", 1).await.unwrap();
    setup_schema(&db).await.unwrap();
    db
}

/// A fresh SQLite file behind a pool of `pool` connections, for tests that
/// need writers to actually contend.
pub async fn file_db(label: &str, pool: u32) -> DatabaseConnection {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "rust-bazaar-{label}-{}-{nanos}.db",
        std::process::id()
    ));
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let db = crate::connect(&url, pool).await.unwrap();
    setup_schema(&db).await.unwrap();
    db
}

pub async fn user(db: &DatabaseConnection, username: &str) -> i32 {
    user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set("x".to_owned()),
        role: Set(user::Role::User),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn product_type(db: &DatabaseConnection, name: &str) -> i32 {
    product_type::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn product(
    db: &DatabaseConnection,
    seller_id: i32,
    product_type_id: i32,
    title: &str,
    price: Decimal,
    quantity: i32,
) -> product::Model {
    product::ActiveModel {
        seller_id: Set(seller_id),
        product_type_id: Set(product_type_id),
        title: Set(title.to_owned()),
        description: Set(None),
        price: Set(price),
        quantity: Set(quantity),
        quantity_sold: Set(0),
        photo: Set(None),
        city: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn payment_method(
    db: &DatabaseConnection,
    user_id: i32,
    name: &str,
) -> payment_method::Model {
    payment_method::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_owned()),
        account_number: Set("4111111111111111".to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
