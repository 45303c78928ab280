//! Payment methods owned by a user. Account numbers are opaque digit strings;
//! nothing here talks to a payment gateway.

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::db::begin_write;
use crate::entities::{
    order,
    payment_method::{self, Entity as PaymentMethodEntity},
};
use crate::error::ShopError;

static ACCOUNT_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4,19}$").expect("account number pattern is valid"));

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPaymentMethod {
    #[validate(length(min = 1, max = 15))]
    pub name: String,
    #[validate(regex(path = *ACCOUNT_NUMBER_REGEX))]
    pub account_number: String,
}

/// The user's payment methods, alphabetically by name.
pub async fn list_payment_methods<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Vec<payment_method::Model>, ShopError> {
    Ok(PaymentMethodEntity::find()
        .filter(payment_method::Column::UserId.eq(user_id))
        .order_by_asc(payment_method::Column::Name)
        .order_by_asc(payment_method::Column::Id)
        .all(conn)
        .await?)
}

pub async fn create_payment_method(
    db: &DatabaseConnection,
    user_id: i32,
    input: NewPaymentMethod,
) -> Result<payment_method::Model, ShopError> {
    let created = payment_method::ActiveModel {
        user_id: Set(user_id),
        name: Set(input.name),
        account_number: Set(input.account_number),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id, payment_method_id = created.id, "Payment method added");
    Ok(created)
}

/// Fails with `NotFound` unless `user_id` owns the method, and with
/// `Conflict` while an order still points at it.
pub async fn delete_payment_method(
    db: &DatabaseConnection,
    user_id: i32,
    id: i32,
) -> Result<(), ShopError> {
    let txn = begin_write(db).await?;
    let method = PaymentMethodEntity::find_by_id(id)
        .filter(payment_method::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Payment method {id}")))?;

    let used_by = order::Entity::find()
        .filter(order::Column::PaymentMethodId.eq(method.id))
        .count(&txn)
        .await?;
    if used_by > 0 {
        return Err(ShopError::Conflict(format!(
            "Payment method {id} is attached to {used_by} order(s)"
        )));
    }

    PaymentMethodEntity::delete_by_id(method.id).exec(&txn).await?;
    txn.commit().await?;

    info!(user_id, payment_method_id = id, "Payment method removed");
    Ok(())
}

/// Resolves a payment method that must belong to `owner_id`. Unknown ids and
/// foreign methods are indistinguishable to the caller.
pub async fn owned_payment_method<C: ConnectionTrait>(
    conn: &C,
    owner_id: i32,
    id: i32,
) -> Result<payment_method::Model, ShopError> {
    PaymentMethodEntity::find_by_id(id)
        .filter(payment_method::Column::UserId.eq(owner_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ShopError::InvalidReference(format!(
                "Payment method {id} does not belong to user {owner_id}"
            ))
        })
}
