use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::{ensure_active, order_lines, owned_order, CheckoutPreview, OrderDetail, OrderId};
use crate::db::{begin_write, retry_busy};
use crate::entities::{
    order::{self, Entity as OrderEntity},
    order_line::{self, Entity as OrderLineEntity},
    product::{self, Entity as ProductEntity},
};
use crate::error::ShopError;
use crate::payments;

/// First checkout step: shows which payment methods can settle the order.
pub async fn begin_checkout(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: OrderId,
    submitted_total: Decimal,
) -> Result<CheckoutPreview, ShopError> {
    let order = owned_order(db, user_id, order_id).await?;
    ensure_active(&order)?;
    let payment_methods = payments::list_payment_methods(db, user_id).await?;

    Ok(CheckoutPreview {
        order_id,
        total: submitted_total,
        payment_methods,
    })
}

/// Moves `n` units of a product from on-hand to sold, refusing to go below zero.
async fn take_stock<C: ConnectionTrait>(conn: &C, product_id: i32, n: i32) -> Result<(), ShopError> {
    let result = ProductEntity::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).sub(n),
        )
        .col_expr(
            product::Column::QuantitySold,
            Expr::col(product::Column::QuantitySold).add(n),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Quantity.gte(n))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(ShopError::Conflict(format!(
            "Insufficient stock for product {product_id}"
        )));
    }
    Ok(())
}

/// Completes an active order: takes stock for every line, attaches the payment
/// method and stamps the order date, all in one transaction.
pub async fn complete_checkout(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: OrderId,
    payment_method_id: i32,
) -> Result<OrderDetail, ShopError> {
    retry_busy("complete_checkout", || {
        try_complete_checkout(db, user_id, order_id, payment_method_id)
    })
    .await
}

async fn try_complete_checkout(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: OrderId,
    payment_method_id: i32,
) -> Result<OrderDetail, ShopError> {
    let txn = begin_write(db).await?;
    let order = owned_order(&txn, user_id, order_id).await?;
    ensure_active(&order)?;

    let lines = OrderLineEntity::find()
        .filter(order_line::Column::OrderId.eq(order.id))
        .all(&txn)
        .await?;
    if lines.is_empty() {
        return Err(ShopError::Validation(format!("Order {order_id} has no lines")));
    }

    let method = payments::owned_payment_method(&txn, order.user_id, payment_method_id).await?;

    let mut demand: BTreeMap<i32, i32> = BTreeMap::new();
    for line in &lines {
        *demand.entry(line.product_id).or_default() += 1;
    }
    for (&product_id, &n) in &demand {
        if let Err(err) = take_stock(&txn, product_id, n).await {
            warn!(user_id, order_id = order.id, product_id, wanted = n, "Checkout rejected");
            return Err(err);
        }
    }

    let now = Utc::now();
    let flipped = OrderEntity::update_many()
        .col_expr(order::Column::Active, Expr::value(false))
        .col_expr(order::Column::ActiveOwnerId, Expr::value(Option::<i32>::None))
        .col_expr(order::Column::PaymentMethodId, Expr::value(method.id))
        .col_expr(order::Column::OrderDate, Expr::value(now))
        .filter(order::Column::Id.eq(order.id))
        .filter(order::Column::Active.eq(true))
        .exec(&txn)
        .await?;
    if flipped.rows_affected == 0 {
        return Err(ShopError::Conflict(format!(
            "Order {order_id} was completed concurrently"
        )));
    }

    let lines = order_lines(&txn, order.id).await?;
    txn.commit().await?;

    info!(
        user_id,
        order_id = order.id,
        payment_method_id = method.id,
        lines = lines.len(),
        "Order completed"
    );
    Ok(OrderDetail {
        order_id,
        active: false,
        order_date: Some(now),
        payment_method_id: Some(method.id),
        total: super::total(&lines),
        lines,
    })
}
