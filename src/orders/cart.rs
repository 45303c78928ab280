use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info};

use super::{ensure_active, order_lines, owned_order, total, Cart, OrderId};
use crate::catalog;
use crate::db::{begin_write, retry_busy};
use crate::entities::{
    order::{self, Entity as OrderEntity},
    order_line::{self, Entity as OrderLineEntity},
};
use crate::error::ShopError;

async fn find_active<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<order::Model>, ShopError> {
    Ok(OrderEntity::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::Active.eq(true))
        .one(conn)
        .await?)
}

/// Returns the user's active order, opening an empty one if there is none.
///
/// The insert is a no-op when `active_owner_id` is already taken, so a
/// concurrent caller that got there first simply has its row read back.
pub async fn active_order<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<order::Model, ShopError> {
    if let Some(order) = find_active(conn, user_id).await? {
        return Ok(order);
    }

    let opened = OrderEntity::insert(order::ActiveModel {
        user_id: Set(user_id),
        active_owner_id: Set(Some(user_id)),
        active: Set(true),
        order_date: Set(None),
        payment_method_id: Set(None),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(order::Column::ActiveOwnerId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let order = find_active(conn, user_id).await?.ok_or_else(|| {
        ShopError::Conflict(format!("Active order for user {user_id} disappeared"))
    })?;
    if opened > 0 {
        info!(user_id, order_id = order.id, "Opened cart");
    } else {
        debug!(user_id, order_id = order.id, "Active order created concurrently");
    }
    Ok(order)
}

/// Puts one unit of `product_id` in the user's cart.
///
/// Out-of-stock products are declined with `Ok(None)` and no cart is opened.
/// Stock is only checked here, never reserved.
pub async fn add_line(
    db: &DatabaseConnection,
    user_id: i32,
    product_id: i32,
) -> Result<Option<order_line::Model>, ShopError> {
    retry_busy("add_line", || try_add_line(db, user_id, product_id)).await
}

async fn try_add_line(
    db: &DatabaseConnection,
    user_id: i32,
    product_id: i32,
) -> Result<Option<order_line::Model>, ShopError> {
    let txn = begin_write(db).await?;
    let product = catalog::get_product(&txn, product_id).await?;

    if product.quantity <= 0 {
        info!(user_id, product_id, "Declined out-of-stock product");
        return Ok(None);
    }

    let order = active_order(&txn, user_id).await?;
    let line = order_line::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(product.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    debug!(user_id, order_id = order.id, product_id, line_id = line.id, "Added line");
    Ok(Some(line))
}

/// Removes one line for `product_id` from an active order. With duplicates,
/// the oldest line (lowest id) goes first.
pub async fn remove_line(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: OrderId,
    product_id: i32,
) -> Result<order_line::Model, ShopError> {
    retry_busy("remove_line", || async move {
        let txn = begin_write(db).await?;
        let order = owned_order(&txn, user_id, order_id).await?;
        ensure_active(&order)?;

        let line = OrderLineEntity::find()
            .filter(order_line::Column::OrderId.eq(order.id))
            .filter(order_line::Column::ProductId.eq(product_id))
            .order_by_asc(order_line::Column::Id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ShopError::NotFound(format!("Line for product {product_id} on order {order_id}"))
            })?;

        OrderLineEntity::delete_by_id(line.id).exec(&txn).await?;
        txn.commit().await?;

        debug!(user_id, order_id = order.id, product_id, line_id = line.id, "Removed line");
        Ok(line)
    })
    .await
}

pub async fn view_cart(db: &DatabaseConnection, user_id: i32) -> Result<Cart, ShopError> {
    retry_busy("view_cart", || async move {
        let txn = begin_write(db).await?;
        let order = active_order(&txn, user_id).await?;
        let lines = order_lines(&txn, order.id).await?;
        txn.commit().await?;

        Ok(Cart {
            order_id: OrderId(order.id),
            total: total(&lines),
            lines,
        })
    })
    .await
}

/// Deletes an active order and its lines. Nothing was reserved, so stock is
/// left alone. Completed orders cannot be cancelled.
pub async fn cancel_order(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: OrderId,
) -> Result<(), ShopError> {
    retry_busy("cancel_order", || async move {
        let txn = begin_write(db).await?;
        let order = owned_order(&txn, user_id, order_id).await?;
        ensure_active(&order)?;

        let removed = OrderLineEntity::delete_many()
            .filter(order_line::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        OrderEntity::delete_by_id(order.id).exec(&txn).await?;
        txn.commit().await?;

        info!(user_id, order_id = order.id, lines = removed.rows_affected, "Cancelled order");
        Ok(())
    })
    .await
}
