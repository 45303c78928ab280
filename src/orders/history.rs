use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::{order_lines, owned_order, total, OrderDetail, OrderId, OrderSummary};
use crate::entities::order::{self, Entity as OrderEntity};
use crate::error::ShopError;

/// Any order the user owns, open or completed.
pub async fn order_detail(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: OrderId,
) -> Result<OrderDetail, ShopError> {
    let order = owned_order(db, user_id, order_id).await?;
    let lines = order_lines(db, order.id).await?;

    Ok(OrderDetail {
        order_id,
        active: order.active,
        order_date: order.order_date,
        payment_method_id: order.payment_method_id,
        total: total(&lines),
        lines,
    })
}

/// Completed orders, oldest first.
pub async fn order_history(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<OrderSummary>, ShopError> {
    let orders = OrderEntity::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::Active.eq(false))
        .order_by_asc(order::Column::OrderDate)
        .order_by_asc(order::Column::Id)
        .all(db)
        .await?;

    let mut history = Vec::with_capacity(orders.len());
    for order in orders {
        let lines = order_lines(db, order.id).await?;
        history.push(OrderSummary {
            order_id: OrderId(order.id),
            order_date: order.order_date,
            payment_method_id: order.payment_method_id,
            line_count: lines.len(),
            total: total(&lines),
        });
    }
    Ok(history)
}
