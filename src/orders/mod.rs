//! The cart/order engine.
//!
//! An order starts life as a user's single *active* order (the cart), gains
//! and loses lines while active, and ends either completed by checkout or
//! deleted by cancellation. Neither end state can be left again.

mod cart;
mod checkout;
mod history;

pub use cart::{active_order, add_line, cancel_order, remove_line, view_cart};
pub use checkout::{begin_checkout, complete_checkout};
pub use history::{order_detail, order_history};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::money;
use crate::entities::{
    order::{self, Entity as OrderEntity},
    order_line::{self, Entity as OrderLineEntity},
    payment_method,
    product::Entity as ProductEntity,
};
use crate::error::ShopError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i32);

impl From<i32> for OrderId {
    fn from(id: i32) -> Self {
        OrderId(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line as shown to the buyer, priced at the product's current price.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineView {
    pub line_id: i32,
    pub product_id: i32,
    pub title: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct Cart {
    pub order_id: OrderId,
    pub lines: Vec<LineView>,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CheckoutPreview {
    pub order_id: OrderId,
    /// Echo of the total the buyer saw; not recomputed.
    pub total: Decimal,
    pub payment_methods: Vec<payment_method::Model>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order_id: OrderId,
    pub active: bool,
    pub order_date: Option<DateTime<Utc>>,
    pub payment_method_id: Option<i32>,
    pub lines: Vec<LineView>,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub order_date: Option<DateTime<Utc>>,
    pub payment_method_id: Option<i32>,
    pub line_count: usize,
    pub total: Decimal,
}

pub(crate) async fn owned_order<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    order_id: OrderId,
) -> Result<order::Model, ShopError> {
    OrderEntity::find_by_id(order_id.0)
        .filter(order::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Order {order_id}")))
}

pub(crate) fn ensure_active(order: &order::Model) -> Result<(), ShopError> {
    if order.active {
        Ok(())
    } else {
        Err(ShopError::Conflict(format!(
            "Order {} is already completed",
            order.id
        )))
    }
}

pub(crate) async fn order_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
) -> Result<Vec<LineView>, ShopError> {
    let rows = OrderLineEntity::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .find_also_related(ProductEntity)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(line, product)| {
            let product = product
                .ok_or_else(|| ShopError::NotFound(format!("Product {}", line.product_id)))?;
            Ok(LineView {
                line_id: line.id,
                product_id: product.id,
                title: product.title,
                price: money(product.price),
            })
        })
        .collect()
}

pub(crate) fn total(lines: &[LineView]) -> Decimal {
    money(lines.iter().map(|line| line.price).sum())
}
