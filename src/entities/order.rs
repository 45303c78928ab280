use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A cart while `active`, an immutable purchase afterwards.
///
/// `active_owner_id` mirrors `user_id` only while the order is active and is
/// cleared on completion. Its unique index is what keeps a user down to a
/// single active order: NULLs never collide, so completed orders pile up
/// freely while a second active row for the same user is rejected.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    #[sea_orm(unique)]
    #[serde(skip)]
    pub active_owner_id: Option<i32>,
    pub active: bool,
    pub order_date: Option<DateTimeUtc>,
    pub payment_method_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::payment_method::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_method::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    PaymentMethod,
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLine,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
