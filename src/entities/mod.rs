pub mod order;
pub mod order_line;
pub mod payment_method;
pub mod product;
pub mod product_type;
pub mod user;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Schema, Set,
};
use tracing::info;

use crate::entities::{
    order::Entity as Order, order_line::Entity as OrderLine,
    payment_method::Entity as PaymentMethod, product::Entity as Product,
    product_type::Entity as ProductType, user::Entity as User,
};

/// Creates every table that does not exist yet, parents before children.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(ProductType),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(PaymentMethod),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderLine),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    Ok(())
}

/// Inserts the `admin` account unless a user with that name already exists.
pub async fn seed_admin(db: &DatabaseConnection, password: &str) -> Result<(), DbErr> {
    let existing = User::find()
        .filter(user::Column::Username.eq("admin"))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash =
        user::hash_password(password).map_err(|err| DbErr::Custom(err.to_string()))?;

    user::ActiveModel {
        username: Set("admin".to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Seeded admin account");
    Ok(())
}
