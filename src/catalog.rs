//! Products and product types.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

use crate::db::begin_write;
use crate::entities::{
    order_line,
    product::{self, Entity as ProductEntity},
    product_type::{self, Entity as ProductTypeEntity},
};
use crate::error::{is_unique_violation, ShopError};

const MAX_PRICE: i64 = 1_000_000;

/// Rounds to cents and pins the scale so `10` renders as `10.00`.
pub fn money(amount: Decimal) -> Decimal {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() || price.is_zero() {
        return Err(ValidationError::new("price_not_positive"));
    }
    if *price >= Decimal::from(MAX_PRICE) {
        return Err(ValidationError::new("price_too_large"));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_precision"));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub type_id: Option<i32>,
    /// Case-insensitive substring of the title.
    pub query: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    pub product_type_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(length(max = 255))]
    pub photo: Option<String>,
    #[validate(length(max = 255))]
    pub city: Option<String>,
}

/// Partial update of a listing. For `description`, `photo` and `city` an
/// explicit `null` clears the value; a missing key leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    pub product_type_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 255))]
    pub photo: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 255))]
    pub city: Option<Option<String>>,
}

/// Keeps `null` apart from an absent key: only a present key reaches here.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProductType {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ProductTypeOverview {
    #[serde(flatten)]
    pub product_type: product_type::Model,
    pub product_count: u64,
    pub latest: Vec<product::Model>,
}

pub async fn list_products(
    db: &DatabaseConnection,
    filter: &ProductFilter,
) -> Result<Vec<product::Model>, ShopError> {
    let mut finder = ProductEntity::find();

    if let Some(type_id) = filter.type_id {
        finder = finder.filter(product::Column::ProductTypeId.eq(type_id));
    }
    if let Some(query) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        finder = finder.filter(product::Column::Title.contains(query));
    }

    let mut finder = finder.order_by_desc(product::Column::Id);
    if let Some(limit) = filter.limit {
        finder = finder.limit(limit);
    }

    Ok(finder.all(db).await?)
}

pub async fn get_product<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<product::Model, ShopError> {
    ProductEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product {id}")))
}

async fn ensure_product_type<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), ShopError> {
    match ProductTypeEntity::find_by_id(id).one(conn).await? {
        Some(_) => Ok(()),
        None => Err(ShopError::InvalidReference(format!("Product type {id} does not exist"))),
    }
}

pub async fn create_product(
    db: &DatabaseConnection,
    seller_id: i32,
    input: NewProduct,
) -> Result<product::Model, ShopError> {
    let txn = begin_write(db).await?;
    ensure_product_type(&txn, input.product_type_id).await?;

    let created = product::ActiveModel {
        seller_id: Set(seller_id),
        product_type_id: Set(input.product_type_id),
        title: Set(input.title),
        description: Set(input.description),
        price: Set(money(input.price)),
        quantity: Set(input.quantity),
        quantity_sold: Set(0),
        photo: Set(input.photo),
        city: Set(input.city),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(seller_id, product_id = created.id, "Product listed");
    Ok(created)
}

pub async fn update_product(
    db: &DatabaseConnection,
    seller_id: i32,
    id: i32,
    patch: ProductPatch,
) -> Result<product::Model, ShopError> {
    let txn = begin_write(db).await?;
    let existing = ProductEntity::find_by_id(id)
        .filter(product::Column::SellerId.eq(seller_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product {id}")))?;

    let mut product: product::ActiveModel = existing.into();

    if let Some(product_type_id) = patch.product_type_id {
        ensure_product_type(&txn, product_type_id).await?;
        product.product_type_id = Set(product_type_id);
    }
    if let Some(title) = patch.title {
        product.title = Set(title);
    }
    if let Some(description) = patch.description {
        product.description = Set(description);
    }
    if let Some(price) = patch.price {
        product.price = Set(money(price));
    }
    if let Some(quantity) = patch.quantity {
        product.quantity = Set(quantity);
    }
    if let Some(photo) = patch.photo {
        product.photo = Set(photo);
    }
    if let Some(city) = patch.city {
        product.city = Set(city);
    }

    let updated = product.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Products that any order line references are protected.
pub async fn delete_product(
    db: &DatabaseConnection,
    seller_id: i32,
    id: i32,
) -> Result<(), ShopError> {
    let txn = begin_write(db).await?;
    let product = ProductEntity::find_by_id(id)
        .filter(product::Column::SellerId.eq(seller_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product {id}")))?;

    let references = order_line::Entity::find()
        .filter(order_line::Column::ProductId.eq(id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(ShopError::Conflict(format!(
            "Product {id} is referenced by {references} order line(s)"
        )));
    }

    ProductEntity::delete_by_id(product.id).exec(&txn).await?;
    txn.commit().await?;

    info!(seller_id, product_id = id, "Product removed");
    Ok(())
}

pub async fn list_product_types(
    db: &DatabaseConnection,
) -> Result<Vec<ProductTypeOverview>, ShopError> {
    let types = ProductTypeEntity::find()
        .order_by_desc(product_type::Column::Id)
        .all(db)
        .await?;

    let mut overview = Vec::with_capacity(types.len());
    for product_type in types {
        let of_type = ProductEntity::find().filter(product::Column::ProductTypeId.eq(product_type.id));
        let product_count = of_type.clone().count(db).await?;
        let latest = of_type
            .order_by_desc(product::Column::Id)
            .limit(3)
            .all(db)
            .await?;
        overview.push(ProductTypeOverview {
            product_type,
            product_count,
            latest,
        });
    }

    Ok(overview)
}

pub async fn products_of_type(
    db: &DatabaseConnection,
    type_id: i32,
) -> Result<(product_type::Model, Vec<product::Model>), ShopError> {
    let product_type = ProductTypeEntity::find_by_id(type_id)
        .one(db)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product type {type_id}")))?;

    let products = ProductEntity::find()
        .filter(product::Column::ProductTypeId.eq(type_id))
        .order_by_desc(product::Column::Id)
        .all(db)
        .await?;

    Ok((product_type, products))
}

pub async fn create_product_type(
    db: &DatabaseConnection,
    input: NewProductType,
) -> Result<product_type::Model, ShopError> {
    let name = input.name;
    product_type::ActiveModel {
        name: Set(name.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            ShopError::Conflict(format!("Product type {name} already exists"))
        } else {
            err.into()
        }
    })
}

pub async fn delete_product_type(db: &DatabaseConnection, id: i32) -> Result<(), ShopError> {
    let txn = begin_write(db).await?;
    let product_type = ProductTypeEntity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product type {id}")))?;

    let products = ProductEntity::find()
        .filter(product::Column::ProductTypeId.eq(id))
        .count(&txn)
        .await?;
    if products > 0 {
        return Err(ShopError::Conflict(format!(
            "Product type {} still has {products} product(s)",
            product_type.name
        )));
    }

    ProductTypeEntity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}
