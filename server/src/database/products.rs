use sqlx::{FromRow, SqlitePool};

use shared::types::product::Product;
use shared::types::user::Image;

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub project_title: String,
    pub description: String,
    pub price: f64,
    pub product_type: String,
    pub image_public_id: Option<String>,
    pub image_url: String,
    pub activation: bool,
    pub created_at: i64,
}

impl ProductRow {
    pub fn into_product(self) -> Product {
        Product {
            id: self.id,
            project_title: self.project_title,
            description: self.description,
            price: self.price,
            product_type: self.product_type,
            images: Image {
                public_id: self.image_public_id,
                url: self.image_url,
            },
            activation: self.activation,
            created_at: self.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, project_title, description, price, product_type, \
                               image_public_id, image_url, activation, created_at";

pub async fn insert_product(pool: &SqlitePool, product: &ProductRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, project_title, description, price, product_type,
                               image_public_id, image_url, activation, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&product.id)
    .bind(&product.project_title)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.product_type)
    .bind(&product.image_public_id)
    .bind(&product.image_url)
    .bind(product.activation)
    .bind(product.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_product_by_title(
    pool: &SqlitePool,
    title: &str,
) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {} FROM products WHERE project_title = ?1",
        PRODUCT_COLUMNS
    ))
    .bind(title)
    .fetch_optional(pool)
    .await
}

pub async fn get_product(pool: &SqlitePool, id: &str) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {} FROM products WHERE id = ?1",
        PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_products(pool: &SqlitePool) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {} FROM products ORDER BY created_at, id",
        PRODUCT_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

/// Overwrite every mutable column of the row with id `product.id`.
pub async fn update_product(pool: &SqlitePool, product: &ProductRow) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products
         SET project_title = ?2, description = ?3, price = ?4, product_type = ?5,
             image_public_id = ?6, image_url = ?7, activation = ?8
         WHERE id = ?1",
    )
    .bind(&product.id)
    .bind(&product.project_title)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.product_type)
    .bind(&product.image_public_id)
    .bind(&product.image_url)
    .bind(product.activation)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns the updated row, or `None` when no product has that id.
pub async fn set_activation(
    pool: &SqlitePool,
    id: &str,
    activation: bool,
) -> Result<Option<ProductRow>, sqlx::Error> {
    let result = sqlx::query("UPDATE products SET activation = ?2 WHERE id = ?1")
        .bind(id)
        .bind(activation)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_product(pool, id).await
}

pub async fn delete_product(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
