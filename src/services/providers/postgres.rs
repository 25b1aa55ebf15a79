use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{InteractionEvent, InteractionType, InteractionValue, Product},
    services::providers::SnapshotProvider,
};

/// Snapshot provider backed by the shop's PostgreSQL database
///
/// Ids are UUIDs in the store and plain strings everywhere else.
#[derive(Clone)]
pub struct PgSnapshotProvider {
    pool: PgPool,
}

impl PgSnapshotProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    product_name: String,
    description: Option<String>,
    unit_price: Option<f64>,
    list_price: Option<f64>,
    image_url: Option<String>,
    category_id: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.product_name,
            description: row.description,
            unit_price: row.unit_price,
            list_price: row.list_price,
            image_url: row.image_url,
            category_id: row.category_id,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InteractionRow {
    user_id: String,
    product_id: String,
    kind: String,
    value: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<InteractionRow> for InteractionEvent {
    fn from(row: InteractionRow) -> Self {
        InteractionEvent {
            user_id: row.user_id,
            product_id: row.product_id,
            kind: InteractionType::from(row.kind),
            value: row.value.map(InteractionValue::Text),
            timestamp: row.created_at,
        }
    }
}

fn parse_user_id(user_id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(user_id.trim())
        .map_err(|e| AppError::InvalidInput(format!("malformed user id {:?}: {}", user_id, e)))
}

#[async_trait::async_trait]
impl SnapshotProvider for PgSnapshotProvider {
    async fn products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id::text AS id, product_name, description, unit_price, list_price,
                   image_url, category_id::text AS category_id
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "Fetched product snapshot");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn interactions(&self) -> AppResult<Vec<InteractionEvent>> {
        let rows = sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT user_id::text AS user_id, product_id::text AS product_id,
                   type AS kind, value, created_at
            FROM interactions
            WHERE user_id IS NOT NULL AND product_id IS NOT NULL
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "Fetched interaction snapshot");
        Ok(rows.into_iter().map(InteractionEvent::from).collect())
    }

    async fn active_cart_items(&self, user_id: &str) -> AppResult<Vec<String>> {
        let user_id = parse_user_id(user_id)?;
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT ci.product_id::text
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            WHERE c.user_id = $1 AND c.status = 'active'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn purchased_items(&self, user_id: &str) -> AppResult<Vec<String>> {
        let user_id = parse_user_id(user_id)?;
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT oi.product_id::text
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.customer_id = $1
              AND o.order_status <> 'CANCELLED'
              AND o.payment_status <> 'Failed'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_user_id_rejects_object_id() {
        let err = parse_user_id("64b0f1c2a9e3d4b5c6d7e8f9").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_interaction_row_keeps_text_value() {
        let event = InteractionEvent::from(InteractionRow {
            user_id: "u".to_string(),
            product_id: "p".to_string(),
            kind: "add_to_cart".to_string(),
            value: Some("2".to_string()),
            created_at: None,
        });
        assert_eq!(event.kind, InteractionType::AddToCart);
        assert_eq!(event.score(), 6.0);
    }

    #[test]
    fn test_product_row_conversion() {
        let product = Product::from(ProductRow {
            id: "p".to_string(),
            product_name: "Beef Stew".to_string(),
            description: None,
            unit_price: Some(9.5),
            list_price: Some(11.0),
            image_url: None,
            category_id: Some("c".to_string()),
        });
        assert_eq!(product.name, "Beef Stew");
        assert_eq!(product.list_price, Some(11.0));
    }
}
