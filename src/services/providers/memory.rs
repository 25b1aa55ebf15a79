use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{CartRecord, CartStatus, InteractionEvent, OrderRecord, Product},
    services::providers::SnapshotProvider,
};

/// Complete snapshot contents, as stored in a seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotData {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub interactions: Vec<InteractionEvent>,
    #[serde(default)]
    pub carts: Vec<CartRecord>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

/// Fixed in-process snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshot {
    data: SnapshotData,
}

impl InMemorySnapshot {
    pub fn new(data: SnapshotData) -> Self {
        Self { data }
    }

    /// Loads a snapshot from a JSON seed file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read snapshot {}: {}", path.display(), e))?;
        let data: SnapshotData = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid snapshot {}: {}", path.display(), e))?;

        tracing::info!(
            path = %path.display(),
            products = data.products.len(),
            interactions = data.interactions.len(),
            carts = data.carts.len(),
            orders = data.orders.len(),
            "Loaded snapshot file"
        );

        Ok(Self::new(data))
    }
}

fn check_user_id(user_id: &str) -> AppResult<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("empty user id".to_string()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl SnapshotProvider for InMemorySnapshot {
    async fn products(&self) -> AppResult<Vec<Product>> {
        Ok(self.data.products.clone())
    }

    async fn interactions(&self) -> AppResult<Vec<InteractionEvent>> {
        Ok(self
            .data
            .interactions
            .iter()
            .filter(|e| !e.user_id.is_empty() && !e.product_id.is_empty())
            .cloned()
            .collect())
    }

    async fn active_cart_items(&self, user_id: &str) -> AppResult<Vec<String>> {
        check_user_id(user_id)?;
        Ok(self
            .data
            .carts
            .iter()
            .filter(|cart| cart.user_id == user_id && cart.status == CartStatus::Active)
            .flat_map(|cart| cart.items.iter().cloned())
            .collect())
    }

    async fn purchased_items(&self, user_id: &str) -> AppResult<Vec<String>> {
        check_user_id(user_id)?;
        Ok(self
            .data
            .orders
            .iter()
            .filter(|order| order.customer_id == user_id && order.is_purchase())
            .flat_map(|order| order.items.iter().cloned())
            .collect())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
