//! Snapshot providers
//!
//! The engines never talk to a store directly. They receive a point-in-time
//! snapshot from a `SnapshotProvider`, constructed once at start-up and shared
//! through the application state.

use crate::{
    error::{AppError, AppResult},
    models::{InteractionEvent, Product},
};

pub mod memory;
pub mod postgres;

pub use memory::{InMemorySnapshot, SnapshotData};
pub use postgres::PgSnapshotProvider;

/// Read-only access to catalog, interaction log, carts and orders
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// All catalog products
    async fn products(&self) -> AppResult<Vec<Product>>;

    /// All interaction events that carry both a user and a product id
    async fn interactions(&self) -> AppResult<Vec<InteractionEvent>>;

    /// Product ids in the user's active cart
    ///
    /// Fails with `AppError::InvalidInput` when `user_id` is not a valid
    /// identifier for this store.
    async fn active_cart_items(&self, user_id: &str) -> AppResult<Vec<String>>;

    /// Product ids from the user's orders that were neither cancelled nor
    /// failed at payment
    ///
    /// Fails with `AppError::InvalidInput` when `user_id` is malformed.
    async fn purchased_items(&self, user_id: &str) -> AppResult<Vec<String>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Reads one exclusion source, treating a malformed user id as "no exclusions"
pub async fn exclusions_or_empty<F>(source: &'static str, user_id: &str, lookup: F) -> AppResult<Vec<String>>
where
    F: std::future::Future<Output = AppResult<Vec<String>>>,
{
    match lookup.await {
        Ok(ids) => Ok(ids),
        Err(AppError::InvalidInput(reason)) => {
            tracing::warn!(
                user_id = %user_id,
                source = source,
                reason = %reason,
                "Malformed user id, skipping exclusion source"
            );
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exclusions_or_empty_passes_ids_through() {
        let ids = exclusions_or_empty("cart", "u1", async { Ok(vec!["p1".to_string()]) })
            .await
            .unwrap();
        assert_eq!(ids, vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn test_exclusions_or_empty_degrades_malformed_id() {
        let ids = exclusions_or_empty("orders", "???", async {
            Err(AppError::InvalidInput("not a uuid".to_string()))
        })
        .await
        .unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_exclusions_or_empty_propagates_store_failure() {
        let result = exclusions_or_empty("cart", "u1", async {
            Err(AppError::Snapshot("timeout".to_string()))
        })
        .await;
        assert!(matches!(result, Err(AppError::Snapshot(_))));
    }
}
