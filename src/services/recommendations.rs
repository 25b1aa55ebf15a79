use std::time::Instant;

use crate::{
    error::{AppResult, Engine},
    models::{ProductCard, ProductSummary},
    services::{
        collaborative::{CollaborativeEngine, Exclusions},
        content::similar_products,
        providers::{exclusions_or_empty, SnapshotProvider},
        ranking::hydrate_in_rank_order,
    },
};

/// Products whose text is closest to `product_id`, best first
///
/// Unknown products and empty catalogs give an empty list. Provider failures
/// are returned wrapped with the content engine name.
pub async fn recommend_similar_products(
    provider: &dyn SnapshotProvider,
    product_id: &str,
    top_n: usize,
) -> AppResult<Vec<ProductSummary>> {
    let start = Instant::now();

    let products = provider
        .products()
        .await
        .map_err(|e| e.in_engine(Engine::Content))?;

    let recommended =
        similar_products(&products, product_id, top_n).map_err(|e| e.in_engine(Engine::Content))?;

    tracing::info!(
        product_id = %product_id,
        provider = provider.name(),
        catalog_size = products.len(),
        returned = recommended.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Content recommendations computed"
    );

    Ok(recommended)
}

/// Personalised recommendations from the interaction log, best first
///
/// Cold-start users get an empty list. Items the user interacted with, has
/// in an active cart or already bought are never returned.
pub async fn recommend_for_user(
    provider: &dyn SnapshotProvider,
    user_id: &str,
    top_n: usize,
) -> AppResult<Vec<ProductCard>> {
    let start = Instant::now();

    let events = provider
        .interactions()
        .await
        .map_err(|e| e.in_engine(Engine::Collaborative))?;

    if events.is_empty() {
        tracing::info!(user_id = %user_id, "No interactions in snapshot");
        return Ok(Vec::new());
    }

    let engine = CollaborativeEngine::build(&events);
    if !engine.knows_user(user_id) {
        tracing::info!(user_id = %user_id, "Cold-start user, nothing to recommend");
        return Ok(Vec::new());
    }

    let exclusions = Exclusions {
        cart: exclusions_or_empty("cart", user_id, provider.active_cart_items(user_id))
            .await
            .map_err(|e| e.in_engine(Engine::Collaborative))?,
        purchased: exclusions_or_empty("orders", user_id, provider.purchased_items(user_id))
            .await
            .map_err(|e| e.in_engine(Engine::Collaborative))?,
    };

    let ranked: Vec<String> = engine
        .recommend(user_id, &exclusions, top_n)
        .into_iter()
        .map(|item| item.product_id)
        .collect();

    if ranked.is_empty() {
        tracing::info!(user_id = %user_id, "No positively scored candidates");
        return Ok(Vec::new());
    }

    let products = provider
        .products()
        .await
        .map_err(|e| e.in_engine(Engine::Collaborative))?;
    let cards = hydrate_in_rank_order(&ranked, &products, |p| ProductCard::from(p));

    tracing::info!(
        user_id = %user_id,
        provider = provider.name(),
        interactions = events.len(),
        ranked = ranked.len(),
        returned = cards.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "User recommendations computed"
    );

    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{InteractionEvent, InteractionType, Product},
        services::providers::MockSnapshotProvider,
    };

    fn product(id: &str, name: &str, description: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            unit_price: Some(3.0),
            list_price: Some(4.0),
            image_url: Some(format!("{}.png", id)),
            category_id: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("p3", "Beef Stew", "savory meat"),
            product("p1", "Apple Pie", "sweet dessert"),
            product("p2", "Apple Tart", "sweet dessert"),
            product("p4", "Apple Crumble", "sweet baked dessert"),
        ]
    }

    fn interactions() -> Vec<InteractionEvent> {
        vec![
            InteractionEvent::new("u1", "p1", InteractionType::Purchase),
            InteractionEvent::new("u1", "p2", InteractionType::View),
            InteractionEvent::new("u2", "p1", InteractionType::Purchase),
            InteractionEvent::new("u2", "p3", InteractionType::Purchase),
            InteractionEvent::new("u2", "p4", InteractionType::View),
            InteractionEvent::new("u3", "p4", InteractionType::View),
        ]
    }

    fn provider_with(cart: Vec<String>, purchased: Vec<String>) -> MockSnapshotProvider {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_interactions().returning(|| Ok(interactions()));
        mock.expect_products().returning(|| Ok(catalog()));
        mock.expect_active_cart_items()
            .returning(move |_| Ok(cart.clone()));
        mock.expect_purchased_items()
            .returning(move |_| Ok(purchased.clone()));
        mock.expect_name().return_const("mock");
        mock
    }

    #[tokio::test]
    async fn test_similar_products_from_provider() {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_products().times(1).returning(|| Ok(catalog()));
        mock.expect_name().return_const("mock");

        let result = recommend_similar_products(&mock, "p1", 2).await.unwrap();
        let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p4"]);
    }

    #[tokio::test]
    async fn test_similar_products_wraps_provider_failure() {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_products()
            .returning(|| Err(AppError::Snapshot("db down".to_string())));
        mock.expect_name().return_const("mock");

        let err = recommend_similar_products(&mock, "p1", 5).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine {
                engine: Engine::Content,
                ..
            }
        ));
        assert!(err.to_string().contains("db down"));
    }

    #[tokio::test]
    async fn test_user_recommendations_ranked_and_hydrated() {
        let mock = provider_with(Vec::new(), Vec::new());
        let result = recommend_for_user(&mock, "u1", 5).await.unwrap();
        let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p4"]);
        assert_eq!(result[0].image_url.as_deref(), Some("p3.png"));
        assert_eq!(result[0].list_price, Some(4.0));
    }

    #[tokio::test]
    async fn test_cart_items_excluded() {
        let mock = provider_with(vec!["p3".to_string()], Vec::new());
        let result = recommend_for_user(&mock, "u1", 5).await.unwrap();
        let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p4"]);
    }

    #[tokio::test]
    async fn test_purchased_items_excluded() {
        let mock = provider_with(Vec::new(), vec!["p3".to_string(), "p4".to_string()]);
        let result = recommend_for_user(&mock, "u1", 5).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_cold_start_skips_exclusion_lookups() {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_interactions().returning(|| Ok(interactions()));
        mock.expect_active_cart_items().never();
        mock.expect_purchased_items().never();
        mock.expect_products().never();

        let result = recommend_for_user(&mock, "stranger", 5).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_empty_log_returns_empty() {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_interactions().returning(|| Ok(Vec::new()));

        assert!(recommend_for_user(&mock, "u1", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_user_id_degrades_to_no_exclusions() {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_interactions().returning(|| Ok(interactions()));
        mock.expect_products().returning(|| Ok(catalog()));
        mock.expect_active_cart_items()
            .returning(|_| Err(AppError::InvalidInput("not a uuid".to_string())));
        mock.expect_purchased_items()
            .returning(|_| Err(AppError::InvalidInput("not a uuid".to_string())));
        mock.expect_name().return_const("mock");

        let result = recommend_for_user(&mock, "u1", 5).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_exclusion_store_failure_is_wrapped() {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_interactions().returning(|| Ok(interactions()));
        mock.expect_active_cart_items()
            .returning(|_| Err(AppError::Snapshot("carts unavailable".to_string())));
        mock.expect_purchased_items().returning(|_| Ok(Vec::new()));

        let err = recommend_for_user(&mock, "u1", 5).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine {
                engine: Engine::Collaborative,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_products_missing_from_catalog_are_dropped() {
        let mut mock = MockSnapshotProvider::new();
        mock.expect_interactions().returning(|| Ok(interactions()));
        mock.expect_active_cart_items().returning(|_| Ok(Vec::new()));
        mock.expect_purchased_items().returning(|_| Ok(Vec::new()));
        mock.expect_products()
            .returning(|| Ok(vec![product("p4", "Apple Crumble", "sweet baked dessert")]));
        mock.expect_name().return_const("mock");

        let result = recommend_for_user(&mock, "u1", 5).await.unwrap();
        let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p4"]);
    }
}
