use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{SimilarProductsResponse, UserRecommendationsResponse},
    services::{recommend_for_user, recommend_similar_products},
};

use super::AppState;

/// Raw `top_n` query parameter
///
/// Kept as text so malformed values are reported as JSON errors by `resolve`
/// instead of being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct TopNQuery {
    pub top_n: Option<String>,
}

impl TopNQuery {
    /// Requested size, falling back to `default`; must be within `1..=max`
    fn resolve(&self, default: usize, max: usize) -> AppResult<usize> {
        let top_n = match self.top_n.as_deref().map(str::trim) {
            None | Some("") => default,
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                AppError::InvalidInput(format!(
                    "top_n must be a positive integer, got {:?}",
                    raw
                ))
            })?,
        };
        if top_n == 0 || top_n > max {
            return Err(AppError::InvalidInput(format!(
                "top_n must be between 1 and {}, got {}",
                max, top_n
            )));
        }
        Ok(top_n)
    }
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Products similar to the given one
pub async fn similar_products(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<TopNQuery>,
) -> AppResult<Json<SimilarProductsResponse>> {
    let top_n = query.resolve(state.config.similar_products_limit, state.config.max_top_n)?;

    tracing::info!(product_id = %product_id, top_n, "Processing similar products request");

    let recommended_products =
        recommend_similar_products(state.provider.as_ref(), &product_id, top_n).await?;

    Ok(Json(SimilarProductsResponse {
        product_id,
        recommended_products,
    }))
}

/// Personalised recommendations for a user
pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<TopNQuery>,
) -> AppResult<Json<UserRecommendationsResponse>> {
    let top_n = query.resolve(
        state.config.user_recommendations_limit,
        state.config.max_top_n,
    )?;

    tracing::info!(user_id = %user_id, top_n, "Processing user recommendations request");

    let recommended_products = recommend_for_user(state.provider.as_ref(), &user_id, top_n).await?;

    Ok(Json(UserRecommendationsResponse {
        user_id,
        recommended_products,
    }))
}
