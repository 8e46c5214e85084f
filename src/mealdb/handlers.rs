use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use super::client::{random_batch, MealApi, MAX_RANDOM_BATCH};
use crate::error::ApiError;
use crate::state::AppState;

/// Thin proxies over TheMealDB. Payloads pass through untouched so the
/// frontend sees exactly what upstream returned.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mealdb/search", get(proxy_search))
        .route("/mealdb/meals/:id", get(proxy_lookup))
        .route("/mealdb/random", get(proxy_random))
        .route("/mealdb/random-batch", get(proxy_random_batch))
        .route("/mealdb/categories", get(proxy_categories))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    s: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchParams {
    /// Signed so that `count=-1` clamps instead of failing to parse.
    #[serde(default = "default_batch_count")]
    count: i64,
}

fn default_batch_count() -> i64 {
    4
}

fn clamp_count(count: i64) -> usize {
    count.clamp(1, MAX_RANDOM_BATCH as i64) as usize
}

#[instrument(skip(state))]
async fn proxy_search(
    State(state): State<AppState>,
    Query(p): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let payload = state
        .mealdb
        .search(&p.s)
        .await
        .map_err(|e| ApiError::upstream("Meal search failed.", state.config.debug, &e))?;
    Ok(Json(payload))
}

#[instrument(skip(state))]
async fn proxy_lookup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let payload = state
        .mealdb
        .lookup(&id)
        .await
        .map_err(|e| ApiError::upstream("Meal lookup failed.", state.config.debug, &e))?;
    Ok(Json(payload))
}

#[instrument(skip(state))]
async fn proxy_random(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let payload = state
        .mealdb
        .random()
        .await
        .map_err(|e| ApiError::upstream("Random meal failed.", state.config.debug, &e))?;
    Ok(Json(payload))
}

#[instrument(skip(state))]
async fn proxy_random_batch(
    State(state): State<AppState>,
    Query(p): Query<BatchParams>,
) -> Result<Json<Value>, ApiError> {
    let meals = random_batch(state.mealdb.as_ref(), clamp_count(p.count))
        .await
        .map_err(|e| ApiError::upstream("Random meals failed.", state.config.debug, &e))?;
    Ok(Json(json!({ "meals": meals })))
}

#[instrument(skip(state))]
async fn proxy_categories(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let payload = state
        .mealdb
        .categories()
        .await
        .map_err(|e| ApiError::upstream("Category list failed.", state.config.debug, &e))?;
    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn out_of_range_counts_clamp_into_bounds() {
        assert_eq!(clamp_count(-1), 1);
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(4), 4);
        assert_eq!(clamp_count(50), MAX_RANDOM_BATCH);
    }

    #[test]
    fn batch_params_accept_negative_and_missing_counts() {
        let p: BatchParams = serde_json::from_value(json!({"count": -1})).expect("negative count");
        assert_eq!(p.count, -1);

        let p: BatchParams = serde_json::from_value(json!({})).expect("missing count");
        assert_eq!(p.count, 4);
    }
}
