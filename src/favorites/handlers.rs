use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use super::repo::Favorite;
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::outcome::ActionOutcome;
use crate::recipes::repo::Recipe;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes/:id/favorite",
            post(store_favorite).delete(destroy_favorite),
        )
        .route("/recipes/:id/favorite/toggle", post(toggle_favorite))
}

#[instrument(skip(state))]
async fn store_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<i64>,
) -> Result<Json<ActionOutcome>, ApiError> {
    if !Recipe::exists(&state.db, recipe_id).await? {
        return Err(ApiError::NotFound("Recipe not found.".into()));
    }

    if Favorite::add(&state.db, user_id, recipe_id).await? {
        info!(%user_id, recipe_id, "favorite added");
        Ok(Json(ActionOutcome::success("Recipe added to favorites!")))
    } else {
        Ok(Json(ActionOutcome::info(
            "This recipe is already in your favorites!",
        )))
    }
}

#[instrument(skip(state))]
async fn destroy_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<i64>,
) -> Result<Json<ActionOutcome>, ApiError> {
    if Favorite::remove(&state.db, user_id, recipe_id).await? {
        info!(%user_id, recipe_id, "favorite removed");
        Ok(Json(ActionOutcome::success("Recipe removed from favorites.")))
    } else {
        Ok(Json(ActionOutcome::info(
            "This recipe is not in your favorites.",
        )))
    }
}

#[instrument(skip(state))]
async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<i64>,
) -> Result<Json<ActionOutcome>, ApiError> {
    if Favorite::exists(&state.db, user_id, recipe_id).await? {
        destroy_favorite(State(state), AuthUser(user_id), Path(recipe_id)).await
    } else {
        store_favorite(State(state), AuthUser(user_id), Path(recipe_id)).await
    }
}
