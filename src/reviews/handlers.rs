use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::repo::{Review, ReviewableKind};
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::outcome::ActionOutcome;
use crate::recipes::repo::Recipe;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/:id/reviews", post(store_review))
        .route("/reviews/:id", put(update_review).delete(destroy_review))
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub rating: i32,
    pub body: String,
}

const MIN_BODY_CHARS: usize = 10;
const MAX_BODY_CHARS: usize = 1000;

fn validate_review(rating: i32, body: &str) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(
            "Rating must be between 1 and 5.".into(),
        ));
    }
    let len = body.chars().count();
    if !(MIN_BODY_CHARS..=MAX_BODY_CHARS).contains(&len) {
        return Err(ApiError::Validation(format!(
            "Review must be between {MIN_BODY_CHARS} and {MAX_BODY_CHARS} characters."
        )));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
async fn store_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<i64>,
    Json(payload): Json<ReviewBody>,
) -> Result<Json<ActionOutcome>, ApiError> {
    validate_review(payload.rating, &payload.body)?;

    if !Recipe::exists(&state.db, recipe_id).await? {
        return Err(ApiError::NotFound("Recipe not found.".into()));
    }

    let created = Review::create(
        &state.db,
        user_id,
        ReviewableKind::Recipe,
        recipe_id,
        payload.rating,
        &payload.body,
    )
    .await?;

    if !created {
        return Ok(Json(ActionOutcome::info(
            "You have already reviewed this recipe.",
        )));
    }

    info!(%user_id, recipe_id, rating = payload.rating, "review created");
    Ok(Json(ActionOutcome::success(
        "Thank you! Your review has been added.",
    )))
}

#[instrument(skip(state, payload))]
async fn update_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewBody>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let review = Review::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found.".into()))?;
    authorize_owner(&review, user_id)?;
    validate_review(payload.rating, &payload.body)?;

    Review::update(&state.db, id, payload.rating, &payload.body).await?;
    Ok(Json(ActionOutcome::success("Review updated successfully.")))
}

#[instrument(skip(state))]
async fn destroy_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let review = Review::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found.".into()))?;
    authorize_owner(&review, user_id)?;

    Review::delete(&state.db, id).await?;
    Ok(Json(ActionOutcome::success("Review deleted.")))
}

/// Only the author may modify or delete a review. A hard failure,
/// unlike the soft duplicate-review path.
fn authorize_owner(review: &Review, user_id: uuid::Uuid) -> Result<(), ApiError> {
    if review.user_id != user_id {
        return Err(ApiError::Forbidden(
            "You are not allowed to modify this review.".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_ratings_and_bodies() {
        assert!(validate_review(1, "Lovely dish, came out great").is_ok());
        assert!(validate_review(5, "Would absolutely cook this again").is_ok());
    }

    #[test]
    fn rejects_out_of_range_ratings() {
        assert!(validate_review(0, "Lovely dish, came out great").is_err());
        assert!(validate_review(6, "Lovely dish, came out great").is_err());
        assert!(validate_review(-3, "Lovely dish, came out great").is_err());
    }

    #[test]
    fn rejects_bodies_outside_length_bounds() {
        assert!(validate_review(3, "too short").is_err());
        let long = "x".repeat(1001);
        assert!(validate_review(3, &long).is_err());
        let max = "x".repeat(1000);
        assert!(validate_review(3, &max).is_ok());
    }
}
