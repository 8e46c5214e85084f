use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo::{ImportedRecipe, Recipe};
use crate::auth::jwt::OptionalAuthUser;
use crate::error::ApiError;
use crate::favorites::repo::Favorite;
use crate::mealdb::types::MealRecord;
use crate::mealdb::MealApi;
use crate::reviews::repo::{Review, ReviewableKind};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/:id", get(show_recipe))
        .route("/recipes/import/:mealdb_id", post(import_recipe))
}

#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub recipe: RecipeBody,
    pub is_favorited: bool,
    pub average_rating: Option<f64>,
    pub user_review: Option<OwnReview>,
    pub reviews: Vec<ReviewItem>,
}

#[derive(Debug, Serialize)]
pub struct RecipeBody {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OwnReview {
    pub id: i64,
    pub rating: i32,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewItem {
    pub id: i64,
    pub rating: i32,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: ReviewAuthor,
    pub is_owner: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewAuthor {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub recipe_id: i64,
}

#[instrument(skip(state))]
async fn show_recipe(
    State(state): State<AppState>,
    OptionalAuthUser(user_id): OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = Recipe::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found.".into()))?;

    let reviews = Review::list_for(&state.db, ReviewableKind::Recipe, id).await?;

    let average_rating = if reviews.is_empty() {
        None
    } else {
        Some(reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / reviews.len() as f64)
    };

    let user_review = user_id.and_then(|uid| {
        reviews.iter().find(|r| r.user_id == uid).map(|r| OwnReview {
            id: r.id,
            rating: r.rating,
            body: r.body.clone(),
        })
    });

    let is_favorited = match user_id {
        Some(uid) => Favorite::exists(&state.db, uid, id).await?,
        None => false,
    };

    let reviews = reviews
        .into_iter()
        .map(|r| ReviewItem {
            id: r.id,
            rating: r.rating,
            body: r.body,
            created_at: r.created_at,
            user: ReviewAuthor {
                id: r.user_id,
                name: r.user_name.unwrap_or_else(|| "Unknown".into()),
            },
            is_owner: user_id.is_some_and(|uid| uid == r.user_id),
        })
        .collect();

    Ok(Json(RecipeDetails {
        recipe: RecipeBody {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            image: recipe.image,
        },
        is_favorited,
        average_rating,
        user_review,
        reviews,
    }))
}

#[instrument(skip(state))]
async fn import_recipe(
    State(state): State<AppState>,
    Path(mealdb_id): Path<String>,
) -> Result<Json<ImportResponse>, ApiError> {
    let mealdb_id = mealdb_id.trim().to_string();
    if mealdb_id.is_empty() {
        return Err(ApiError::Validation("Meal id is required.".into()));
    }

    let payload = state
        .mealdb
        .lookup(&mealdb_id)
        .await
        .map_err(|e| ApiError::upstream("Import failed.", state.config.debug, &e))?;

    let Some(meal) = MealRecord::first_from(&payload) else {
        return Err(ApiError::NotFound("Meal not found.".into()));
    };

    let title = meal.title.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation("Invalid meal payload.".into()));
    }

    let description = Some(meal.description()).filter(|d| !d.is_empty());
    let values = ImportedRecipe {
        title,
        description,
        ingredients: meal.ingredient_lines(),
        instructions: meal.instructions.unwrap_or_default(),
        image: meal.thumb,
    };

    let recipe_id = Recipe::upsert_imported(&state.db, &mealdb_id, &values).await?;
    info!(%mealdb_id, recipe_id, "meal imported");

    Ok(Json(ImportResponse { recipe_id }))
}
