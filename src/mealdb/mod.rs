mod cache;
mod client;
pub mod handlers;
pub mod types;

pub use client::{random_batch, MealApi, MealDbClient, MealDbError, MAX_RANDOM_BATCH};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
