use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;
use crate::mealdb::{MealApi, MealDbClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub mealdb: Arc<dyn MealApi>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let mealdb = Arc::new(MealDbClient::new(&config.mealdb)?) as Arc<dyn MealApi>;

        Ok(Self { db, config, mealdb })
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>, mealdb: Arc<dyn MealApi>) -> Self {
        Self { db, config, mealdb }
    }
}
