use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// A recipe in the local cookbook. `mealdb_id` correlates imported rows
/// with their upstream meal; at most one local row exists per external id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub mealdb_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Freshly normalized values from an upstream meal, ready to persist.
#[derive(Debug)]
pub struct ImportedRecipe {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub image: Option<String>,
}

/// A local search hit with its review aggregates.
#[derive(Debug, Clone, FromRow)]
pub struct LocalSearchRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub reviews_count: i64,
    pub reviews_avg_rating: Option<f64>,
}

impl Recipe {
    pub async fn find(db: &PgPool, id: i64) -> anyhow::Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, mealdb_id, title, description, ingredients, instructions, image, created_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(recipe)
    }

    pub async fn exists(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(found.is_some())
    }

    /// Create-or-refresh keyed on the unique `mealdb_id` column.
    /// Re-import always overwrites with the latest upstream values, and
    /// concurrent imports of the same id are resolved by the constraint.
    pub async fn upsert_imported(
        db: &PgPool,
        mealdb_id: &str,
        values: &ImportedRecipe,
    ) -> anyhow::Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO recipes (mealdb_id, title, description, ingredients, instructions, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (mealdb_id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                ingredients = EXCLUDED.ingredients,
                instructions = EXCLUDED.instructions,
                image = EXCLUDED.image,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(mealdb_id)
        .bind(&values.title)
        .bind(&values.description)
        .bind(&values.ingredients)
        .bind(&values.instructions)
        .bind(&values.image)
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    /// Substring search across title, ingredients and instructions with
    /// review aggregates, newest rows first, capped at 8.
    pub async fn search_local(db: &PgPool, query: &str) -> anyhow::Result<Vec<LocalSearchRow>> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, LocalSearchRow>(
            r#"
            SELECT r.id, r.title, r.description, r.image,
                   COUNT(v.id) AS reviews_count,
                   AVG(v.rating)::float8 AS reviews_avg_rating
            FROM recipes r
            LEFT JOIN reviews v
                ON v.reviewable_kind = 'recipe' AND v.reviewable_id = r.id
            WHERE r.title ILIKE $1
               OR r.ingredients ILIKE $1
               OR r.instructions ILIKE $1
            GROUP BY r.id
            ORDER BY r.id DESC
            LIMIT 8
            "#,
        )
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
