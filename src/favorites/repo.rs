use sqlx::PgPool;
use uuid::Uuid;

/// Favorites are a bare (user, recipe) join; the composite primary key
/// is the only guard against double-submission races.
pub struct Favorite;

impl Favorite {
    pub async fn exists(db: &PgPool, user_id: Uuid, recipe_id: i64) -> anyhow::Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as(
            "SELECT recipe_id FROM favorites WHERE user_id = $1 AND recipe_id = $2",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(db)
        .await?;
        Ok(found.is_some())
    }

    /// Returns false when the favorite already existed.
    pub async fn add(db: &PgPool, user_id: Uuid, recipe_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when there was nothing to remove.
    pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
