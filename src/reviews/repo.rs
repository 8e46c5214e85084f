use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// What a review is attached to. Only recipes today, but the reference
/// is a tagged (kind, id) pair so other entity types can join later
/// without a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewableKind {
    Recipe,
}

impl ReviewableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewableKind::Recipe => "recipe",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: Uuid,
    pub reviewable_kind: String,
    pub reviewable_id: i64,
    pub rating: i32,
    pub body: String,
    pub approved_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// A review joined with its author's display name, for detail pages.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewWithAuthor {
    pub id: i64,
    pub user_id: Uuid,
    pub rating: i32,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub user_name: Option<String>,
}

impl Review {
    pub async fn find(db: &PgPool, id: i64) -> anyhow::Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, user_id, reviewable_kind, reviewable_id, rating, body, approved_at, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(review)
    }

    pub async fn list_for(
        db: &PgPool,
        kind: ReviewableKind,
        reviewable_id: i64,
    ) -> anyhow::Result<Vec<ReviewWithAuthor>> {
        let rows = sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            SELECT v.id, v.user_id, v.rating, v.body, v.created_at, u.name AS user_name
            FROM reviews v
            LEFT JOIN users u ON u.id = v.user_id
            WHERE v.reviewable_kind = $1 AND v.reviewable_id = $2
            ORDER BY v.created_at DESC, v.id DESC
            "#,
        )
        .bind(kind.as_str())
        .bind(reviewable_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Inserts unless the (user, reviewable) pair already has a review.
    /// The unique constraint is the race guard; a lost race reads as
    /// "already reviewed", same as a plain duplicate.
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        kind: ReviewableKind,
        reviewable_id: i64,
        rating: i32,
        body: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (user_id, reviewable_kind, reviewable_id, rating, body)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, reviewable_kind, reviewable_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(reviewable_id)
        .bind(rating)
        .bind(body)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update(db: &PgPool, id: i64, rating: i32, body: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reviews
            SET rating = $2, body = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(body)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
