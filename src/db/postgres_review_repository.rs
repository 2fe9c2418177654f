use crate::db::review_repository::ReviewRepository;
use crate::models::review::{NewReview, Review};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres};

pub struct PostgresReviewRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn list_reviews_for_artist(&self, artist_id: i64) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<Postgres, Review>(
            "SELECT * FROM reviews WHERE artist_id = $1 ORDER BY created_at DESC",
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_review_by_id(&self, id: i64) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as::<Postgres, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_review(&self, user_id: i64, review: &NewReview) -> Result<Review, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let created = {
            let conn: &mut PgConnection = &mut *tx;
            sqlx::query_as::<Postgres, Review>(
                r#"
                INSERT INTO reviews (artist_id, user_id, rating, comment)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(review.artist_id)
            .bind(user_id)
            .bind(review.rating)
            .bind(review.comment.as_deref())
            .fetch_one(conn)
            .await?
        };

        {
            let conn: &mut PgConnection = &mut *tx;
            sqlx::query::<Postgres>(
                r#"
                UPDATE artists
                SET average_rating = sub.avg_rating,
                    total_reviews = sub.review_count
                FROM (
                    SELECT AVG(rating)::float8 AS avg_rating, COUNT(*)::int4 AS review_count
                    FROM reviews WHERE artist_id = $1
                ) AS sub
                WHERE artists.id = $1
                "#,
            )
            .bind(review.artist_id)
            .execute(conn)
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn set_response(&self, review_id: i64, response: &str) -> Result<(), sqlx::Error> {
        sqlx::query::<Postgres>(
            "UPDATE reviews SET artist_response = $2, responded_at = NOW() WHERE id = $1",
        )
        .bind(review_id)
        .bind(response)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
