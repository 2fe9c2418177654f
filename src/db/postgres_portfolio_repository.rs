use crate::db::portfolio_repository::PortfolioRepository;
use crate::models::portfolio::{NewPortfolioImage, PortfolioImage};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

pub struct PostgresPortfolioRepository {
    pub pool: PgPool,
}

#[async_trait]
impl PortfolioRepository for PostgresPortfolioRepository {
    async fn list_images_for_artist(
        &self,
        artist_id: i64,
    ) -> Result<Vec<PortfolioImage>, sqlx::Error> {
        sqlx::query_as::<Postgres, PortfolioImage>(
            "SELECT * FROM portfolio_images WHERE artist_id = $1 ORDER BY created_at DESC",
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_images_for_artist(&self, artist_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM portfolio_images WHERE artist_id = $1",
        )
        .bind(artist_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn add_image(
        &self,
        artist_id: i64,
        image: &NewPortfolioImage,
    ) -> Result<PortfolioImage, sqlx::Error> {
        sqlx::query_as::<Postgres, PortfolioImage>(
            r#"
            INSERT INTO portfolio_images (artist_id, image_url, storage_key, caption, style)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(artist_id)
        .bind(image.image_url.trim())
        .bind(image.storage_key.as_deref())
        .bind(image.caption.as_deref())
        .bind(image.style.as_deref())
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_image(&self, artist_id: i64, image_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query::<Postgres>(
            "DELETE FROM portfolio_images WHERE id = $1 AND artist_id = $2",
        )
        .bind(image_id)
        .bind(artist_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
