use async_trait::async_trait;

use crate::models::portfolio::{NewPortfolioImage, PortfolioImage};

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    async fn list_images_for_artist(
        &self,
        artist_id: i64,
    ) -> Result<Vec<PortfolioImage>, sqlx::Error>;

    /// Current photo count, checked against the tier limit before inserts.
    async fn count_images_for_artist(&self, artist_id: i64) -> Result<i64, sqlx::Error>;

    async fn add_image(
        &self,
        artist_id: i64,
        image: &NewPortfolioImage,
    ) -> Result<PortfolioImage, sqlx::Error>;

    /// Deletes only when the image belongs to the artist. Returns whether a
    /// row was removed.
    async fn delete_image(&self, artist_id: i64, image_id: i64) -> Result<bool, sqlx::Error>;
}
