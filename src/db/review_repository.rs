use async_trait::async_trait;

use crate::models::review::{NewReview, Review};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list_reviews_for_artist(&self, artist_id: i64) -> Result<Vec<Review>, sqlx::Error>;

    async fn find_review_by_id(&self, id: i64) -> Result<Option<Review>, sqlx::Error>;

    /// Inserts the review and refreshes the artist's rating aggregates in the
    /// same transaction.
    async fn create_review(&self, user_id: i64, review: &NewReview) -> Result<Review, sqlx::Error>;

    async fn set_response(&self, review_id: i64, response: &str) -> Result<(), sqlx::Error>;
}
