use async_trait::async_trait;

use crate::models::artist::{
    Artist, ArtistAnalytics, ArtistProfilePayload, ArtistSearchQuery, TierChange,
};

#[async_trait]
pub trait ArtistRepository: Send + Sync {
    async fn create_artist(
        &self,
        user_id: i64,
        profile: &ArtistProfilePayload,
    ) -> Result<Artist, sqlx::Error>;

    async fn find_artist_by_id(&self, id: i64) -> Result<Option<Artist>, sqlx::Error>;

    async fn find_artist_by_user_id(&self, user_id: i64) -> Result<Option<Artist>, sqlx::Error>;

    /// Correlates an external subscription event back to its artist via the
    /// subscription id stored at upgrade time.
    async fn find_artist_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Artist>, sqlx::Error>;

    async fn list_approved_artists(&self) -> Result<Vec<Artist>, sqlx::Error>;

    async fn search_artists(&self, query: &ArtistSearchQuery) -> Result<Vec<Artist>, sqlx::Error>;

    async fn update_artist_profile(
        &self,
        id: i64,
        profile: &ArtistProfilePayload,
    ) -> Result<Artist, sqlx::Error>;

    /// The only write path for tier state. Tier and stored subscription id
    /// move together; the change record carries reason and event id for the
    /// audit trail.
    async fn update_subscription(&self, change: &TierChange) -> Result<(), sqlx::Error>;

    async fn artist_analytics(&self, artist_id: i64) -> Result<ArtistAnalytics, sqlx::Error>;
}
