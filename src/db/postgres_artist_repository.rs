use crate::db::artist_repository::ArtistRepository;
use crate::models::artist::{
    Artist, ArtistAnalytics, ArtistProfilePayload, ArtistSearchQuery, TierChange,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tracing::info;

pub struct PostgresArtistRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ArtistRepository for PostgresArtistRepository {
    async fn create_artist(
        &self,
        user_id: i64,
        profile: &ArtistProfilePayload,
    ) -> Result<Artist, sqlx::Error> {
        sqlx::query_as::<Postgres, Artist>(
            r#"
            INSERT INTO artists (
                user_id, shop_name, bio, specialties, styles, years_experience,
                address, city, state, zip, phone, website, instagram
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(profile.shop_name.trim())
        .bind(profile.bio.as_deref())
        .bind(profile.specialties.as_deref())
        .bind(profile.styles.as_deref())
        .bind(profile.years_experience)
        .bind(profile.address.as_deref())
        .bind(profile.city.as_deref())
        .bind(profile.state.as_deref())
        .bind(profile.zip.as_deref())
        .bind(profile.phone.as_deref())
        .bind(profile.website.as_deref())
        .bind(profile.instagram.as_deref())
        .fetch_one(&self.pool)
        .await
    }

    async fn find_artist_by_id(&self, id: i64) -> Result<Option<Artist>, sqlx::Error> {
        sqlx::query_as::<Postgres, Artist>("SELECT * FROM artists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_artist_by_user_id(&self, user_id: i64) -> Result<Option<Artist>, sqlx::Error> {
        sqlx::query_as::<Postgres, Artist>("SELECT * FROM artists WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_artist_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Artist>, sqlx::Error> {
        sqlx::query_as::<Postgres, Artist>(
            "SELECT * FROM artists WHERE stripe_subscription_id = $1",
        )
        .bind(subscription_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_approved_artists(&self) -> Result<Vec<Artist>, sqlx::Error> {
        sqlx::query_as::<Postgres, Artist>(
            r#"
            SELECT * FROM artists
            WHERE is_approved = TRUE
            ORDER BY (subscription_tier = 'premium') DESC,
                     average_rating DESC NULLS LAST,
                     created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn search_artists(&self, query: &ArtistSearchQuery) -> Result<Vec<Artist>, sqlx::Error> {
        sqlx::query_as::<Postgres, Artist>(
            r#"
            SELECT * FROM artists
            WHERE is_approved = TRUE
              AND ($1::text IS NULL OR COALESCE(styles, '{}') @> ARRAY[$1::text])
              AND ($2::text IS NULL OR LOWER(city) = LOWER($2))
              AND ($3::float8 IS NULL OR average_rating >= $3)
              AND ($4::int4 IS NULL OR years_experience >= $4)
            ORDER BY (subscription_tier = 'premium') DESC,
                     average_rating DESC NULLS LAST,
                     created_at DESC
            "#,
        )
        .bind(query.style.as_deref())
        .bind(query.city.as_deref())
        .bind(query.min_rating)
        .bind(query.min_experience)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_artist_profile(
        &self,
        id: i64,
        profile: &ArtistProfilePayload,
    ) -> Result<Artist, sqlx::Error> {
        sqlx::query_as::<Postgres, Artist>(
            r#"
            UPDATE artists
            SET shop_name = $2,
                bio = $3,
                specialties = $4,
                styles = $5,
                years_experience = $6,
                address = $7,
                city = $8,
                state = $9,
                zip = $10,
                phone = $11,
                website = $12,
                instagram = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(profile.shop_name.trim())
        .bind(profile.bio.as_deref())
        .bind(profile.specialties.as_deref())
        .bind(profile.styles.as_deref())
        .bind(profile.years_experience)
        .bind(profile.address.as_deref())
        .bind(profile.city.as_deref())
        .bind(profile.state.as_deref())
        .bind(profile.zip.as_deref())
        .bind(profile.phone.as_deref())
        .bind(profile.website.as_deref())
        .bind(profile.instagram.as_deref())
        .fetch_one(&self.pool)
        .await
    }

    async fn update_subscription(&self, change: &TierChange) -> Result<(), sqlx::Error> {
        sqlx::query::<Postgres>(
            r#"
            UPDATE artists
            SET subscription_tier = $2,
                stripe_subscription_id = $3
            WHERE id = $1
            "#,
        )
        .bind(change.artist_id)
        .bind(change.tier)
        .bind(change.stripe_subscription_id.as_deref())
        .execute(&self.pool)
        .await?;

        // Audit trail for every tier mutation.
        info!(
            artist_id = change.artist_id,
            tier = %change.tier,
            reason = change.reason.as_str(),
            event_id = change.event_id.as_deref(),
            "subscription tier updated"
        );
        Ok(())
    }

    async fn artist_analytics(&self, artist_id: i64) -> Result<ArtistAnalytics, sqlx::Error> {
        sqlx::query_as::<Postgres, ArtistAnalytics>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bookings WHERE artist_id = $1) AS total_bookings,
                (SELECT COUNT(*) FROM bookings WHERE artist_id = $1 AND status = 'pending') AS pending_bookings,
                (SELECT COUNT(*) FROM bookings WHERE artist_id = $1 AND status = 'confirmed') AS confirmed_bookings,
                (SELECT COUNT(*) FROM bookings WHERE artist_id = $1 AND status = 'completed') AS completed_bookings,
                (SELECT COUNT(*) FROM portfolio_images WHERE artist_id = $1) AS portfolio_images,
                (SELECT COUNT(*) FROM reviews WHERE artist_id = $1) AS total_reviews,
                (SELECT average_rating FROM artists WHERE id = $1) AS average_rating
            "#,
        )
        .bind(artist_id)
        .fetch_one(&self.pool)
        .await
    }
}
