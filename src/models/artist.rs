use core::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use time::OffsetDateTime;

use crate::utils::tier_limits::{Entitlements, NormalizedTier};

#[derive(Type, Debug, Deserialize, Serialize, PartialEq, Eq, Copy, Clone)]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<NormalizedTier> for SubscriptionTier {
    fn from(value: NormalizedTier) -> Self {
        match value {
            NormalizedTier::Free => SubscriptionTier::Free,
            NormalizedTier::Premium => SubscriptionTier::Premium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierChangeReason {
    UpgradedByPayment,
    CancelledByUser,
    DowngradedByProcessor,
}

impl TierChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierChangeReason::UpgradedByPayment => "upgraded_by_payment",
            TierChangeReason::CancelledByUser => "cancelled_by_user",
            TierChangeReason::DowngradedByProcessor => "downgraded_by_processor",
        }
    }
}

/// One audited tier mutation. Every change carries its reason and, when the
/// change was driven by a webhook, the triggering event id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierChange {
    pub artist_id: i64,
    pub tier: SubscriptionTier,
    pub stripe_subscription_id: Option<String>,
    pub reason: TierChangeReason,
    pub event_id: Option<String>,
}

#[derive(Debug, FromRow, Serialize, Clone)]
pub struct Artist {
    pub id: i64,
    pub user_id: i64,
    pub shop_name: String,
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub styles: Option<Vec<String>>,
    pub years_experience: Option<i32>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub is_approved: bool,
    pub average_rating: Option<f64>,
    pub total_reviews: i32,
    pub subscription_tier: SubscriptionTier,
    pub stripe_subscription_id: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Artist {
    pub fn entitlements(&self) -> Entitlements {
        Entitlements::for_tier(self.subscription_tier)
    }
}

/// Listing/detail shape with contact and exact-location fields redacted
/// according to the artist's tier.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicArtistProfile {
    pub id: i64,
    pub shop_name: String,
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub styles: Option<Vec<String>>,
    pub years_experience: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub average_rating: Option<f64>,
    pub total_reviews: i32,
    pub subscription_tier: SubscriptionTier,
    pub accepts_bookings: bool,
    pub is_featured: bool,
}

impl From<Artist> for PublicArtistProfile {
    fn from(artist: Artist) -> Self {
        let ent = artist.entitlements();
        Self {
            id: artist.id,
            shop_name: artist.shop_name,
            bio: artist.bio,
            specialties: artist.specialties,
            styles: artist.styles,
            years_experience: artist.years_experience,
            city: artist.city,
            state: artist.state,
            address: artist.address.filter(|_| ent.show_exact_location),
            zip: artist.zip.filter(|_| ent.show_exact_location),
            phone: artist.phone.filter(|_| ent.can_show_direct_contact),
            website: artist.website.filter(|_| ent.can_show_direct_contact),
            instagram: artist.instagram.filter(|_| ent.can_show_direct_contact),
            average_rating: artist.average_rating,
            total_reviews: artist.total_reviews,
            subscription_tier: artist.subscription_tier,
            accepts_bookings: ent.can_accept_bookings,
            is_featured: ent.is_featured,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfilePayload {
    pub shop_name: String,
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub styles: Option<Vec<String>>,
    pub years_experience: Option<i32>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
}

impl ArtistProfilePayload {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.shop_name.trim().is_empty() {
            return Err("Shop name is required");
        }
        if let Some(years) = self.years_experience {
            if years < 0 {
                return Err("Years of experience cannot be negative");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ArtistSearchQuery {
    pub style: Option<String>,
    pub city: Option<String>,
    pub min_rating: Option<f64>,
    pub min_experience: Option<i32>,
}

/// Profile counters surfaced to premium artists.
#[derive(Debug, FromRow, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistAnalytics {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub portfolio_images: i64,
    pub total_reviews: i64,
    pub average_rating: Option<f64>,
}
