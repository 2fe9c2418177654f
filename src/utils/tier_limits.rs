use serde::Serialize;

use crate::models::artist::SubscriptionTier;

pub const FREE_PORTFOLIO_PHOTO_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedTier {
    Free,
    Premium,
}

impl NormalizedTier {
    /// Tier values arrive from loosely-typed storage and query paths.
    /// Anything unrecognized resolves to the free tier, never upward.
    pub fn from_str(raw: Option<&str>) -> Self {
        let normalized = raw.unwrap_or_default().trim().to_lowercase();
        if normalized.is_empty() {
            return Self::Free;
        }

        let key = normalized
            .split([':', '-', '_', ' ', '/', '.'])
            .next()
            .unwrap_or(normalized.as_str());

        match key {
            "premium" | "pro" | "paid" => Self::Premium,
            _ => Self::Free,
        }
    }

    pub fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Feature set derived entirely from the subscription tier. No entitlement
/// is toggled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlements {
    /// `None` means unbounded.
    pub portfolio_photo_limit: Option<u32>,
    pub can_accept_bookings: bool,
    pub can_show_direct_contact: bool,
    pub can_respond_to_reviews: bool,
    pub has_analytics: bool,
    pub show_exact_location: bool,
    pub is_featured: bool,
}

impl Entitlements {
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => Self {
                portfolio_photo_limit: Some(FREE_PORTFOLIO_PHOTO_LIMIT),
                can_accept_bookings: false,
                can_show_direct_contact: false,
                can_respond_to_reviews: false,
                has_analytics: false,
                show_exact_location: false,
                is_featured: false,
            },
            SubscriptionTier::Premium => Self {
                portfolio_photo_limit: None,
                can_accept_bookings: true,
                can_show_direct_contact: true,
                can_respond_to_reviews: true,
                has_analytics: true,
                show_exact_location: true,
                is_featured: true,
            },
        }
    }
}

pub fn can_upload_more_photos(tier: SubscriptionTier, current_count: i64) -> bool {
    match Entitlements::for_tier(tier).portfolio_photo_limit {
        Some(limit) => current_count < i64::from(limit),
        None => true,
    }
}
