use axum::{
    extract::Path,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::artist::SubscriptionTier;
use crate::utils::tier_limits::{Entitlements, NormalizedTier};

// GET /api/entitlements/{tier}
//
// Resolves a raw tier string the same way the rest of the system does, so
// clients can render gating without duplicating the rules.
pub async fn get_entitlements(Path(tier): Path<String>) -> Response {
    let resolved = SubscriptionTier::from(NormalizedTier::from_str(Some(&tier)));
    Json(json!({
        "success": true,
        "tier": resolved,
        "entitlements": Entitlements::for_tier(resolved),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode;

    use super::get_entitlements;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn premium_reports_full_access() {
        let resp = get_entitlements(Path("premium".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["tier"], "premium");
        assert_eq!(json["entitlements"]["canAcceptBookings"], true);
        assert_eq!(json["entitlements"]["hasAnalytics"], true);
        assert!(json["entitlements"]["portfolioPhotoLimit"].is_null());
    }

    #[tokio::test]
    async fn unknown_tier_resolves_to_free() {
        let resp = get_entitlements(Path("platinum".to_string())).await;
        let json = body_json(resp).await;
        assert_eq!(json["tier"], "free");
        assert_eq!(json["entitlements"]["canAcceptBookings"], false);
        assert_eq!(json["entitlements"]["portfolioPhotoLimit"], 3);
    }

    #[tokio::test]
    async fn tier_suffixes_are_tolerated() {
        let resp = get_entitlements(Path("premium:yearly".to_string())).await;
        let json = body_json(resp).await;
        assert_eq!(json["tier"], "premium");
    }
}
