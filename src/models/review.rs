use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, FromRow, Serialize, Clone)]
pub struct Review {
    pub id: i64,
    pub artist_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub artist_response: Option<String>,
    pub responded_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub artist_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=5).contains(&self.rating) {
            return Err("Rating must be between 1 and 5");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewResponsePayload {
    pub response: String,
}
