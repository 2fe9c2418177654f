use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, FromRow, Serialize, Clone)]
pub struct PortfolioImage {
    pub id: i64,
    pub artist_id: i64,
    pub image_url: String,
    pub storage_key: Option<String>,
    pub caption: Option<String>,
    pub style: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioImage {
    pub image_url: String,
    pub storage_key: Option<String>,
    pub caption: Option<String>,
    pub style: Option<String>,
}

impl NewPortfolioImage {
    pub fn validate(&self) -> Result<(), &'static str> {
        let url = self.image_url.trim();
        if url.is_empty() {
            return Err("Image URL is required");
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("Image URL must be absolute");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_urls() {
        let image = NewPortfolioImage {
            image_url: "uploads/sleeve.jpg".into(),
            storage_key: None,
            caption: None,
            style: None,
        };
        assert_eq!(image.validate(), Err("Image URL must be absolute"));
    }

    #[test]
    fn accepts_https_url() {
        let image = NewPortfolioImage {
            image_url: "https://cdn.example.com/sleeve.jpg".into(),
            storage_key: Some("sleeve.jpg".into()),
            caption: Some("Full sleeve".into()),
            style: Some("japanese".into()),
        };
        assert!(image.validate().is_ok());
    }
}
