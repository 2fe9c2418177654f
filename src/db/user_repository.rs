use async_trait::async_trait;

use crate::models::user::PublicUser;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_public_user_by_id(&self, user_id: i64) -> Result<Option<PublicUser>, sqlx::Error>;

    async fn find_user_email_by_id(&self, user_id: i64) -> Result<Option<String>, sqlx::Error>;
}
