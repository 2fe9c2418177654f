use crate::{db::user_repository::UserRepository, models::user::PublicUser};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_public_user_by_id(&self, user_id: i64) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<Postgres, PublicUser>(
            "SELECT id, email, name, role FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_email_by_id(&self, user_id: i64) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<Postgres, String>("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }
}
