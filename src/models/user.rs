use core::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role")] // Matches the Postgres enum name
#[sqlx(rename_all = "lowercase")] // Ensures matching strings
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Artist,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::User => "user",
            UserRole::Artist => "artist",
            UserRole::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}

/// The only user shape handed to clients. Storage columns like
/// `oauth_subject` and `stripe_customer_id` never leave the repository.
#[derive(Debug, Deserialize, Serialize, FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}
