//! User account entity.

use super::Principal;

/// A registered user. `password_hash` is a PHC-formatted Argon2 string.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Input data for registering a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl User {
    /// Role name carried in issued tokens.
    pub fn role(&self) -> &'static str {
        if self.is_admin { "admin" } else { "user" }
    }

    /// Identity view of this account, without credentials.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            is_admin: self.is_admin,
        }
    }
}
