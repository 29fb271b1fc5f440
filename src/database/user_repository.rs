//! Dashboard user persistence.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::User;

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up an active account by email or username; the login form sends
    /// a single identifier field.
    pub async fn find_active_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, password_hash, is_active,
                   last_login_at, created_at
            FROM users
            WHERE (email = $1 OR username = $1) AND is_active = TRUE
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up user by login")?;

        Ok(user)
    }

    pub async fn find_active_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, password_hash, is_active,
                   last_login_at, created_at
            FROM users
            WHERE user_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up user by id")?;

        Ok(user)
    }

    pub async fn touch_last_login(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = now() WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to update last login")?;
        Ok(())
    }

    /// Create an account with a precomputed bcrypt hash.
    pub async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Uuid> {
        let user_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        info!("Created user {username} ({user_id})");
        Ok(user_id)
    }
}
