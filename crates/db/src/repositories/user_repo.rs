//! Repository for the `users` table.

use mutuelle_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, \
    is_active, last_login_at, created_at, updated_at";

/// Accounts of the staff operating the back office.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new account. Duplicate usernames or emails surface as
    /// unique violations on `uq_users_username` / `uq_users_email`.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.password_hash)
            .fetch_one(executor)
            .await
    }

    /// Find an account by id.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an account by username (case-sensitive).
    pub async fn find_by_username(
        executor: impl PgExecutor<'_>,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(executor)
            .await
    }

    /// Stamp `last_login_at` with the current time.
    pub async fn touch_last_login(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
