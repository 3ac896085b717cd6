//! Repository for the `user_sessions` table.

use mutuelle_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::session::{CreateSession, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, refresh_token_hash, expires_at, is_revoked, created_at, updated_at";

/// Refresh-token sessions. Only the SHA-256 hash of a token is stored.
pub struct SessionRepo;

impl SessionRepo {
    /// Open a session for a freshly issued refresh token.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreateSession,
    ) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    /// Look up a usable session: not revoked and not expired.
    pub async fn find_active_by_hash(
        executor: impl PgExecutor<'_>,
        refresh_token_hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions \
             WHERE refresh_token_hash = $1 AND NOT is_revoked AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(refresh_token_hash)
            .fetch_optional(executor)
            .await
    }

    /// Revoke one session. Returns `false` if it was already revoked or
    /// does not exist, so a refresh token can be redeemed only once.
    pub async fn revoke(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true WHERE id = $1 AND NOT is_revoked",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every open session of a user (logout). Returns how many were revoked.
    pub async fn revoke_all_for_user(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
