use crate::types::DbId;

/// Domain error shared by the database and HTTP layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A stored or submitted value is not one of the accepted choices.
    #[error("Invalid {field} '{value}'. Must be one of: {}", allowed.join(", "))]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
