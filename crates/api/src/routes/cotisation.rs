//! Route definitions for the `/cotisations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cotisation;
use crate::state::AppState;

/// Routes mounted at `/cotisations`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// PATCH  /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cotisation::list).post(cotisation::create))
        .route(
            "/{id}",
            get(cotisation::get_by_id)
                .put(cotisation::update)
                .patch(cotisation::update)
                .delete(cotisation::delete),
        )
}
