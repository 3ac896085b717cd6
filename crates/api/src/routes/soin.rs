//! Route definitions for the `/soins` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::soin;
use crate::state::AppState;

/// Routes mounted at `/soins`.
///
/// ```text
/// GET    /           -> list
/// POST   /           -> create
/// GET    /{id}       -> get_by_id
/// PUT    /{id}       -> update
/// PATCH  /{id}       -> update
/// DELETE /{id}       -> delete
/// GET    /{id}/recu  -> receipt
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(soin::list).post(soin::create))
        .route(
            "/{id}",
            get(soin::get_by_id)
                .put(soin::update)
                .patch(soin::update)
                .delete(soin::delete),
        )
        .route("/{id}/recu", get(soin::receipt))
}
