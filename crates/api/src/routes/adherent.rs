//! Route definitions for the `/adherents` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::adherent;
use crate::state::AppState;

/// Routes mounted at `/adherents`.
///
/// ```text
/// GET    /            -> list
/// POST   /            -> create
/// GET    /{id}        -> get_by_id
/// PUT    /{id}        -> update
/// PATCH  /{id}        -> update
/// DELETE /{id}        -> delete
/// GET    /{id}/carte  -> card
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(adherent::list).post(adherent::create))
        .route(
            "/{id}",
            get(adherent::get_by_id)
                .put(adherent::update)
                .patch(adherent::update)
                .delete(adherent::delete),
        )
        .route("/{id}/carte", get(adherent::card))
}
