pub mod adherent;
pub mod auth;
pub mod cotisation;
pub mod health;
pub mod soin;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 signup (public)
/// /auth/login                  login (public)
/// /auth/refresh                refresh (public)
/// /auth/logout                 logout (requires auth)
/// /auth/me                     current user (requires auth)
///
/// /adherents                   list, create
/// /adherents/{id}              get, update, delete
/// /adherents/{id}/carte        membership card download
///
/// /cotisations                 list, create
/// /cotisations/{id}            get, update, delete
///
/// /soins                       list, create
/// /soins/{id}                  get, update, delete
/// /soins/{id}/recu             receipt download
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/adherents", adherent::router())
        .nest("/cotisations", cotisation::router())
        .nest("/soins", soin::router())
}
