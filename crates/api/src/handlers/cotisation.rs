//! Handlers for the `/cotisations` resource.
//!
//! Reads return the cotisation joined with its member
//! ([`CotisationDetail`]).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mutuelle_core::error::CoreError;
use mutuelle_core::types::DbId;
use mutuelle_db::lifecycle::CotisationLifecycle;
use mutuelle_db::models::cotisation::{
    CotisationDetail, CotisationFilter, CreateCotisation, UpdateCotisation,
};
use mutuelle_db::repositories::CotisationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Cotisation",
        id,
    })
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<CotisationDetail> {
    CotisationRepo::find_detail_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// POST /api/v1/cotisations
///
/// Explicit creation; the member's rights category is left as is.
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<CreateCotisation>,
) -> AppResult<(StatusCode, Json<CotisationDetail>)> {
    let cotisation = CotisationLifecycle::create_cotisation(&state.pool, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Adherent {} does not exist",
                input.adherent_id
            )))
        })?;

    let detail = load_detail(&state, cotisation.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/cotisations
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<CotisationFilter>,
) -> AppResult<Json<Vec<CotisationDetail>>> {
    let cotisations = CotisationRepo::list_details(&state.pool, &filter).await?;
    Ok(Json(cotisations))
}

/// GET /api/v1/cotisations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<CotisationDetail>> {
    Ok(Json(load_detail(&state, id).await?))
}

/// PUT|PATCH /api/v1/cotisations/{id}
///
/// `date_fin` is always recomputed; a status change is carried over to the
/// member's `a_droit`.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCotisation>,
) -> AppResult<Json<CotisationDetail>> {
    CotisationLifecycle::update_cotisation(&state.pool, id, &input, state.lifecycle_policy())
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(load_detail(&state, id).await?))
}

/// DELETE /api/v1/cotisations/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CotisationRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
