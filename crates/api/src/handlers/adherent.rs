//! Handlers for the `/adherents` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mutuelle_core::error::CoreError;
use mutuelle_core::types::DbId;
use mutuelle_db::lifecycle::CotisationLifecycle;
use mutuelle_db::models::adherent::{Adherent, AdherentFilter, CreateAdherent, UpdateAdherent};
use mutuelle_db::repositories::AdherentRepo;
use validator::Validate;

use crate::documents::RenderedDocument;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Adherent",
        id,
    })
}

/// POST /api/v1/adherents
///
/// Creates the member with its initial cotisation, then writes the
/// membership card.
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<CreateAdherent>,
) -> AppResult<(StatusCode, Json<Adherent>)> {
    input.validate()?;

    let (adherent, _) =
        CotisationLifecycle::create_adherent(&state.pool, &input, state.lifecycle_policy())
            .await?;

    state.documents.generate_card(&adherent).await;

    Ok((StatusCode::CREATED, Json(adherent)))
}

/// GET /api/v1/adherents
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<AdherentFilter>,
) -> AppResult<Json<Vec<Adherent>>> {
    let adherents = AdherentRepo::list(&state.pool, &filter).await?;
    Ok(Json(adherents))
}

/// GET /api/v1/adherents/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Adherent>> {
    let adherent = AdherentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(adherent))
}

/// PUT|PATCH /api/v1/adherents/{id}
///
/// Partial update. A change of `a_droit` is carried over to the cotisation.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAdherent>,
) -> AppResult<Json<Adherent>> {
    input.validate()?;

    let adherent =
        CotisationLifecycle::update_adherent(&state.pool, id, &input, state.lifecycle_policy())
            .await?
            .ok_or_else(|| not_found(id))?;
    Ok(Json(adherent))
}

/// DELETE /api/v1/adherents/{id}
///
/// Cotisations and soins are removed with the member.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if AdherentRepo::delete(&state.pool, id).await? {
        tracing::info!(adherent_id = id, user_id = user.user_id, "Adherent deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/adherents/{id}/carte
///
/// Membership card as a download, rendered from the current row.
pub async fn card(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<RenderedDocument> {
    let adherent = AdherentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    state
        .documents
        .render_card(&adherent)
        .map_err(|e| AppError::InternalError(e.to_string()))
}
