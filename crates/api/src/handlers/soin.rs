//! Handlers for the `/soins` resource.
//!
//! Every create or update rewrites the claim's receipt on disk.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mutuelle_core::error::CoreError;
use mutuelle_core::types::DbId;
use mutuelle_db::models::soin::{CreateSoin, SoinFilter, SoinWithAdherent, UpdateSoin};
use mutuelle_db::repositories::SoinRepo;
use validator::Validate;

use crate::documents::RenderedDocument;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Soin", id })
}

async fn load(state: &AppState, id: DbId) -> AppResult<SoinWithAdherent> {
    let mut conn = state.pool.acquire().await?;
    SoinRepo::find_with_adherent(&mut conn, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// POST /api/v1/soins
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<CreateSoin>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    input.validate()?;

    let soin = SoinRepo::create(&state.pool, &input).await?;
    tracing::info!(soin_id = soin.id, adherent_id = soin.adherent_id, "Soin created");

    let full = load(&state, soin.id).await?;
    state.documents.generate_receipt(&full).await;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Soin créé et reçu généré",
            id: soin.id,
        }),
    ))
}

/// GET /api/v1/soins
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<SoinFilter>,
) -> AppResult<Json<Vec<SoinWithAdherent>>> {
    let mut conn = state.pool.acquire().await?;
    let soins = SoinRepo::list_with_adherents(&mut conn, &filter).await?;
    Ok(Json(soins))
}

/// GET /api/v1/soins/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<SoinWithAdherent>> {
    Ok(Json(load(&state, id).await?))
}

/// PUT|PATCH /api/v1/soins/{id}
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSoin>,
) -> AppResult<Json<MessageResponse>> {
    input.validate()?;

    SoinRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    let full = load(&state, id).await?;
    state.documents.generate_receipt(&full).await;

    Ok(Json(MessageResponse {
        message: "Soin modifié et reçu mis à jour",
        id,
    }))
}

/// DELETE /api/v1/soins/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SoinRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/soins/{id}/recu
///
/// Receipt as a download, named after the receipt number.
pub async fn receipt(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<RenderedDocument> {
    let soin = load(&state, id).await?;
    state
        .documents
        .render_receipt(&soin)
        .map_err(|e| AppError::InternalError(e.to_string()))
}
