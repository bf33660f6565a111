//! Lifecycle endpoints: partner CRUD, submission, moderation.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::common::{EstablishmentId, Page, PageRequest};
use crate::domains::establishments::effects;
use crate::domains::establishments::effects::ModerationAction;
use crate::domains::establishments::models::{Establishment, EstablishmentPatch, NewEstablishment};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::routes::{actor_from_headers, moderator_from_headers, partner_from_headers};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ModerateBody {
    pub action: ModerationAction,
    #[serde(default)]
    pub notes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct SuspendBody {
    pub reason: String,
}

pub async fn create_establishment_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewEstablishment>,
) -> Result<(StatusCode, Json<Establishment>), ApiError> {
    let partner_id = partner_from_headers(&headers)?;
    let establishment =
        effects::create_establishment(partner_id, input, state.audit.as_ref(), &state.db_pool)
            .await?;
    Ok((StatusCode::CREATED, Json(establishment)))
}

pub async fn get_establishment_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Establishment>, ApiError> {
    let establishment =
        effects::get_establishment(EstablishmentId::from_uuid(id), &state.db_pool).await?;
    Ok(Json(establishment))
}

pub async fn update_establishment_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(patch): Json<EstablishmentPatch>,
) -> Result<Json<Establishment>, ApiError> {
    let partner_id = partner_from_headers(&headers)?;
    let establishment = effects::update_establishment(
        EstablishmentId::from_uuid(id),
        partner_id,
        patch,
        state.audit.as_ref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(establishment))
}

pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Establishment>, ApiError> {
    let partner_id = partner_from_headers(&headers)?;
    let establishment = effects::submit_for_moderation(
        EstablishmentId::from_uuid(id),
        partner_id,
        state.audit.as_ref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(establishment))
}

pub async fn moderate_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<ModerateBody>,
) -> Result<Json<Establishment>, ApiError> {
    let moderator_id = moderator_from_headers(&headers)?;
    let establishment = effects::moderate(
        EstablishmentId::from_uuid(id),
        moderator_id,
        body.action,
        body.notes,
        state.audit.as_ref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(establishment))
}

pub async fn suspend_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<SuspendBody>,
) -> Result<Json<Establishment>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let establishment = effects::suspend(
        EstablishmentId::from_uuid(id),
        actor,
        body.reason,
        state.audit.as_ref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(establishment))
}

pub async fn unsuspend_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Establishment>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let establishment = effects::unsuspend(
        EstablishmentId::from_uuid(id),
        actor,
        state.audit.as_ref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(establishment))
}

pub async fn archive_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Establishment>, ApiError> {
    let moderator_id = moderator_from_headers(&headers)?;
    let establishment = effects::archive(
        EstablishmentId::from_uuid(id),
        moderator_id,
        state.audit.as_ref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(establishment))
}

pub async fn list_own_establishments_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Establishment>>, ApiError> {
    let partner_id = partner_from_headers(&headers)?;
    let page = PageRequest::new(query.limit, query.offset)?;
    let result = effects::list_by_partner(partner_id, page, &state.db_pool).await?;
    Ok(Json(result))
}

pub async fn moderation_queue_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Establishment>>, ApiError> {
    moderator_from_headers(&headers)?;
    let page = PageRequest::new(query.limit, query.offset)?;
    let result = effects::list_pending_moderation(page, &state.db_pool).await?;
    Ok(Json(result))
}
