use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use retroscope_application::RetroPatch;
use retroscope_core::{AppError, IdentityClaim};
use retroscope_domain::{EntryId, RetroFormat, RetroId};
use uuid::Uuid;

use crate::dto::{
    CreateRetroRequest, EntryResponse, RetroResponse, SubscriptionResponse, UpdateRetroRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_retro_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
    Json(payload): Json<CreateRetroRequest>,
) -> ApiResult<(StatusCode, Json<RetroResponse>)> {
    let format = RetroFormat::from_str(payload.format.as_str())?;
    let retro = state
        .retro_service
        .create_retro(claim.as_ref(), payload.title.as_str(), format)
        .await?;

    Ok((StatusCode::CREATED, Json(RetroResponse::from(retro))))
}

pub async fn list_retros_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
) -> ApiResult<Json<Vec<RetroResponse>>> {
    let retros = state
        .retro_service
        .list_retros(claim.as_ref())
        .await?
        .into_iter()
        .map(RetroResponse::from)
        .collect();

    Ok(Json(retros))
}

pub async fn get_retro_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
    Path(retro_id): Path<Uuid>,
) -> ApiResult<Json<RetroResponse>> {
    let retro = state
        .retro_service
        .get_retro(claim.as_ref(), RetroId::from_uuid(retro_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("retro '{retro_id}' does not exist")))?;

    Ok(Json(RetroResponse::from(retro)))
}

pub async fn update_retro_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
    Path(retro_id): Path<Uuid>,
    Json(payload): Json<UpdateRetroRequest>,
) -> ApiResult<Json<RetroResponse>> {
    let format = payload
        .format
        .as_deref()
        .map(RetroFormat::from_str)
        .transpose()?;
    let retro = state
        .retro_service
        .update_retro(
            claim.as_ref(),
            RetroId::from_uuid(retro_id),
            RetroPatch {
                title: payload.title,
                format,
                closed: payload.closed,
            },
        )
        .await?;

    Ok(Json(RetroResponse::from(retro)))
}

pub async fn delete_retro_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
    Path(retro_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .retro_service
        .delete_retro(claim.as_ref(), RetroId::from_uuid(retro_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_entries_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
    Path(retro_id): Path<Uuid>,
) -> ApiResult<Json<Vec<EntryResponse>>> {
    let entries = state
        .retro_service
        .list_entries(claim.as_ref(), RetroId::from_uuid(retro_id))
        .await?
        .into_iter()
        .map(EntryResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
    Path((_retro_id, entry_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .retro_service
        .delete_entry(claim.as_ref(), EntryId::from_uuid(entry_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_subscription_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
) -> ApiResult<Json<Option<SubscriptionResponse>>> {
    let subscription = state
        .retro_service
        .current_subscription(claim.as_ref())
        .await?;

    Ok(Json(subscription.map(SubscriptionResponse::from)))
}
