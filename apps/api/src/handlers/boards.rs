use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use retroscope_domain::EntryId;
use uuid::Uuid;

use crate::dto::{
    BoardQuery, BoardSnapshotResponse, CastVoteRequest, EntryResponse, SubmitEntryRequest,
    VoteQuery, VoteResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn board_snapshot_handler(
    State(state): State<AppState>,
    Path(access_code): Path<String>,
    Query(query): Query<BoardQuery>,
) -> ApiResult<Json<BoardSnapshotResponse>> {
    let snapshot = state
        .participation_service
        .board_snapshot(access_code.as_str(), query.participant_id.as_deref())
        .await?;

    Ok(Json(BoardSnapshotResponse::from(snapshot)))
}

pub async fn submit_entry_handler(
    State(state): State<AppState>,
    Path(access_code): Path<String>,
    Json(payload): Json<SubmitEntryRequest>,
) -> ApiResult<(StatusCode, Json<EntryResponse>)> {
    let entry = state
        .participation_service
        .submit_entry(
            access_code.as_str(),
            payload.participant_id.as_str(),
            payload.category.as_str(),
            payload.content.as_str(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EntryResponse::from(entry))))
}

pub async fn cast_vote_handler(
    State(state): State<AppState>,
    Path((access_code, entry_id)): Path<(String, Uuid)>,
    Json(payload): Json<CastVoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let vote = state
        .participation_service
        .cast_vote(
            access_code.as_str(),
            EntryId::from_uuid(entry_id),
            payload.participant_id.as_str(),
            payload.value,
        )
        .await?;

    Ok(Json(VoteResponse::from(vote)))
}

pub async fn retract_vote_handler(
    State(state): State<AppState>,
    Path((access_code, entry_id)): Path<(String, Uuid)>,
    Query(query): Query<VoteQuery>,
) -> ApiResult<StatusCode> {
    state
        .participation_service
        .retract_vote(
            access_code.as_str(),
            EntryId::from_uuid(entry_id),
            query.participant_id.as_str(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
