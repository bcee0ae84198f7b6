use axum::Json;
use axum::extract::{Extension, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use retroscope_core::{AppError, IdentityClaim};
use serde::Deserialize;

use crate::dto::UserResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Claims read from a verified bearer token.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies the bearer token, if one is presented, and attaches the
/// resulting identity to the request.
///
/// A missing token is not an error here; read paths tolerate anonymous
/// callers and write contexts reject them downstream. A token that is
/// present but fails verification aborts the request.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let claim = match bearer_token(&request) {
        Some(token) => Some(verify_token(&state, token)?),
        None => None,
    };

    request.extensions_mut().insert(claim);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn verify_token(state: &AppState, token: &str) -> Result<IdentityClaim, AppError> {
    let data =
        jsonwebtoken::decode::<TokenClaims>(token, &state.jwt_decoding_key, &state.jwt_validation)
            .map_err(|error| AppError::Unauthorized(format!("invalid bearer token: {error}")))?;

    Ok(IdentityClaim::new(
        data.claims.sub,
        data.claims.name,
        data.claims.email,
    ))
}

pub async fn sync_account_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
) -> ApiResult<Json<UserResponse>> {
    let claim =
        claim.ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let user = state.account_service.sync_account(&claim).await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<Option<IdentityClaim>>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .retro_service
        .me(claim.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("no account for this identity".to_owned()))?;

    Ok(Json(UserResponse::from(user)))
}
