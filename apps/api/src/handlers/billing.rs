use std::str::FromStr;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use retroscope_application::SubscriptionEvent;
use retroscope_core::AppError;
use retroscope_domain::{SubscriptionStatus, UserId};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::dto::BillingWebhookRequest;
use crate::error::ApiResult;
use crate::state::AppState;

const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

pub async fn billing_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BillingWebhookRequest>,
) -> ApiResult<StatusCode> {
    verify_webhook_secret(&state, &headers)?;

    let event = SubscriptionEvent {
        billing_customer_id: payload.billing_customer_id,
        billing_subscription_id: payload.billing_subscription_id,
        price_id: payload.price_id,
        status: SubscriptionStatus::from_str(payload.status.as_str())?,
        current_period_end: payload.current_period_end,
        cancel_at_period_end: payload.cancel_at_period_end,
        client_reference: payload.client_reference.map(UserId::from_uuid),
    };

    let billing_subscription_id = event.billing_subscription_id.clone();
    state.billing_service.apply_subscription_event(event).await?;
    info!(%billing_subscription_id, "applied billing subscription event");

    Ok(StatusCode::NO_CONTENT)
}

fn verify_webhook_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing webhook secret".to_owned()))?;

    let digest: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
    if digest != state.webhook_secret_digest {
        return Err(AppError::Unauthorized("invalid webhook secret".to_owned()));
    }

    Ok(())
}
