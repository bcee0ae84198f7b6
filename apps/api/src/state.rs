use std::sync::Arc;

use jsonwebtoken::{DecodingKey, Validation};
use retroscope_application::{AccountService, BillingService, ParticipationService, RetroService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub billing_service: BillingService,
    pub participation_service: ParticipationService,
    pub retro_service: RetroService,
    pub jwt_decoding_key: Arc<DecodingKey>,
    pub jwt_validation: Validation,
    pub webhook_secret_digest: [u8; 32],
}
