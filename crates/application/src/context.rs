use std::sync::Arc;

use retroscope_core::{AppError, AppResult, IdentityClaim};
use retroscope_domain::UserRecord;

use crate::guard::GuardedStore;
use crate::store::RetroStore;

/// Resolves an identity claim to a local user row.
///
/// Absence of a claim, or a claim whose subject has no local row yet
/// (the identity-provider account can exist before the first sync), is
/// `None` rather than an error; callers decide whether that is fatal.
pub async fn resolve_principal(
    raw: &dyn RetroStore,
    claim: Option<&IdentityClaim>,
) -> AppResult<Option<UserRecord>> {
    match claim {
        Some(claim) => raw.find_user_by_subject(claim.subject()).await,
        None => Ok(None),
    }
}

/// Per-call authorization context handed to business logic.
///
/// Handlers receive only the guarded store; the raw store stays inside
/// rule evaluation.
pub struct RequestContext {
    principal: Option<UserRecord>,
    store: GuardedStore,
}

impl RequestContext {
    /// Returns the resolved caller, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&UserRecord> {
        self.principal.as_ref()
    }

    /// Returns the resolved caller or an authentication failure.
    pub fn require_principal(&self) -> AppResult<&UserRecord> {
        self.principal
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
    }

    /// Returns the guarded store bound to the caller.
    #[must_use]
    pub fn store(&self) -> &GuardedStore {
        &self.store
    }
}

/// Builds request-scoped authorization contexts.
///
/// Constructed once at process start around the chosen store adapter;
/// each call gets a fresh context with identity resolved exactly once.
#[derive(Clone)]
pub struct ContextBuilder {
    raw: Arc<dyn RetroStore>,
}

impl ContextBuilder {
    /// Creates a context builder over a raw store.
    #[must_use]
    pub fn new(raw: Arc<dyn RetroStore>) -> Self {
        Self { raw }
    }

    /// Builds a read context; a missing identity yields a context whose
    /// guarded store denies every read rather than an error.
    pub async fn read_context(&self, claim: Option<&IdentityClaim>) -> AppResult<RequestContext> {
        let principal = resolve_principal(self.raw.as_ref(), claim).await?;

        Ok(RequestContext {
            store: GuardedStore::new(principal.clone(), Arc::clone(&self.raw)),
            principal,
        })
    }

    /// Builds a write context; aborts with an authentication failure
    /// before any facade exists when no principal resolves.
    pub async fn write_context(&self, claim: Option<&IdentityClaim>) -> AppResult<RequestContext> {
        let principal = resolve_principal(self.raw.as_ref(), claim)
            .await?
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

        Ok(RequestContext {
            store: GuardedStore::new(Some(principal.clone()), Arc::clone(&self.raw)),
            principal: Some(principal),
        })
    }
}
