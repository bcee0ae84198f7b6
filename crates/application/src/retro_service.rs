use chrono::Utc;
use retroscope_core::{AppError, AppResult, IdentityClaim};
use retroscope_domain::{
    AccessCode, Entry, EntryId, Retro, RetroFormat, RetroId, Subscription, UserRecord,
};

use crate::context::ContextBuilder;

/// Access-code collision retries before giving up.
const ACCESS_CODE_ATTEMPTS: usize = 5;

/// Partial update for a retro board.
#[derive(Debug, Default, Clone)]
pub struct RetroPatch {
    /// New title, if renaming.
    pub title: Option<String>,
    /// New format, if switching.
    pub format: Option<RetroFormat>,
    /// New open/closed state, if toggling.
    pub closed: Option<bool>,
}

/// Owner-facing board operations, all through the guarded store.
#[derive(Clone)]
pub struct RetroService {
    contexts: ContextBuilder,
}

impl RetroService {
    /// Creates the service from a context builder.
    #[must_use]
    pub fn new(contexts: ContextBuilder) -> Self {
        Self { contexts }
    }

    /// Creates a board for the authenticated caller.
    ///
    /// Enforces the caller's plan-tier board limit and retries
    /// access-code generation on collision.
    pub async fn create_retro(
        &self,
        claim: Option<&IdentityClaim>,
        title: &str,
        format: RetroFormat,
    ) -> AppResult<Retro> {
        let context = self.contexts.write_context(claim).await?;
        let principal = context.require_principal()?;

        if let Some(max_retros) = principal.plan.max_retros() {
            let owned = context.store().list_retros_by_owner(principal.id).await?;
            if owned.len() >= max_retros {
                return Err(AppError::Forbidden(format!(
                    "the {} plan allows at most {max_retros} retros",
                    principal.plan.as_str()
                )));
            }
        }

        for _ in 0..ACCESS_CODE_ATTEMPTS {
            let retro = Retro::new(
                RetroId::new(),
                principal.id,
                title,
                format,
                AccessCode::generate()?,
                false,
                Utc::now(),
            )?;

            match context.store().insert_retro(retro.clone()).await {
                Ok(()) => return Ok(retro),
                Err(AppError::Conflict(_)) => continue,
                Err(error) => return Err(error),
            }
        }

        Err(AppError::Internal(
            "could not allocate a unique access code".to_owned(),
        ))
    }

    /// Lists the caller's boards; unauthenticated callers see none.
    pub async fn list_retros(&self, claim: Option<&IdentityClaim>) -> AppResult<Vec<Retro>> {
        let context = self.contexts.read_context(claim).await?;
        let Some(principal) = context.principal() else {
            return Ok(Vec::new());
        };

        context.store().list_retros_by_owner(principal.id).await
    }

    /// Fetches one board; unauthorized boards read as absent.
    pub async fn get_retro(
        &self,
        claim: Option<&IdentityClaim>,
        retro_id: RetroId,
    ) -> AppResult<Option<Retro>> {
        let context = self.contexts.read_context(claim).await?;
        context.store().find_retro(retro_id).await
    }

    /// Applies a partial update to a board the caller owns.
    pub async fn update_retro(
        &self,
        claim: Option<&IdentityClaim>,
        retro_id: RetroId,
        patch: RetroPatch,
    ) -> AppResult<Retro> {
        let context = self.contexts.write_context(claim).await?;
        let mut retro = context
            .store()
            .find_retro(retro_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("retro '{retro_id}' does not exist")))?;

        if let Some(title) = patch.title {
            retro.rename(title)?;
        }
        if let Some(format) = patch.format {
            retro.set_format(format);
        }
        if let Some(closed) = patch.closed {
            retro.set_closed(closed);
        }

        context.store().update_retro(retro.clone()).await?;
        Ok(retro)
    }

    /// Deletes a board the caller owns, cascading entries and votes.
    pub async fn delete_retro(
        &self,
        claim: Option<&IdentityClaim>,
        retro_id: RetroId,
    ) -> AppResult<()> {
        let context = self.contexts.write_context(claim).await?;
        context.store().delete_retro(retro_id).await
    }

    /// Lists entries on a board the caller owns.
    pub async fn list_entries(
        &self,
        claim: Option<&IdentityClaim>,
        retro_id: RetroId,
    ) -> AppResult<Vec<Entry>> {
        let context = self.contexts.read_context(claim).await?;
        context.store().list_entries_by_retro(retro_id).await
    }

    /// Removes an entry from a board the caller owns (moderation),
    /// cascading its votes.
    pub async fn delete_entry(
        &self,
        claim: Option<&IdentityClaim>,
        entry_id: EntryId,
    ) -> AppResult<()> {
        let context = self.contexts.write_context(claim).await?;
        context.store().delete_entry(entry_id).await
    }

    /// Returns the caller's own user row, if one exists.
    pub async fn me(&self, claim: Option<&IdentityClaim>) -> AppResult<Option<UserRecord>> {
        let context = self.contexts.read_context(claim).await?;
        let Some(principal) = context.principal() else {
            return Ok(None);
        };

        context.store().find_user(principal.id).await
    }

    /// Returns the caller's current subscription, if any.
    pub async fn current_subscription(
        &self,
        claim: Option<&IdentityClaim>,
    ) -> AppResult<Option<Subscription>> {
        let context = self.contexts.read_context(claim).await?;
        let Some(principal) = context.principal() else {
            return Ok(None);
        };

        context
            .store()
            .latest_subscription_for_user(principal.id)
            .await
    }
}
