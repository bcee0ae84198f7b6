use async_trait::async_trait;
use retroscope_core::AppResult;
use retroscope_domain::{Entry, Retro, Subscription, UserRecord, Vote};

use crate::store::RetroStore;

/// Evaluation scope handed to access rules.
///
/// Rules receive the raw store as an explicit, distinctly-typed
/// parameter so that ownership-chain lookups structurally cannot go
/// through the guarded facade. Routing a chain lookup through the
/// guard would recurse into rule evaluation for the intermediate
/// documents and false-deny multi-hop chains.
#[derive(Clone, Copy)]
pub struct RuleScope<'a> {
    /// Resolved caller, or `None` when unauthenticated.
    pub principal: Option<&'a UserRecord>,
    /// Unfiltered storage for ownership-chain lookups only.
    pub raw: &'a dyn RetroStore,
}

/// Per-document access rules for one entity kind.
///
/// Operations without an override keep the fail-closed defaults:
/// `allow_modify` falls back to `allow_read`, `allow_insert` denies.
/// Rules are pure lookups; a dangling parent reference evaluates to
/// `false`, never an error.
#[async_trait]
pub trait AccessRules: Sized + Send + Sync {
    /// Decides whether the caller may see the document.
    async fn allow_read(scope: &RuleScope<'_>, doc: &Self) -> AppResult<bool>;

    /// Decides whether the caller may patch, replace, or delete the
    /// document, evaluated against its pre-mutation state.
    async fn allow_modify(scope: &RuleScope<'_>, doc: &Self) -> AppResult<bool> {
        Self::allow_read(scope, doc).await
    }

    /// Decides whether the caller may insert the proposed document.
    async fn allow_insert(_scope: &RuleScope<'_>, _doc: &Self) -> AppResult<bool> {
        Ok(false)
    }
}

#[async_trait]
impl AccessRules for UserRecord {
    async fn allow_read(scope: &RuleScope<'_>, doc: &Self) -> AppResult<bool> {
        Ok(scope
            .principal
            .map(|principal| principal.id == doc.id)
            .unwrap_or(false))
    }

    // Best effort only: the real creation path is the privileged
    // account-sync upsert, which bypasses this rule.
    async fn allow_insert(scope: &RuleScope<'_>, _doc: &Self) -> AppResult<bool> {
        Ok(scope.principal.is_some())
    }
}

#[async_trait]
impl AccessRules for Retro {
    async fn allow_read(scope: &RuleScope<'_>, doc: &Self) -> AppResult<bool> {
        Ok(scope
            .principal
            .map(|principal| principal.id == doc.owner_id())
            .unwrap_or(false))
    }

    async fn allow_insert(scope: &RuleScope<'_>, _doc: &Self) -> AppResult<bool> {
        Ok(scope.principal.is_some())
    }
}

#[async_trait]
impl AccessRules for Entry {
    async fn allow_read(scope: &RuleScope<'_>, doc: &Self) -> AppResult<bool> {
        let Some(principal) = scope.principal else {
            return Ok(false);
        };

        Ok(scope
            .raw
            .find_retro(doc.retro_id())
            .await?
            .map(|retro| retro.owner_id() == principal.id)
            .unwrap_or(false))
    }

    // Inserts stay denied: entry creation always goes through the
    // anonymous participation path.
}

#[async_trait]
impl AccessRules for Vote {
    async fn allow_read(scope: &RuleScope<'_>, doc: &Self) -> AppResult<bool> {
        let Some(principal) = scope.principal else {
            return Ok(false);
        };

        let Some(entry) = scope.raw.find_entry(doc.entry_id).await? else {
            return Ok(false);
        };

        Ok(scope
            .raw
            .find_retro(entry.retro_id())
            .await?
            .map(|retro| retro.owner_id() == principal.id)
            .unwrap_or(false))
    }
}

#[async_trait]
impl AccessRules for Subscription {
    async fn allow_read(scope: &RuleScope<'_>, doc: &Self) -> AppResult<bool> {
        Ok(scope
            .principal
            .map(|principal| principal.id == doc.user_id)
            .unwrap_or(false))
    }

    // Inserts stay denied: subscriptions are written only by the
    // billing webhook path.
}

#[cfg(test)]
mod tests {
    use retroscope_domain::{UserRecord, Vote};

    use crate::test_support::{seed_entry, seed_retro, seed_user, seed_vote, store};

    use super::{AccessRules, RuleScope};

    #[tokio::test]
    async fn vote_reads_resolve_the_chain_through_the_raw_store() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let bob = seed_user(&raw, "idp|bob").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;
        let vote = seed_vote(&raw, entry.id(), "participant-2").await;

        let alice_scope = RuleScope {
            principal: Some(&alice),
            raw: raw.as_ref(),
        };
        assert_eq!(Vote::allow_read(&alice_scope, &vote).await.ok(), Some(true));

        let bob_scope = RuleScope {
            principal: Some(&bob),
            raw: raw.as_ref(),
        };
        assert_eq!(Vote::allow_read(&bob_scope, &vote).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn modify_falls_back_to_read_when_not_overridden() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;

        let scope = RuleScope {
            principal: Some(&alice),
            raw: raw.as_ref(),
        };
        assert_eq!(
            retroscope_domain::Entry::allow_modify(&scope, &entry).await.ok(),
            Some(true)
        );
    }

    #[tokio::test]
    async fn user_rows_are_visible_only_to_themselves() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let bob = seed_user(&raw, "idp|bob").await;

        let scope = RuleScope {
            principal: Some(&alice),
            raw: raw.as_ref(),
        };
        assert_eq!(UserRecord::allow_read(&scope, &alice).await.ok(), Some(true));
        assert_eq!(UserRecord::allow_read(&scope, &bob).await.ok(), Some(false));
    }
}
