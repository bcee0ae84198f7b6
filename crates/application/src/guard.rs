use std::sync::Arc;

use retroscope_core::{AppError, AppResult};
use retroscope_domain::{
    Entry, EntryId, Retro, RetroId, Subscription, UserId, UserRecord, Vote, VoteId,
};

use crate::rules::{AccessRules, RuleScope};
use crate::store::RetroStore;

/// Authorization-wrapping storage facade handed to authenticated
/// handlers.
///
/// Mirrors the raw store's read/write surface and interposes the
/// access rules per document: reads failing a rule are silently
/// dropped (a denied single get is indistinguishable from a missing
/// document), writes failing a rule abort with [`AppError::Forbidden`]
/// before anything is written. Mutations are checked against the
/// current stored document, not the incoming one, so a caller cannot
/// launder ownership fields they may not set.
#[derive(Clone)]
pub struct GuardedStore {
    principal: Option<UserRecord>,
    raw: Arc<dyn RetroStore>,
}

impl GuardedStore {
    pub(crate) fn new(principal: Option<UserRecord>, raw: Arc<dyn RetroStore>) -> Self {
        Self { principal, raw }
    }

    fn scope(&self) -> RuleScope<'_> {
        RuleScope {
            principal: self.principal.as_ref(),
            raw: self.raw.as_ref(),
        }
    }

    async fn filter_read<T: AccessRules>(&self, doc: Option<T>) -> AppResult<Option<T>> {
        match doc {
            Some(doc) if T::allow_read(&self.scope(), &doc).await? => Ok(Some(doc)),
            _ => Ok(None),
        }
    }

    async fn filter_list<T: AccessRules>(&self, docs: Vec<T>) -> AppResult<Vec<T>> {
        let scope = self.scope();
        let mut visible = Vec::with_capacity(docs.len());
        for doc in docs {
            if T::allow_read(&scope, &doc).await? {
                visible.push(doc);
            }
        }

        Ok(visible)
    }

    async fn authorize_insert<T: AccessRules>(&self, doc: &T) -> AppResult<()> {
        if T::allow_insert(&self.scope(), doc).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden("not authorized".to_owned()))
        }
    }

    async fn authorize_modify<T: AccessRules>(&self, current: &T) -> AppResult<()> {
        if T::allow_modify(&self.scope(), current).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden("not authorized".to_owned()))
        }
    }

    // Users.

    /// Finds a user, filtered by the read rule.
    pub async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let doc = self.raw.find_user(user_id).await?;
        self.filter_read(doc).await
    }

    /// Inserts a user after the insert rule passes.
    pub async fn insert_user(&self, user: UserRecord) -> AppResult<()> {
        self.authorize_insert(&user).await?;
        self.raw.insert_user(user).await
    }

    /// Replaces a user row after the modify rule passes against the
    /// stored row.
    pub async fn update_user(&self, user: UserRecord) -> AppResult<()> {
        let current = self
            .raw
            .find_user(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}' does not exist", user.id)))?;
        self.authorize_modify(&current).await?;
        self.raw.update_user(user).await
    }

    // Retros.

    /// Finds a retro, filtered by the read rule.
    pub async fn find_retro(&self, retro_id: RetroId) -> AppResult<Option<Retro>> {
        let doc = self.raw.find_retro(retro_id).await?;
        self.filter_read(doc).await
    }

    /// Lists an owner's retros, filtered by the read rule.
    pub async fn list_retros_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Retro>> {
        let docs = self.raw.list_retros_by_owner(owner_id).await?;
        self.filter_list(docs).await
    }

    /// Inserts a retro after the insert rule passes.
    pub async fn insert_retro(&self, retro: Retro) -> AppResult<()> {
        self.authorize_insert(&retro).await?;
        self.raw.insert_retro(retro).await
    }

    /// Replaces a retro row after the modify rule passes against the
    /// stored row.
    pub async fn update_retro(&self, retro: Retro) -> AppResult<()> {
        let current = self
            .raw
            .find_retro(retro.id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("retro '{}' does not exist", retro.id())))?;
        self.authorize_modify(&current).await?;
        self.raw.update_retro(retro).await
    }

    /// Deletes a retro (cascading to entries and votes) after the
    /// modify rule passes.
    pub async fn delete_retro(&self, retro_id: RetroId) -> AppResult<()> {
        let current = self
            .raw
            .find_retro(retro_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("retro '{retro_id}' does not exist")))?;
        self.authorize_modify(&current).await?;
        self.raw.delete_retro(retro_id).await
    }

    // Entries.

    /// Finds an entry, filtered by the read rule.
    pub async fn find_entry(&self, entry_id: EntryId) -> AppResult<Option<Entry>> {
        let doc = self.raw.find_entry(entry_id).await?;
        self.filter_read(doc).await
    }

    /// Lists a retro's entries, filtered by the read rule.
    pub async fn list_entries_by_retro(&self, retro_id: RetroId) -> AppResult<Vec<Entry>> {
        let docs = self.raw.list_entries_by_retro(retro_id).await?;
        self.filter_list(docs).await
    }

    /// Entry inserts are always denied here; submission goes through
    /// the anonymous participation path.
    pub async fn insert_entry(&self, entry: Entry) -> AppResult<()> {
        self.authorize_insert(&entry).await?;
        self.raw.insert_entry(entry).await
    }

    /// Deletes an entry (cascading to its votes) after the modify rule
    /// passes.
    pub async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()> {
        let current = self
            .raw
            .find_entry(entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("entry '{entry_id}' does not exist")))?;
        self.authorize_modify(&current).await?;
        self.raw.delete_entry(entry_id).await
    }

    // Votes.

    /// Finds a vote, filtered by the read rule.
    pub async fn find_vote(&self, vote_id: VoteId) -> AppResult<Option<Vote>> {
        let doc = self.raw.find_vote(vote_id).await?;
        self.filter_read(doc).await
    }

    /// Lists an entry's votes, filtered by the read rule.
    pub async fn list_votes_by_entry(&self, entry_id: EntryId) -> AppResult<Vec<Vote>> {
        let docs = self.raw.list_votes_by_entry(entry_id).await?;
        self.filter_list(docs).await
    }

    /// Deletes a vote after the modify rule passes.
    pub async fn delete_vote(&self, vote_id: VoteId) -> AppResult<()> {
        let current = self
            .raw
            .find_vote(vote_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vote '{vote_id}' does not exist")))?;
        self.authorize_modify(&current).await?;
        self.raw.delete_vote(vote_id).await
    }

    // Subscriptions.

    /// Returns the caller-visible current subscription for a user.
    pub async fn latest_subscription_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<Subscription>> {
        let doc = self.raw.latest_subscription_for_user(user_id).await?;
        self.filter_read(doc).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use retroscope_core::AppError;
    use retroscope_domain::UserRecord;

    use crate::store::RetroStore;
    use crate::test_support::{seed_entry, seed_retro, seed_subscription, seed_user, seed_vote, store};

    use super::GuardedStore;

    fn guarded(
        principal: Option<&UserRecord>,
        raw: &Arc<crate::in_memory_retro_store::InMemoryRetroStore>,
    ) -> GuardedStore {
        GuardedStore::new(principal.cloned(), Arc::clone(raw) as Arc<dyn RetroStore>)
    }

    #[tokio::test]
    async fn owner_reads_their_full_ownership_chain() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;
        let vote = seed_vote(&raw, entry.id(), "participant-2").await;

        let guard = guarded(Some(&alice), &raw);
        assert!(guard.find_user(alice.id).await.ok().flatten().is_some());
        assert!(guard.find_retro(retro.id()).await.ok().flatten().is_some());
        assert!(guard.find_entry(entry.id()).await.ok().flatten().is_some());
        assert!(guard.find_vote(vote.id).await.ok().flatten().is_some());
        assert_eq!(
            guard
                .list_entries_by_retro(retro.id())
                .await
                .unwrap_or_default()
                .len(),
            1
        );
        assert_eq!(
            guard
                .list_votes_by_entry(entry.id())
                .await
                .unwrap_or_default()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn cross_owner_documents_read_as_absent() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let bob = seed_user(&raw, "idp|bob").await;
        let retro_a = seed_retro(&raw, &alice, "ABCD2345").await;
        let retro_b = seed_retro(&raw, &bob, "EFGH2345").await;
        let entry_1 = seed_entry(&raw, retro_a.id(), "participant-1").await;
        let entry_2 = seed_entry(&raw, retro_b.id(), "participant-1").await;
        let vote_1 = seed_vote(&raw, entry_1.id(), "participant-2").await;

        let alice_guard = guarded(Some(&alice), &raw);
        assert!(alice_guard.find_entry(entry_1.id()).await.ok().flatten().is_some());
        assert!(alice_guard.find_entry(entry_2.id()).await.ok().flatten().is_none());
        assert!(alice_guard.find_retro(retro_b.id()).await.ok().flatten().is_none());
        assert!(alice_guard.find_user(bob.id).await.ok().flatten().is_none());

        let bob_guard = guarded(Some(&bob), &raw);
        assert!(bob_guard.find_vote(vote_1.id).await.ok().flatten().is_none());
        assert_eq!(
            bob_guard
                .list_votes_by_entry(entry_1.id())
                .await
                .unwrap_or_default()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn unauthenticated_guard_reads_nothing() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;
        let vote = seed_vote(&raw, entry.id(), "participant-2").await;
        let subscription = seed_subscription(&raw, &alice, "sub_1").await;

        let guard = guarded(None, &raw);
        assert!(guard.find_user(alice.id).await.ok().flatten().is_none());
        assert!(guard.find_retro(retro.id()).await.ok().flatten().is_none());
        assert!(guard.find_entry(entry.id()).await.ok().flatten().is_none());
        assert!(guard.find_vote(vote.id).await.ok().flatten().is_none());
        assert!(
            guard
                .latest_subscription_for_user(subscription.user_id)
                .await
                .ok()
                .flatten()
                .is_none()
        );
        assert_eq!(
            guard
                .list_retros_by_owner(alice.id)
                .await
                .unwrap_or_default()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn dangling_parents_deny_instead_of_failing() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;

        // Entry pointing at a retro that was never stored.
        let entry = seed_entry(&raw, retroscope_domain::RetroId::new(), "participant-1").await;
        let vote = seed_vote(&raw, entry.id(), "participant-2").await;

        let guard = guarded(Some(&alice), &raw);
        assert!(guard.find_entry(entry.id()).await.ok().flatten().is_none());
        assert!(guard.find_vote(vote.id).await.ok().flatten().is_none());
        assert!(matches!(
            guard.delete_entry(entry.id()).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn rejected_modify_leaves_document_unchanged() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let bob = seed_user(&raw, "idp|bob").await;
        let retro_b = seed_retro(&raw, &bob, "EFGH2345").await;

        let mut hijacked = retro_b.clone();
        hijacked.rename("taken over").unwrap_or_else(|_| unreachable!());

        let alice_guard = guarded(Some(&alice), &raw);
        assert!(matches!(
            alice_guard.update_retro(hijacked).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            alice_guard.delete_retro(retro_b.id()).await,
            Err(AppError::Forbidden(_))
        ));

        let stored = raw.find_retro(retro_b.id()).await.ok().flatten();
        assert_eq!(stored.as_ref().map(|retro| retro.title()), Some("Sprint retro"));
    }

    #[tokio::test]
    async fn entry_inserts_stay_denied_even_for_the_owner() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = retroscope_domain::Entry::new(
            retroscope_domain::EntryId::new(),
            retro.id(),
            "glad",
            "smuggled through the guard",
            "participant-1",
            chrono::Utc::now(),
        )
        .unwrap_or_else(|_| unreachable!());

        let guard = guarded(Some(&alice), &raw);
        assert!(matches!(
            guard.insert_entry(entry.clone()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(raw.find_entry(entry.id()).await.ok().flatten().is_none());
    }

    #[tokio::test]
    async fn subscription_reads_are_owner_scoped() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let bob = seed_user(&raw, "idp|bob").await;
        seed_subscription(&raw, &alice, "sub_1").await;

        let alice_guard = guarded(Some(&alice), &raw);
        assert!(
            alice_guard
                .latest_subscription_for_user(alice.id)
                .await
                .ok()
                .flatten()
                .is_some()
        );

        let bob_guard = guarded(Some(&bob), &raw);
        assert!(
            bob_guard
                .latest_subscription_for_user(alice.id)
                .await
                .ok()
                .flatten()
                .is_none()
        );
    }
}
