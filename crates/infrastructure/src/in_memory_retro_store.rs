use std::collections::HashMap;

use async_trait::async_trait;
use retroscope_application::RetroStore;
use retroscope_core::{AppError, AppResult};
use retroscope_domain::{
    AccessCode, Entry, EntryId, Retro, RetroId, Subscription, SubscriptionId, UserId, UserRecord,
    Vote, VoteId,
};
use tokio::sync::RwLock;

/// In-memory raw store implementation for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryRetroStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
    retros: RwLock<HashMap<RetroId, Retro>>,
    entries: RwLock<HashMap<EntryId, Entry>>,
    votes: RwLock<HashMap<VoteId, Vote>>,
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemoryRetroStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RetroStore for InMemoryRetroStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_user_by_subject(&self, subject: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.subject == subject)
            .cloned())
    }

    async fn find_user_by_billing_customer(
        &self,
        billing_customer_id: &str,
    ) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.billing_customer_id.as_deref() == Some(billing_customer_id))
            .cloned())
    }

    async fn insert_user(&self, user: UserRecord) -> AppResult<()> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id)
            || users.values().any(|existing| existing.subject == user.subject)
        {
            return Err(AppError::Conflict(format!(
                "user with subject '{}' already exists",
                user.subject
            )));
        }

        users.insert(user.id, user);
        Ok(())
    }

    async fn update_user(&self, user: UserRecord) -> AppResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                user.id
            )));
        }

        users.insert(user.id, user);
        Ok(())
    }

    async fn find_retro(&self, retro_id: RetroId) -> AppResult<Option<Retro>> {
        Ok(self.retros.read().await.get(&retro_id).cloned())
    }

    async fn find_retro_by_access_code(
        &self,
        access_code: &AccessCode,
    ) -> AppResult<Option<Retro>> {
        Ok(self
            .retros
            .read()
            .await
            .values()
            .find(|retro| retro.access_code() == access_code)
            .cloned())
    }

    async fn list_retros_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Retro>> {
        let retros = self.retros.read().await;
        let mut owned: Vec<Retro> = retros
            .values()
            .filter(|retro| retro.owner_id() == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.id().as_uuid().cmp(&right.id().as_uuid()))
        });

        Ok(owned)
    }

    async fn insert_retro(&self, retro: Retro) -> AppResult<()> {
        let mut retros = self.retros.write().await;

        if retros
            .values()
            .any(|existing| existing.access_code() == retro.access_code())
        {
            return Err(AppError::Conflict(format!(
                "access code '{}' is already in use",
                retro.access_code()
            )));
        }

        retros.insert(retro.id(), retro);
        Ok(())
    }

    async fn update_retro(&self, retro: Retro) -> AppResult<()> {
        let mut retros = self.retros.write().await;
        if !retros.contains_key(&retro.id()) {
            return Err(AppError::NotFound(format!(
                "retro '{}' does not exist",
                retro.id()
            )));
        }

        retros.insert(retro.id(), retro);
        Ok(())
    }

    async fn delete_retro(&self, retro_id: RetroId) -> AppResult<()> {
        if self.retros.write().await.remove(&retro_id).is_none() {
            return Err(AppError::NotFound(format!(
                "retro '{retro_id}' does not exist"
            )));
        }

        let mut entries = self.entries.write().await;
        let removed_entries: Vec<EntryId> = entries
            .values()
            .filter(|entry| entry.retro_id() == retro_id)
            .map(Entry::id)
            .collect();
        for entry_id in &removed_entries {
            entries.remove(entry_id);
        }

        self.votes
            .write()
            .await
            .retain(|_, vote| !removed_entries.contains(&vote.entry_id));

        Ok(())
    }

    async fn find_entry(&self, entry_id: EntryId) -> AppResult<Option<Entry>> {
        Ok(self.entries.read().await.get(&entry_id).cloned())
    }

    async fn list_entries_by_retro(&self, retro_id: RetroId) -> AppResult<Vec<Entry>> {
        let entries = self.entries.read().await;
        let mut listed: Vec<Entry> = entries
            .values()
            .filter(|entry| entry.retro_id() == retro_id)
            .cloned()
            .collect();
        listed.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().as_uuid().cmp(&right.id().as_uuid()))
        });

        Ok(listed)
    }

    async fn count_entries_by_retro(&self, retro_id: RetroId) -> AppResult<usize> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| entry.retro_id() == retro_id)
            .count())
    }

    async fn insert_entry(&self, entry: Entry) -> AppResult<()> {
        self.entries.write().await.insert(entry.id(), entry);
        Ok(())
    }

    async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()> {
        if self.entries.write().await.remove(&entry_id).is_none() {
            return Err(AppError::NotFound(format!(
                "entry '{entry_id}' does not exist"
            )));
        }

        self.votes
            .write()
            .await
            .retain(|_, vote| vote.entry_id != entry_id);

        Ok(())
    }

    async fn find_vote(&self, vote_id: VoteId) -> AppResult<Option<Vote>> {
        Ok(self.votes.read().await.get(&vote_id).cloned())
    }

    async fn find_vote_by_entry_and_participant(
        &self,
        entry_id: EntryId,
        participant_id: &str,
    ) -> AppResult<Option<Vote>> {
        Ok(self
            .votes
            .read()
            .await
            .values()
            .find(|vote| vote.entry_id == entry_id && vote.participant_id == participant_id)
            .cloned())
    }

    async fn list_votes_by_entry(&self, entry_id: EntryId) -> AppResult<Vec<Vote>> {
        let votes = self.votes.read().await;
        let mut listed: Vec<Vote> = votes
            .values()
            .filter(|vote| vote.entry_id == entry_id)
            .cloned()
            .collect();
        listed.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.as_uuid().cmp(&right.id.as_uuid()))
        });

        Ok(listed)
    }

    async fn upsert_vote(&self, vote: Vote) -> AppResult<()> {
        let mut votes = self.votes.write().await;
        votes.retain(|_, existing| {
            !(existing.entry_id == vote.entry_id
                && existing.participant_id == vote.participant_id)
        });
        votes.insert(vote.id, vote);

        Ok(())
    }

    async fn delete_vote(&self, vote_id: VoteId) -> AppResult<()> {
        if self.votes.write().await.remove(&vote_id).is_none() {
            return Err(AppError::NotFound(format!(
                "vote '{vote_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn find_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> AppResult<Option<Subscription>> {
        Ok(self.subscriptions.read().await.get(&subscription_id).cloned())
    }

    async fn find_subscription_by_billing_id(
        &self,
        billing_subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .find(|subscription| {
                subscription.billing_subscription_id == billing_subscription_id
            })
            .cloned())
    }

    async fn latest_subscription_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|subscription| subscription.user_id == user_id)
            .max_by(|left, right| {
                left.created_at
                    .cmp(&right.created_at)
                    .then_with(|| left.id.as_uuid().cmp(&right.id.as_uuid()))
            })
            .cloned())
    }

    async fn insert_subscription(&self, subscription: Subscription) -> AppResult<()> {
        let mut subscriptions = self.subscriptions.write().await;

        if subscriptions.values().any(|existing| {
            existing.billing_subscription_id == subscription.billing_subscription_id
        }) {
            return Err(AppError::Conflict(format!(
                "subscription '{}' already exists",
                subscription.billing_subscription_id
            )));
        }

        subscriptions.insert(subscription.id, subscription);
        Ok(())
    }

    async fn update_subscription(&self, subscription: Subscription) -> AppResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        if !subscriptions.contains_key(&subscription.id) {
            return Err(AppError::NotFound(format!(
                "subscription '{}' does not exist",
                subscription.id
            )));
        }

        subscriptions.insert(subscription.id, subscription);
        Ok(())
    }
}
