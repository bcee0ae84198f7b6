use async_trait::async_trait;
use retroscope_core::AppResult;
use retroscope_domain::{
    AccessCode, Entry, EntryId, Retro, RetroId, Subscription, SubscriptionId, UserId, UserRecord,
    Vote, VoteId,
};

/// Raw storage port with no authorization filtering.
///
/// Implementations provide per-document atomic writes and
/// secondary-index lookups; they do not interpret ownership. Only three
/// kinds of code may hold this port directly: access-rule evaluation
/// (via [`crate::RuleScope`]), the anonymous participation path, and
/// the billing webhook path. Authenticated handlers go through
/// [`crate::GuardedStore`].
#[async_trait]
pub trait RetroStore: Send + Sync {
    // Users.

    /// Finds a user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Finds a user by external-identity subject.
    async fn find_user_by_subject(&self, subject: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by denormalized billing customer reference.
    async fn find_user_by_billing_customer(
        &self,
        billing_customer_id: &str,
    ) -> AppResult<Option<UserRecord>>;

    /// Inserts a new user row; conflicts on duplicate subject.
    async fn insert_user(&self, user: UserRecord) -> AppResult<()>;

    /// Replaces an existing user row by id.
    async fn update_user(&self, user: UserRecord) -> AppResult<()>;

    // Retros.

    /// Finds a retro by id.
    async fn find_retro(&self, retro_id: RetroId) -> AppResult<Option<Retro>>;

    /// Finds a retro by its shareable access code.
    async fn find_retro_by_access_code(&self, access_code: &AccessCode)
    -> AppResult<Option<Retro>>;

    /// Lists retros owned by a user, newest first.
    async fn list_retros_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Retro>>;

    /// Inserts a new retro; conflicts on duplicate access code.
    async fn insert_retro(&self, retro: Retro) -> AppResult<()>;

    /// Replaces an existing retro row by id.
    async fn update_retro(&self, retro: Retro) -> AppResult<()>;

    /// Deletes a retro and cascades to its entries and their votes.
    async fn delete_retro(&self, retro_id: RetroId) -> AppResult<()>;

    // Entries.

    /// Finds an entry by id.
    async fn find_entry(&self, entry_id: EntryId) -> AppResult<Option<Entry>>;

    /// Lists entries on a retro, oldest first.
    async fn list_entries_by_retro(&self, retro_id: RetroId) -> AppResult<Vec<Entry>>;

    /// Counts entries on a retro.
    async fn count_entries_by_retro(&self, retro_id: RetroId) -> AppResult<usize>;

    /// Inserts a new entry.
    async fn insert_entry(&self, entry: Entry) -> AppResult<()>;

    /// Deletes an entry and cascades to its votes.
    async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()>;

    // Votes.

    /// Finds a vote by id.
    async fn find_vote(&self, vote_id: VoteId) -> AppResult<Option<Vote>>;

    /// Finds a participant's vote on an entry.
    async fn find_vote_by_entry_and_participant(
        &self,
        entry_id: EntryId,
        participant_id: &str,
    ) -> AppResult<Option<Vote>>;

    /// Lists votes on an entry.
    async fn list_votes_by_entry(&self, entry_id: EntryId) -> AppResult<Vec<Vote>>;

    /// Inserts or replaces the vote for its (entry, participant) pair.
    async fn upsert_vote(&self, vote: Vote) -> AppResult<()>;

    /// Deletes a vote by id.
    async fn delete_vote(&self, vote_id: VoteId) -> AppResult<()>;

    // Subscriptions.

    /// Finds a subscription by id.
    async fn find_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> AppResult<Option<Subscription>>;

    /// Finds a subscription by external billing subscription id.
    async fn find_subscription_by_billing_id(
        &self,
        billing_subscription_id: &str,
    ) -> AppResult<Option<Subscription>>;

    /// Returns the most recently created subscription for a user.
    async fn latest_subscription_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<Subscription>>;

    /// Inserts a new subscription row.
    async fn insert_subscription(&self, subscription: Subscription) -> AppResult<()>;

    /// Replaces an existing subscription row by id.
    async fn update_subscription(&self, subscription: Subscription) -> AppResult<()>;
}
