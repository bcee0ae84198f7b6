//! PostgreSQL-backed raw store.

use async_trait::async_trait;
use sqlx::PgPool;

use retroscope_application::RetroStore;
use retroscope_core::{AppError, AppResult};
use retroscope_domain::{
    AccessCode, Entry, EntryId, Retro, RetroId, Subscription, SubscriptionId, UserId, UserRecord,
    Vote, VoteId,
};

/// PostgreSQL implementation of the raw store port.
#[derive(Clone)]
pub struct PostgresRetroStore {
    pool: PgPool,
}

impl PostgresRetroStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    subject: String,
    name: String,
    email: Option<String>,
    plan: String,
    billing_customer_id: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            subject: row.subject,
            name: row.name,
            email: row.email,
            plan: row.plan.parse()?,
            billing_customer_id: row.billing_customer_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RetroRow {
    id: uuid::Uuid,
    owner_id: uuid::Uuid,
    title: String,
    format: String,
    access_code: String,
    closed: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<RetroRow> for Retro {
    type Error = AppError;

    fn try_from(row: RetroRow) -> Result<Self, Self::Error> {
        Retro::new(
            RetroId::from_uuid(row.id),
            UserId::from_uuid(row.owner_id),
            row.title,
            row.format.parse()?,
            AccessCode::parse(&row.access_code)?,
            row.closed,
            row.created_at,
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: uuid::Uuid,
    retro_id: uuid::Uuid,
    category: String,
    content: String,
    participant_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<EntryRow> for Entry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Entry::new(
            EntryId::from_uuid(row.id),
            RetroId::from_uuid(row.retro_id),
            row.category,
            row.content,
            row.participant_id,
            row.created_at,
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VoteRow {
    id: uuid::Uuid,
    entry_id: uuid::Uuid,
    participant_id: String,
    value: i16,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = AppError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VoteId::from_uuid(row.id),
            entry_id: EntryId::from_uuid(row.entry_id),
            participant_id: row.participant_id,
            value: retroscope_domain::VoteValue::from_i16(row.value)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    billing_subscription_id: String,
    price_id: String,
    status: String,
    current_period_end: chrono::DateTime<chrono::Utc>,
    cancel_at_period_end: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = AppError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            billing_subscription_id: row.billing_subscription_id,
            price_id: row.price_id,
            status: row.status.parse()?,
            current_period_end: row.current_period_end,
            cancel_at_period_end: row.cancel_at_period_end,
            created_at: row.created_at,
        })
    }
}

mod entries;
mod retros;
mod subscriptions;
mod users;
mod votes;

#[async_trait]
impl RetroStore for PostgresRetroStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_user_impl(user_id).await
    }

    async fn find_user_by_subject(&self, subject: &str) -> AppResult<Option<UserRecord>> {
        self.find_user_by_subject_impl(subject).await
    }

    async fn find_user_by_billing_customer(
        &self,
        billing_customer_id: &str,
    ) -> AppResult<Option<UserRecord>> {
        self.find_user_by_billing_customer_impl(billing_customer_id)
            .await
    }

    async fn insert_user(&self, user: UserRecord) -> AppResult<()> {
        self.insert_user_impl(user).await
    }

    async fn update_user(&self, user: UserRecord) -> AppResult<()> {
        self.update_user_impl(user).await
    }

    async fn find_retro(&self, retro_id: RetroId) -> AppResult<Option<Retro>> {
        self.find_retro_impl(retro_id).await
    }

    async fn find_retro_by_access_code(
        &self,
        access_code: &AccessCode,
    ) -> AppResult<Option<Retro>> {
        self.find_retro_by_access_code_impl(access_code).await
    }

    async fn list_retros_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Retro>> {
        self.list_retros_by_owner_impl(owner_id).await
    }

    async fn insert_retro(&self, retro: Retro) -> AppResult<()> {
        self.insert_retro_impl(retro).await
    }

    async fn update_retro(&self, retro: Retro) -> AppResult<()> {
        self.update_retro_impl(retro).await
    }

    async fn delete_retro(&self, retro_id: RetroId) -> AppResult<()> {
        self.delete_retro_impl(retro_id).await
    }

    async fn find_entry(&self, entry_id: EntryId) -> AppResult<Option<Entry>> {
        self.find_entry_impl(entry_id).await
    }

    async fn list_entries_by_retro(&self, retro_id: RetroId) -> AppResult<Vec<Entry>> {
        self.list_entries_by_retro_impl(retro_id).await
    }

    async fn count_entries_by_retro(&self, retro_id: RetroId) -> AppResult<usize> {
        self.count_entries_by_retro_impl(retro_id).await
    }

    async fn insert_entry(&self, entry: Entry) -> AppResult<()> {
        self.insert_entry_impl(entry).await
    }

    async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()> {
        self.delete_entry_impl(entry_id).await
    }

    async fn find_vote(&self, vote_id: VoteId) -> AppResult<Option<Vote>> {
        self.find_vote_impl(vote_id).await
    }

    async fn find_vote_by_entry_and_participant(
        &self,
        entry_id: EntryId,
        participant_id: &str,
    ) -> AppResult<Option<Vote>> {
        self.find_vote_by_entry_and_participant_impl(entry_id, participant_id)
            .await
    }

    async fn list_votes_by_entry(&self, entry_id: EntryId) -> AppResult<Vec<Vote>> {
        self.list_votes_by_entry_impl(entry_id).await
    }

    async fn upsert_vote(&self, vote: Vote) -> AppResult<()> {
        self.upsert_vote_impl(vote).await
    }

    async fn delete_vote(&self, vote_id: VoteId) -> AppResult<()> {
        self.delete_vote_impl(vote_id).await
    }

    async fn find_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> AppResult<Option<Subscription>> {
        self.find_subscription_impl(subscription_id).await
    }

    async fn find_subscription_by_billing_id(
        &self,
        billing_subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        self.find_subscription_by_billing_id_impl(billing_subscription_id)
            .await
    }

    async fn latest_subscription_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<Subscription>> {
        self.latest_subscription_for_user_impl(user_id).await
    }

    async fn insert_subscription(&self, subscription: Subscription) -> AppResult<()> {
        self.insert_subscription_impl(subscription).await
    }

    async fn update_subscription(&self, subscription: Subscription) -> AppResult<()> {
        self.update_subscription_impl(subscription).await
    }
}
