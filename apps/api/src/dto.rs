use chrono::{DateTime, Utc};
use retroscope_application::{BoardEntry, BoardSnapshot};
use retroscope_domain::{Entry, Retro, Subscription, UserRecord, Vote, VoteValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Board creation payload.
#[derive(Debug, Deserialize)]
pub struct CreateRetroRequest {
    pub title: String,
    pub format: String,
}

/// Partial board update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateRetroRequest {
    pub title: Option<String>,
    pub format: Option<String>,
    pub closed: Option<bool>,
}

/// Owner-facing board representation.
#[derive(Debug, Serialize)]
pub struct RetroResponse {
    pub id: Uuid,
    pub title: String,
    pub format: String,
    pub access_code: String,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Retro> for RetroResponse {
    fn from(retro: Retro) -> Self {
        Self {
            id: retro.id().as_uuid(),
            title: retro.title().to_owned(),
            format: retro.format().as_str().to_owned(),
            access_code: retro.access_code().as_str().to_owned(),
            closed: retro.is_closed(),
            created_at: retro.created_at(),
        }
    }
}

/// Owner-facing entry representation.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub retro_id: Uuid,
    pub category: String,
    pub content: String,
    pub participant_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id().as_uuid(),
            retro_id: entry.retro_id().as_uuid(),
            category: entry.category().to_owned(),
            content: entry.content().to_owned(),
            participant_id: entry.participant_id().to_owned(),
            created_at: entry.created_at(),
        }
    }
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub subject: String,
    pub name: String,
    pub email: Option<String>,
    pub plan: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.as_uuid(),
            subject: user.subject,
            name: user.name,
            email: user.email,
            plan: user.plan.as_str().to_owned(),
        }
    }
}

/// The caller's current subscription.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub status: String,
    pub price_id: String,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id.as_uuid(),
            status: subscription.status.as_str().to_owned(),
            price_id: subscription.price_id,
            current_period_end: subscription.current_period_end,
            cancel_at_period_end: subscription.cancel_at_period_end,
        }
    }
}

/// One entry in a public board view, with its vote tally.
#[derive(Debug, Serialize)]
pub struct BoardEntryResponse {
    pub id: Uuid,
    pub category: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub score: i64,
    pub own_vote: Option<VoteValue>,
}

impl From<BoardEntry> for BoardEntryResponse {
    fn from(entry: BoardEntry) -> Self {
        Self {
            id: entry.id.as_uuid(),
            category: entry.category,
            content: entry.content,
            created_at: entry.created_at,
            score: entry.score,
            own_vote: entry.own_vote,
        }
    }
}

/// Public board view reachable by access code.
#[derive(Debug, Serialize)]
pub struct BoardSnapshotResponse {
    pub title: String,
    pub format: String,
    pub closed: bool,
    pub entries: Vec<BoardEntryResponse>,
}

impl From<BoardSnapshot> for BoardSnapshotResponse {
    fn from(snapshot: BoardSnapshot) -> Self {
        Self {
            title: snapshot.title,
            format: snapshot.format.as_str().to_owned(),
            closed: snapshot.closed,
            entries: snapshot
                .entries
                .into_iter()
                .map(BoardEntryResponse::from)
                .collect(),
        }
    }
}

/// Anonymous entry submission payload.
#[derive(Debug, Deserialize)]
pub struct SubmitEntryRequest {
    pub participant_id: String,
    pub category: String,
    pub content: String,
}

/// Vote payload for one entry.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub participant_id: String,
    pub value: VoteValue,
}

/// A participant's recorded vote.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub entry_id: Uuid,
    pub participant_id: String,
    pub value: VoteValue,
}

impl From<Vote> for VoteResponse {
    fn from(vote: Vote) -> Self {
        Self {
            entry_id: vote.entry_id.as_uuid(),
            participant_id: vote.participant_id,
            value: vote.value,
        }
    }
}

/// Optional participant marker on public board reads.
#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub participant_id: Option<String>,
}

/// Participant marker on vote retraction.
#[derive(Debug, Deserialize)]
pub struct VoteQuery {
    pub participant_id: String,
}

/// Minimal subscription event payload accepted from the billing
/// provider.
#[derive(Debug, Deserialize)]
pub struct BillingWebhookRequest {
    pub billing_customer_id: String,
    pub billing_subscription_id: String,
    pub price_id: String,
    pub status: String,
    pub current_period_end: DateTime<Utc>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub client_reference: Option<Uuid>,
}
