//! Billing subscriptions synced from the payment provider.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use retroscope_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PlanTier, UserId};

/// Unique identifier for a subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Creates a new random subscription identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a subscription identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle status reported by the billing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current.
    Active,
    /// Payment failed; grace period.
    PastDue,
    /// Terminated.
    Canceled,
}

impl SubscriptionStatus {
    /// Returns the storage string for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
        }
    }

    /// Returns the plan tier this status entitles the user to.
    #[must_use]
    pub fn plan_tier(&self) -> PlanTier {
        match self {
            Self::Active | Self::PastDue => PlanTier::Pro,
            Self::Canceled => PlanTier::Free,
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            _ => Err(AppError::Validation(format!(
                "unknown subscription status '{value}'"
            ))),
        }
    }
}

/// A subscription row owned by exactly one user.
///
/// Written only by the billing webhook path; interactive users read
/// their own row through the guarded store. The most recently created
/// row per user is the authoritative current subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Stable local identifier.
    pub id: SubscriptionId,
    /// Owning user.
    pub user_id: UserId,
    /// External billing subscription id.
    pub billing_subscription_id: String,
    /// External price/plan id.
    pub price_id: String,
    /// Provider-reported status.
    pub status: SubscriptionStatus,
    /// End of the current billing period.
    pub current_period_end: DateTime<Utc>,
    /// Whether the subscription lapses at period end.
    pub cancel_at_period_end: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
