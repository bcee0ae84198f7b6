//! User identity anchor and plan tiers.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use retroscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Subscription tier a user is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// Free tier with board and entry limits.
    #[default]
    Free,
    /// Paid tier without limits.
    Pro,
}

impl PlanTier {
    /// Returns the storage string for this tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    /// Maximum number of retros a user on this tier may keep, if limited.
    #[must_use]
    pub fn max_retros(&self) -> Option<usize> {
        match self {
            Self::Free => Some(3),
            Self::Pro => None,
        }
    }

    /// Maximum number of entries a single retro may collect, if limited.
    #[must_use]
    pub fn max_entries_per_retro(&self) -> Option<usize> {
        match self {
            Self::Free => Some(50),
            Self::Pro => None,
        }
    }
}

impl FromStr for PlanTier {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            _ => Err(AppError::Validation(format!("unknown plan tier '{value}'"))),
        }
    }
}

/// Local user row, keyed by the identity provider's subject.
///
/// Created by the privileged account-sync path on first authentication.
/// The plan tier and billing customer reference are mutated only by the
/// billing webhook path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable local identifier.
    pub id: UserId,
    /// Unique external-identity subject.
    pub subject: String,
    /// Display name from the identity provider.
    pub name: String,
    /// Email from the identity provider, if shared.
    pub email: Option<String>,
    /// Current plan tier.
    pub plan: PlanTier,
    /// Denormalized billing customer reference.
    pub billing_customer_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a fresh free-tier user row for a subject.
    pub fn new(subject: impl Into<String>, name: impl Into<String>, email: Option<String>) -> AppResult<Self> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(AppError::Validation(
                "identity subject must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id: UserId::new(),
            subject,
            name: name.into(),
            email,
            plan: PlanTier::Free,
            billing_customer_id: None,
            created_at: Utc::now(),
        })
    }
}
