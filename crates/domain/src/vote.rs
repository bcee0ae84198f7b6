//! Participant votes on feedback entries.

use chrono::{DateTime, Utc};
use retroscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EntryId;

/// Unique identifier for a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteId(Uuid);

impl VoteId {
    /// Creates a new random vote identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a vote identifier from an existing UUID value.
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

impl Default for VoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VoteId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Signed vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteValue {
    /// +1.
    Up,
    /// -1.
    Down,
}

impl VoteValue {
    /// Returns the signed numeric value.
    #[must_use]
    pub fn as_i16(&self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Parses a signed storage value back into a direction.
    pub fn from_i16(value: i16) -> AppResult<Self> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            _ => Err(AppError::Validation(format!(
                "vote value must be +1 or -1, got {value}"
            ))),
        }
    }
}

/// A single participant's vote on one entry.
///
/// At most one vote exists per (entry, participant) pair; repeated
/// casts replace the previous direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Stable vote identifier.
    pub id: VoteId,
    /// Entry the vote is attached to.
    pub entry_id: EntryId,
    /// Anonymous participant identifier.
    pub participant_id: String,
    /// Vote direction.
    pub value: VoteValue,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
