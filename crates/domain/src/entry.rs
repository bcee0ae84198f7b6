//! Feedback entries submitted by anonymous participants.

use chrono::{DateTime, Utc};
use retroscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RetroId;

/// Unique identifier for a feedback entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Creates a new random entry identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entry identifier from an existing UUID value.
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

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Maximum entry content length.
pub const ENTRY_CONTENT_MAX_LENGTH: usize = 2000;

/// Maximum participant identifier length.
const PARTICIPANT_ID_MAX_LENGTH: usize = 64;

/// Validates a client-generated anonymous participant identifier.
pub fn validate_participant_id(participant_id: &str) -> AppResult<()> {
    let trimmed = participant_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "participant id must not be empty".to_owned(),
        ));
    }

    if trimmed.len() > PARTICIPANT_ID_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "participant id must not exceed {PARTICIPANT_ID_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}

/// A categorized feedback item on a retro board.
///
/// The parent board never changes after creation; an entry is only
/// reachable by walking to its retro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: EntryId,
    retro_id: RetroId,
    category: String,
    content: String,
    participant_id: String,
    created_at: DateTime<Utc>,
}

impl Entry {
    /// Creates an entry with validated content.
    ///
    /// Category membership in the parent format is checked by the
    /// submission path, which holds the parent retro.
    pub fn new(
        id: EntryId,
        retro_id: RetroId,
        category: impl Into<String>,
        content: impl Into<String>,
        participant_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let content = content.into();
        let trimmed = content.trim().to_owned();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "entry content must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().count() > ENTRY_CONTENT_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "entry content must not exceed {ENTRY_CONTENT_MAX_LENGTH} characters"
            )));
        }

        let participant_id = participant_id.into();
        validate_participant_id(&participant_id)?;

        Ok(Self {
            id,
            retro_id,
            category: category.into(),
            content: trimmed,
            participant_id,
            created_at,
        })
    }

    /// Returns the entry identifier.
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Returns the parent board.
    #[must_use]
    pub fn retro_id(&self) -> RetroId {
        self.retro_id
    }

    /// Returns the category slug.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Returns the feedback text.
    #[must_use]
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Returns the anonymous participant identifier.
    #[must_use]
    pub fn participant_id(&self) -> &str {
        self.participant_id.as_str()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
