//! Retro boards, formats, and shareable access codes.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use retroscope_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// Unique identifier for a retro board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetroId(Uuid);

impl RetroId {
    /// Creates a new random retro identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a retro identifier from an existing UUID value.
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

impl Default for RetroId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RetroId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Column layout of a retro board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetroFormat {
    /// Mad / Sad / Glad.
    MadSadGlad,
    /// Start / Stop / Continue.
    StartStopContinue,
    /// Went well / To improve / Action items.
    WentWellToImprove,
    /// Liked / Learned / Lacked / Longed for.
    FourLs,
}

impl RetroFormat {
    /// Returns the storage string for this format.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MadSadGlad => "mad_sad_glad",
            Self::StartStopContinue => "start_stop_continue",
            Self::WentWellToImprove => "went_well_to_improve",
            Self::FourLs => "four_ls",
        }
    }

    /// Returns the category slugs entries on this board may use.
    #[must_use]
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Self::MadSadGlad => &["mad", "sad", "glad"],
            Self::StartStopContinue => &["start", "stop", "continue"],
            Self::WentWellToImprove => &["went_well", "to_improve", "action_items"],
            Self::FourLs => &["liked", "learned", "lacked", "longed_for"],
        }
    }

    /// Returns whether the category belongs to this format.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}

impl FromStr for RetroFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mad_sad_glad" => Ok(Self::MadSadGlad),
            "start_stop_continue" => Ok(Self::StartStopContinue),
            "went_well_to_improve" => Ok(Self::WentWellToImprove),
            "four_ls" => Ok(Self::FourLs),
            _ => Err(AppError::Validation(format!(
                "unknown retro format '{value}'"
            ))),
        }
    }
}

/// Code length of a shareable access code.
pub const ACCESS_CODE_LENGTH: usize = 8;

/// Unambiguous uppercase alphabet for access codes (no 0/O/1/I).
const ACCESS_CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Human-shareable board access code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessCode(String);

impl AccessCode {
    /// Generates a random access code.
    ///
    /// Uniqueness is enforced by the creation path with a collision
    /// re-check against storage, not here.
    pub fn generate() -> AppResult<Self> {
        let mut bytes = [0u8; ACCESS_CODE_LENGTH];
        getrandom::fill(&mut bytes).map_err(|error| {
            AppError::Internal(format!("failed to generate access code: {error}"))
        })?;

        let code: String = bytes
            .iter()
            .map(|byte| ACCESS_CODE_ALPHABET[usize::from(*byte) % ACCESS_CODE_ALPHABET.len()] as char)
            .collect();

        Ok(Self(code))
    }

    /// Parses and normalizes a code received from a client.
    pub fn parse(value: &str) -> AppResult<Self> {
        let normalized = value.trim().to_uppercase();
        if normalized.len() != ACCESS_CODE_LENGTH
            || !normalized
                .bytes()
                .all(|byte| ACCESS_CODE_ALPHABET.contains(&byte))
        {
            return Err(AppError::Validation(
                "access code must be 8 characters from the code alphabet".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for AccessCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Maximum retro title length.
pub const RETRO_TITLE_MAX_LENGTH: usize = 120;

/// A retrospective board owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retro {
    id: RetroId,
    owner_id: UserId,
    title: String,
    format: RetroFormat,
    access_code: AccessCode,
    closed: bool,
    created_at: DateTime<Utc>,
}

impl Retro {
    /// Creates a retro board with a validated title.
    ///
    /// Used both for fresh boards and for rehydration from storage; the
    /// owner never changes after creation.
    pub fn new(
        id: RetroId,
        owner_id: UserId,
        title: impl Into<String>,
        format: RetroFormat,
        access_code: AccessCode,
        closed: bool,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let title = validate_title(title.into())?;

        Ok(Self {
            id,
            owner_id,
            title,
            format,
            access_code,
            closed,
            created_at,
        })
    }

    /// Returns the board identifier.
    #[must_use]
    pub fn id(&self) -> RetroId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the board title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the board format.
    #[must_use]
    pub fn format(&self) -> RetroFormat {
        self.format
    }

    /// Returns the shareable access code.
    #[must_use]
    pub fn access_code(&self) -> &AccessCode {
        &self.access_code
    }

    /// Returns whether the board is closed to new entries and votes.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Renames the board.
    pub fn rename(&mut self, title: impl Into<String>) -> AppResult<()> {
        self.title = validate_title(title.into())?;
        Ok(())
    }

    /// Switches the board format.
    ///
    /// Existing entries keep their categories; the board view decides
    /// how to surface entries whose category left the format.
    pub fn set_format(&mut self, format: RetroFormat) {
        self.format = format;
    }

    /// Opens or closes the board.
    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }
}

fn validate_title(title: String) -> AppResult<String> {
    let trimmed = title.trim().to_owned();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "retro title must not be empty".to_owned(),
        ));
    }

    if trimmed.chars().count() > RETRO_TITLE_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "retro title must not exceed {RETRO_TITLE_MAX_LENGTH} characters"
        )));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_retro(title: &str) -> AppResult<Retro> {
        Retro::new(
            RetroId::new(),
            UserId::new(),
            title,
            RetroFormat::MadSadGlad,
            AccessCode::parse("ABCD2345")?,
            false,
            Utc::now(),
        )
    }

    #[test]
    fn retro_format_round_trips_storage_string() {
        for format in [
            RetroFormat::MadSadGlad,
            RetroFormat::StartStopContinue,
            RetroFormat::WentWellToImprove,
            RetroFormat::FourLs,
        ] {
            assert_eq!(format.as_str().parse::<RetroFormat>().ok(), Some(format));
        }
    }

    #[test]
    fn every_format_has_categories() {
        assert!(RetroFormat::MadSadGlad.has_category("glad"));
        assert!(RetroFormat::StartStopContinue.has_category("stop"));
        assert!(!RetroFormat::MadSadGlad.has_category("stop"));
    }

    #[test]
    fn generated_access_code_parses_back() {
        let code = AccessCode::generate();
        assert!(code.is_ok());
        let code = code.unwrap_or_else(|_| unreachable!());
        assert!(AccessCode::parse(code.as_str()).is_ok());
    }

    #[test]
    fn access_code_normalizes_case() {
        let parsed = AccessCode::parse(" abcd2345 ");
        assert!(parsed.is_ok());
        assert_eq!(
            parsed.unwrap_or_else(|_| unreachable!()).as_str(),
            "ABCD2345"
        );
    }

    #[test]
    fn ambiguous_access_code_characters_are_rejected() {
        assert!(AccessCode::parse("ABCD100O").is_err());
        assert!(AccessCode::parse("SHORT").is_err());
    }

    #[test]
    fn empty_title_is_rejected() {
        assert!(sample_retro("   ").is_err());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let long = "t".repeat(RETRO_TITLE_MAX_LENGTH + 1);
        assert!(sample_retro(&long).is_err());
    }

    #[test]
    fn rename_validates_title() {
        let retro = sample_retro("Sprint 42");
        assert!(retro.is_ok());
        let mut retro = retro.unwrap_or_else(|_| unreachable!());
        assert!(retro.rename("").is_err());
        assert!(retro.rename("Sprint 43").is_ok());
        assert_eq!(retro.title(), "Sprint 43");
    }
}
