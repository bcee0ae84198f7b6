use std::sync::Arc;

use chrono::{DateTime, Utc};
use retroscope_core::{AppError, AppResult};
use retroscope_domain::{
    AccessCode, Entry, EntryId, PlanTier, Retro, RetroFormat, Vote, VoteId, VoteValue,
    validate_participant_id,
};

use crate::store::RetroStore;

/// One entry in a public board snapshot, with its vote tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// Category slug.
    pub category: String,
    /// Feedback text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Sum of vote values.
    pub score: i64,
    /// The requesting participant's own vote, if any.
    pub own_vote: Option<VoteValue>,
}

/// Public read view of a board, reachable by access code only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Board title.
    pub title: String,
    /// Board format.
    pub format: RetroFormat,
    /// Whether the board still accepts entries and votes.
    pub closed: bool,
    /// Entries with tallies, oldest first.
    pub entries: Vec<BoardEntry>,
}

/// Anonymous participation path.
///
/// This service holds the raw store deliberately: participants have no
/// interactive identity, so every operation here carries its own
/// inline checks (board exists, board open, category valid, owner tier
/// quota) instead of the access rules. Nothing written here is
/// re-checked on the way in; owners see it later through the guarded
/// store.
#[derive(Clone)]
pub struct ParticipationService {
    raw: Arc<dyn RetroStore>,
}

impl ParticipationService {
    /// Creates the service over the raw store.
    #[must_use]
    pub fn new(raw: Arc<dyn RetroStore>) -> Self {
        Self { raw }
    }

    /// Returns the public snapshot of a board.
    ///
    /// Closed boards stay readable so participants can review results;
    /// only submission and voting require an open board.
    pub async fn board_snapshot(
        &self,
        access_code: &str,
        participant_id: Option<&str>,
    ) -> AppResult<BoardSnapshot> {
        let retro = self.find_board(access_code).await?;
        let entries = self.raw.list_entries_by_retro(retro.id()).await?;

        let mut board_entries = Vec::with_capacity(entries.len());
        for entry in entries {
            let votes = self.raw.list_votes_by_entry(entry.id()).await?;
            let score = votes
                .iter()
                .map(|vote| i64::from(vote.value.as_i16()))
                .sum();
            let own_vote = participant_id.and_then(|participant_id| {
                votes
                    .iter()
                    .find(|vote| vote.participant_id == participant_id)
                    .map(|vote| vote.value)
            });

            board_entries.push(BoardEntry {
                id: entry.id(),
                category: entry.category().to_owned(),
                content: entry.content().to_owned(),
                created_at: entry.created_at(),
                score,
                own_vote,
            });
        }

        Ok(BoardSnapshot {
            title: retro.title().to_owned(),
            format: retro.format(),
            closed: retro.is_closed(),
            entries: board_entries,
        })
    }

    /// Submits a feedback entry to an open board.
    pub async fn submit_entry(
        &self,
        access_code: &str,
        participant_id: &str,
        category: &str,
        content: &str,
    ) -> AppResult<Entry> {
        let retro = self.find_open_board(access_code).await?;

        if !retro.format().has_category(category) {
            return Err(AppError::Validation(format!(
                "category '{category}' does not belong to the '{}' format",
                retro.format().as_str()
            )));
        }

        // The quota follows the board owner's plan, not the participant.
        let owner_plan = self
            .raw
            .find_user(retro.owner_id())
            .await?
            .map(|owner| owner.plan)
            .unwrap_or(PlanTier::Free);
        if let Some(max_entries) = owner_plan.max_entries_per_retro() {
            let count = self.raw.count_entries_by_retro(retro.id()).await?;
            if count >= max_entries {
                return Err(AppError::Forbidden(format!(
                    "this board has reached its limit of {max_entries} entries"
                )));
            }
        }

        let entry = Entry::new(
            EntryId::new(),
            retro.id(),
            category,
            content,
            participant_id,
            Utc::now(),
        )?;
        self.raw.insert_entry(entry.clone()).await?;

        Ok(entry)
    }

    /// Casts or changes a participant's vote on an entry.
    pub async fn cast_vote(
        &self,
        access_code: &str,
        entry_id: EntryId,
        participant_id: &str,
        value: VoteValue,
    ) -> AppResult<Vote> {
        validate_participant_id(participant_id)?;
        let retro = self.find_open_board(access_code).await?;
        let entry = self.entry_on_board(&retro, entry_id).await?;

        let vote = match self
            .raw
            .find_vote_by_entry_and_participant(entry.id(), participant_id)
            .await?
        {
            Some(existing) => Vote { value, ..existing },
            None => Vote {
                id: VoteId::new(),
                entry_id: entry.id(),
                participant_id: participant_id.to_owned(),
                value,
                created_at: Utc::now(),
            },
        };

        self.raw.upsert_vote(vote.clone()).await?;
        Ok(vote)
    }

    /// Removes a participant's vote from an entry, if present.
    pub async fn retract_vote(
        &self,
        access_code: &str,
        entry_id: EntryId,
        participant_id: &str,
    ) -> AppResult<()> {
        validate_participant_id(participant_id)?;
        let retro = self.find_open_board(access_code).await?;
        let entry = self.entry_on_board(&retro, entry_id).await?;

        if let Some(existing) = self
            .raw
            .find_vote_by_entry_and_participant(entry.id(), participant_id)
            .await?
        {
            self.raw.delete_vote(existing.id).await?;
        }

        Ok(())
    }

    async fn find_board(&self, access_code: &str) -> AppResult<Retro> {
        let access_code = AccessCode::parse(access_code)?;
        self.raw
            .find_retro_by_access_code(&access_code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no board with code '{access_code}'")))
    }

    async fn find_open_board(&self, access_code: &str) -> AppResult<Retro> {
        let retro = self.find_board(access_code).await?;
        if retro.is_closed() {
            return Err(AppError::Conflict("this board is closed".to_owned()));
        }

        Ok(retro)
    }

    async fn entry_on_board(&self, retro: &Retro, entry_id: EntryId) -> AppResult<Entry> {
        self.raw
            .find_entry(entry_id)
            .await?
            .filter(|entry| entry.retro_id() == retro.id())
            .ok_or_else(|| AppError::NotFound(format!("entry '{entry_id}' is not on this board")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use retroscope_core::AppError;
    use retroscope_domain::{PlanTier, VoteValue};
    use crate::in_memory_retro_store::InMemoryRetroStore;

    use crate::store::RetroStore;
    use crate::test_support::{seed_entry, seed_retro, seed_user, seed_vote, store};

    use super::ParticipationService;

    fn service(raw: &Arc<InMemoryRetroStore>) -> ParticipationService {
        ParticipationService::new(Arc::clone(raw) as Arc<dyn RetroStore>)
    }

    #[tokio::test]
    async fn snapshot_tallies_scores_and_marks_the_own_vote() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;
        seed_vote(&raw, entry.id(), "participant-2").await;
        seed_vote(&raw, entry.id(), "participant-3").await;
        let service = service(&raw);

        let snapshot = service
            .board_snapshot("abcd2345", Some("participant-2"))
            .await;
        assert!(snapshot.is_ok());
        let snapshot = snapshot.unwrap_or_else(|_| unreachable!());
        assert_eq!(snapshot.title, "Sprint retro");
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].score, 2);
        assert_eq!(snapshot.entries[0].own_vote, Some(VoteValue::Up));

        let anonymous = service
            .board_snapshot("ABCD2345", None)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(anonymous.entries[0].own_vote, None);
    }

    #[tokio::test]
    async fn unknown_access_code_is_not_found() {
        let raw = store();
        let service = service(&raw);

        assert!(matches!(
            service.board_snapshot("ZZZZ9999", None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.board_snapshot("not a code", None).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn closed_boards_stay_readable_but_reject_writes() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;

        let mut closed = retro.clone();
        closed.set_closed(true);
        raw.update_retro(closed)
            .await
            .unwrap_or_else(|_| unreachable!());
        let service = service(&raw);

        let snapshot = service.board_snapshot("ABCD2345", None).await;
        assert!(snapshot.is_ok());
        assert!(snapshot.unwrap_or_else(|_| unreachable!()).closed);

        assert!(matches!(
            service
                .submit_entry("ABCD2345", "participant-1", "glad", "too late")
                .await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            service
                .cast_vote("ABCD2345", entry.id(), "participant-2", VoteValue::Up)
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn submitted_entries_must_match_the_board_format() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        seed_retro(&raw, &alice, "ABCD2345").await;
        let service = service(&raw);

        assert!(
            service
                .submit_entry("ABCD2345", "participant-1", "glad", "we shipped")
                .await
                .is_ok()
        );
        assert!(matches!(
            service
                .submit_entry("ABCD2345", "participant-1", "stop", "wrong column")
                .await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn entry_quota_follows_the_owner_plan() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let quota = PlanTier::Free
            .max_entries_per_retro()
            .unwrap_or_else(|| unreachable!());
        for index in 0..quota {
            seed_entry(&raw, retro.id(), &format!("participant-{index}")).await;
        }
        let service = service(&raw);

        assert!(matches!(
            service
                .submit_entry("ABCD2345", "participant-x", "glad", "over quota")
                .await,
            Err(AppError::Forbidden(_))
        ));

        let mut upgraded = alice.clone();
        upgraded.plan = PlanTier::Pro;
        raw.update_user(upgraded)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(
            service
                .submit_entry("ABCD2345", "participant-x", "glad", "room again")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn casting_twice_changes_the_vote_in_place() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;
        let service = service(&raw);

        let first = service
            .cast_vote("ABCD2345", entry.id(), "participant-2", VoteValue::Up)
            .await
            .unwrap_or_else(|_| unreachable!());
        let second = service
            .cast_vote("ABCD2345", entry.id(), "participant-2", VoteValue::Down)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(second.id, first.id);
        let votes = raw
            .list_votes_by_entry(entry.id())
            .await
            .unwrap_or_default();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, VoteValue::Down);
    }

    #[tokio::test]
    async fn votes_are_scoped_to_the_board_behind_the_code() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let bob = seed_user(&raw, "idp|bob").await;
        let _retro_a = seed_retro(&raw, &alice, "ABCD2345").await;
        let retro_b = seed_retro(&raw, &bob, "EFGH2345").await;
        let foreign_entry = seed_entry(&raw, retro_b.id(), "participant-1").await;
        let service = service(&raw);

        assert!(matches!(
            service
                .cast_vote("ABCD2345", foreign_entry.id(), "participant-2", VoteValue::Up)
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn retracting_a_vote_is_idempotent() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let retro = seed_retro(&raw, &alice, "ABCD2345").await;
        let entry = seed_entry(&raw, retro.id(), "participant-1").await;
        seed_vote(&raw, entry.id(), "participant-2").await;
        let service = service(&raw);

        assert!(
            service
                .retract_vote("ABCD2345", entry.id(), "participant-2")
                .await
                .is_ok()
        );
        assert!(
            service
                .retract_vote("ABCD2345", entry.id(), "participant-2")
                .await
                .is_ok()
        );
        assert_eq!(
            raw.list_votes_by_entry(entry.id())
                .await
                .unwrap_or_default()
                .len(),
            0
        );
    }
}
