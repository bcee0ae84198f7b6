use super::*;

impl PostgresRetroStore {
    pub(super) async fn find_vote_impl(&self, vote_id: VoteId) -> AppResult<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT id, entry_id, participant_id, value, created_at
            FROM votes
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(vote_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find vote by id: {error}")))?;

        row.map(Vote::try_from).transpose()
    }

    pub(super) async fn find_vote_by_entry_and_participant_impl(
        &self,
        entry_id: EntryId,
        participant_id: &str,
    ) -> AppResult<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT id, entry_id, participant_id, value, created_at
            FROM votes
            WHERE entry_id = $1 AND participant_id = $2
            LIMIT 1
            "#,
        )
        .bind(entry_id.as_uuid())
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find vote by participant: {error}"))
        })?;

        row.map(Vote::try_from).transpose()
    }

    pub(super) async fn list_votes_by_entry_impl(&self, entry_id: EntryId) -> AppResult<Vec<Vote>> {
        let rows = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT id, entry_id, participant_id, value, created_at
            FROM votes
            WHERE entry_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(entry_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list votes: {error}")))?;

        rows.into_iter().map(Vote::try_from).collect()
    }

    pub(super) async fn upsert_vote_impl(&self, vote: Vote) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO votes (id, entry_id, participant_id, value, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (entry_id, participant_id)
            DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(vote.id.as_uuid())
        .bind(vote.entry_id.as_uuid())
        .bind(&vote.participant_id)
        .bind(vote.value.as_i16())
        .bind(vote.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert vote: {error}")))?;

        Ok(())
    }

    pub(super) async fn delete_vote_impl(&self, vote_id: VoteId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM votes WHERE id = $1")
            .bind(vote_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete vote: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "vote '{vote_id}' does not exist"
            )));
        }

        Ok(())
    }
}
