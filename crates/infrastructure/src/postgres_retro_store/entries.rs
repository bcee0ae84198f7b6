use super::*;

impl PostgresRetroStore {
    pub(super) async fn find_entry_impl(&self, entry_id: EntryId) -> AppResult<Option<Entry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, retro_id, category, content, participant_id, created_at
            FROM entries
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(entry_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find entry by id: {error}")))?;

        row.map(Entry::try_from).transpose()
    }

    pub(super) async fn list_entries_by_retro_impl(
        &self,
        retro_id: RetroId,
    ) -> AppResult<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, retro_id, category, content, participant_id, created_at
            FROM entries
            WHERE retro_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(retro_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list entries: {error}")))?;

        rows.into_iter().map(Entry::try_from).collect()
    }

    pub(super) async fn count_entries_by_retro_impl(&self, retro_id: RetroId) -> AppResult<usize> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM entries WHERE retro_id = $1",
        )
        .bind(retro_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count entries: {error}")))?;

        usize::try_from(count)
            .map_err(|error| AppError::Internal(format!("entry count out of range: {error}")))
    }

    pub(super) async fn insert_entry_impl(&self, entry: Entry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO entries (id, retro_id, category, content, participant_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(entry.retro_id().as_uuid())
        .bind(entry.category())
        .bind(entry.content())
        .bind(entry.participant_id())
        .bind(entry.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert entry: {error}")))?;

        Ok(())
    }

    pub(super) async fn delete_entry_impl(&self, entry_id: EntryId) -> AppResult<()> {
        // Votes cascade via foreign key.
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(entry_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete entry: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "entry '{entry_id}' does not exist"
            )));
        }

        Ok(())
    }
}
