use super::*;

impl PostgresRetroStore {
    pub(super) async fn find_retro_impl(&self, retro_id: RetroId) -> AppResult<Option<Retro>> {
        let row = sqlx::query_as::<_, RetroRow>(
            r#"
            SELECT id, owner_id, title, format, access_code, closed, created_at
            FROM retros
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(retro_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find retro by id: {error}")))?;

        row.map(Retro::try_from).transpose()
    }

    pub(super) async fn find_retro_by_access_code_impl(
        &self,
        access_code: &AccessCode,
    ) -> AppResult<Option<Retro>> {
        let row = sqlx::query_as::<_, RetroRow>(
            r#"
            SELECT id, owner_id, title, format, access_code, closed, created_at
            FROM retros
            WHERE access_code = $1
            LIMIT 1
            "#,
        )
        .bind(access_code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find retro by access code: {error}"))
        })?;

        row.map(Retro::try_from).transpose()
    }

    pub(super) async fn list_retros_by_owner_impl(
        &self,
        owner_id: UserId,
    ) -> AppResult<Vec<Retro>> {
        let rows = sqlx::query_as::<_, RetroRow>(
            r#"
            SELECT id, owner_id, title, format, access_code, closed, created_at
            FROM retros
            WHERE owner_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list retros: {error}")))?;

        rows.into_iter().map(Retro::try_from).collect()
    }

    pub(super) async fn insert_retro_impl(&self, retro: Retro) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO retros (id, owner_id, title, format, access_code, closed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(retro.id().as_uuid())
        .bind(retro.owner_id().as_uuid())
        .bind(retro.title())
        .bind(retro.format().as_str())
        .bind(retro.access_code().as_str())
        .bind(retro.is_closed())
        .bind(retro.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| match error.as_database_error() {
            Some(db_error) if db_error.is_unique_violation() => AppError::Conflict(format!(
                "access code '{}' is already in use",
                retro.access_code()
            )),
            _ => AppError::Internal(format!("failed to insert retro: {error}")),
        })?;

        Ok(())
    }

    pub(super) async fn update_retro_impl(&self, retro: Retro) -> AppResult<()> {
        // owner_id, access_code, and created_at are immutable.
        let result = sqlx::query(
            r#"
            UPDATE retros
            SET title = $2, format = $3, closed = $4
            WHERE id = $1
            "#,
        )
        .bind(retro.id().as_uuid())
        .bind(retro.title())
        .bind(retro.format().as_str())
        .bind(retro.is_closed())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update retro: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "retro '{}' does not exist",
                retro.id()
            )));
        }

        Ok(())
    }

    pub(super) async fn delete_retro_impl(&self, retro_id: RetroId) -> AppResult<()> {
        // Entries and votes cascade via foreign keys.
        let result = sqlx::query("DELETE FROM retros WHERE id = $1")
            .bind(retro_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete retro: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "retro '{retro_id}' does not exist"
            )));
        }

        Ok(())
    }
}
