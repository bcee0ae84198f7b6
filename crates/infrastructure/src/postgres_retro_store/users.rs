use super::*;

impl PostgresRetroStore {
    pub(super) async fn find_user_impl(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, subject, name, email, plan, billing_customer_id, created_at
            FROM users
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    pub(super) async fn find_user_by_subject_impl(
        &self,
        subject: &str,
    ) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, subject, name, email, plan, billing_customer_id, created_at
            FROM users
            WHERE subject = $1
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by subject: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    pub(super) async fn find_user_by_billing_customer_impl(
        &self,
        billing_customer_id: &str,
    ) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, subject, name, email, plan, billing_customer_id, created_at
            FROM users
            WHERE billing_customer_id = $1
            LIMIT 1
            "#,
        )
        .bind(billing_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user by billing customer: {error}"))
        })?;

        row.map(UserRecord::try_from).transpose()
    }

    pub(super) async fn insert_user_impl(&self, user: UserRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, subject, name, email, plan, billing_customer_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.subject)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.plan.as_str())
        .bind(&user.billing_customer_id)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| match error.as_database_error() {
            Some(db_error) if db_error.is_unique_violation() => AppError::Conflict(format!(
                "user with subject '{}' already exists",
                user.subject
            )),
            _ => AppError::Internal(format!("failed to insert user: {error}")),
        })?;

        Ok(())
    }

    pub(super) async fn update_user_impl(&self, user: UserRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, plan = $4, billing_customer_id = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.plan.as_str())
        .bind(&user.billing_customer_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update user: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                user.id
            )));
        }

        Ok(())
    }
}
