use super::*;

impl PostgresRetroStore {
    pub(super) async fn find_subscription_impl(
        &self,
        subscription_id: SubscriptionId,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, billing_subscription_id, price_id, status,
                   current_period_end, cancel_at_period_end, created_at
            FROM subscriptions
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(subscription_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find subscription by id: {error}"))
        })?;

        row.map(Subscription::try_from).transpose()
    }

    pub(super) async fn find_subscription_by_billing_id_impl(
        &self,
        billing_subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, billing_subscription_id, price_id, status,
                   current_period_end, cancel_at_period_end, created_at
            FROM subscriptions
            WHERE billing_subscription_id = $1
            LIMIT 1
            "#,
        )
        .bind(billing_subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find subscription by billing id: {error}"))
        })?;

        row.map(Subscription::try_from).transpose()
    }

    pub(super) async fn latest_subscription_for_user_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, billing_subscription_id, price_id, status,
                   current_period_end, cancel_at_period_end, created_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find latest subscription: {error}"))
        })?;

        row.map(Subscription::try_from).transpose()
    }

    pub(super) async fn insert_subscription_impl(
        &self,
        subscription: Subscription,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, user_id, billing_subscription_id, price_id, status,
                                       current_period_end, cancel_at_period_end, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(&subscription.billing_subscription_id)
        .bind(&subscription.price_id)
        .bind(subscription.status.as_str())
        .bind(subscription.current_period_end)
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| match error.as_database_error() {
            Some(db_error) if db_error.is_unique_violation() => AppError::Conflict(format!(
                "subscription '{}' already exists",
                subscription.billing_subscription_id
            )),
            _ => AppError::Internal(format!("failed to insert subscription: {error}")),
        })?;

        Ok(())
    }

    pub(super) async fn update_subscription_impl(
        &self,
        subscription: Subscription,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET price_id = $2, status = $3, current_period_end = $4, cancel_at_period_end = $5
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(&subscription.price_id)
        .bind(subscription.status.as_str())
        .bind(subscription.current_period_end)
        .bind(subscription.cancel_at_period_end)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update subscription: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "subscription '{}' does not exist",
                subscription.id
            )));
        }

        Ok(())
    }
}
