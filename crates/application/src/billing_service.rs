use std::sync::Arc;

use chrono::{DateTime, Utc};
use retroscope_core::{AppError, AppResult};
use retroscope_domain::{Subscription, SubscriptionId, SubscriptionStatus, UserId, UserRecord};

use crate::store::RetroStore;

/// Minimal subscription event shape consumed from the billing webhook.
///
/// Payload parsing and signature verification happen at the API
/// boundary; by the time an event reaches this service it is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionEvent {
    /// Billing customer the event belongs to.
    pub billing_customer_id: String,
    /// External subscription id.
    pub billing_subscription_id: String,
    /// External price/plan id.
    pub price_id: String,
    /// Reported subscription status.
    pub status: SubscriptionStatus,
    /// End of the current billing period.
    pub current_period_end: DateTime<Utc>,
    /// Whether the subscription lapses at period end.
    pub cancel_at_period_end: bool,
    /// Local user id carried through checkout metadata, used to link
    /// the billing customer on the first event.
    pub client_reference: Option<UserId>,
}

/// Billing-webhook-privileged mutations.
///
/// Runs without an interactive identity and therefore holds the raw
/// store; the only authorization is the webhook signature check at the
/// API boundary. This path is the sole writer of subscription rows and
/// user plan fields.
#[derive(Clone)]
pub struct BillingService {
    raw: Arc<dyn RetroStore>,
}

impl BillingService {
    /// Creates the service over the raw store.
    #[must_use]
    pub fn new(raw: Arc<dyn RetroStore>) -> Self {
        Self { raw }
    }

    /// Applies a subscription event: upserts the subscription row and
    /// flips the owning user's plan tier.
    pub async fn apply_subscription_event(&self, event: SubscriptionEvent) -> AppResult<()> {
        let mut user = self.resolve_user(&event).await?;

        let subscription = match self
            .raw
            .find_subscription_by_billing_id(&event.billing_subscription_id)
            .await?
        {
            Some(existing) => {
                let updated = Subscription {
                    price_id: event.price_id.clone(),
                    status: event.status,
                    current_period_end: event.current_period_end,
                    cancel_at_period_end: event.cancel_at_period_end,
                    ..existing
                };
                self.raw.update_subscription(updated.clone()).await?;
                updated
            }
            None => {
                let created = Subscription {
                    id: SubscriptionId::new(),
                    user_id: user.id,
                    billing_subscription_id: event.billing_subscription_id.clone(),
                    price_id: event.price_id.clone(),
                    status: event.status,
                    current_period_end: event.current_period_end,
                    cancel_at_period_end: event.cancel_at_period_end,
                    created_at: Utc::now(),
                };
                self.raw.insert_subscription(created.clone()).await?;
                created
            }
        };

        user.plan = subscription.status.plan_tier();
        user.billing_customer_id = Some(event.billing_customer_id.clone());
        self.raw.update_user(user).await
    }

    /// Resolves the user an event belongs to, preferring the stored
    /// billing customer link and falling back to checkout metadata.
    async fn resolve_user(&self, event: &SubscriptionEvent) -> AppResult<UserRecord> {
        if let Some(user) = self
            .raw
            .find_user_by_billing_customer(&event.billing_customer_id)
            .await?
        {
            return Ok(user);
        }

        if let Some(user_id) = event.client_reference {
            if let Some(user) = self.raw.find_user(user_id).await? {
                return Ok(user);
            }
        }

        Err(AppError::NotFound(format!(
            "no user for billing customer '{}'",
            event.billing_customer_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use retroscope_core::AppError;
    use retroscope_domain::{PlanTier, SubscriptionStatus, UserId};
    use crate::in_memory_retro_store::InMemoryRetroStore;

    use crate::store::RetroStore;
    use crate::test_support::{seed_user, store};

    use super::{BillingService, SubscriptionEvent};

    fn service(raw: &Arc<InMemoryRetroStore>) -> BillingService {
        BillingService::new(Arc::clone(raw) as Arc<dyn RetroStore>)
    }

    fn event(
        customer: &str,
        subscription: &str,
        status: SubscriptionStatus,
        client_reference: Option<UserId>,
    ) -> SubscriptionEvent {
        SubscriptionEvent {
            billing_customer_id: customer.to_owned(),
            billing_subscription_id: subscription.to_owned(),
            price_id: "price_pro_monthly".to_owned(),
            status,
            current_period_end: Utc::now(),
            cancel_at_period_end: false,
            client_reference,
        }
    }

    #[tokio::test]
    async fn first_event_links_the_customer_and_upgrades_the_plan() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let service = service(&raw);

        let applied = service
            .apply_subscription_event(event(
                "cus_1",
                "sub_1",
                SubscriptionStatus::Active,
                Some(alice.id),
            ))
            .await;
        assert!(applied.is_ok());

        let stored = raw
            .find_user(alice.id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(stored.plan, PlanTier::Pro);
        assert_eq!(stored.billing_customer_id.as_deref(), Some("cus_1"));
        assert!(
            raw.latest_subscription_for_user(alice.id)
                .await
                .ok()
                .flatten()
                .is_some()
        );
    }

    #[tokio::test]
    async fn later_events_update_the_same_subscription_row() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let service = service(&raw);

        service
            .apply_subscription_event(event(
                "cus_1",
                "sub_1",
                SubscriptionStatus::Active,
                Some(alice.id),
            ))
            .await
            .unwrap_or_else(|_| unreachable!());

        // Second event resolves through the stored customer link.
        service
            .apply_subscription_event(event("cus_1", "sub_1", SubscriptionStatus::Canceled, None))
            .await
            .unwrap_or_else(|_| unreachable!());

        let stored = raw
            .find_user(alice.id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(stored.plan, PlanTier::Free);

        let subscription = raw
            .latest_subscription_for_user(alice.id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(subscription.status, SubscriptionStatus::Canceled);
        assert_eq!(subscription.billing_subscription_id, "sub_1");
    }

    #[tokio::test]
    async fn past_due_subscriptions_keep_the_paid_tier() {
        let raw = store();
        let alice = seed_user(&raw, "idp|alice").await;
        let service = service(&raw);

        service
            .apply_subscription_event(event(
                "cus_1",
                "sub_1",
                SubscriptionStatus::PastDue,
                Some(alice.id),
            ))
            .await
            .unwrap_or_else(|_| unreachable!());

        let stored = raw
            .find_user(alice.id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(stored.plan, PlanTier::Pro);
    }

    #[tokio::test]
    async fn events_for_unknown_customers_are_rejected() {
        let raw = store();
        let service = service(&raw);

        assert!(matches!(
            service
                .apply_subscription_event(event(
                    "cus_ghost",
                    "sub_1",
                    SubscriptionStatus::Active,
                    None,
                ))
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
