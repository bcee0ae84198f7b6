use std::sync::Arc;

use retroscope_core::{AppResult, IdentityClaim};
use retroscope_domain::UserRecord;

use crate::store::RetroStore;

/// Privileged account sync keyed by external-identity subject.
///
/// Runs on first authentication, before a local user row exists, so it
/// holds the raw store rather than the guarded one; the user-insert
/// access rule is best effort and this is the real creation path.
#[derive(Clone)]
pub struct AccountService {
    raw: Arc<dyn RetroStore>,
}

impl AccountService {
    /// Creates the service over the raw store.
    #[must_use]
    pub fn new(raw: Arc<dyn RetroStore>) -> Self {
        Self { raw }
    }

    /// Upserts the local user row for a verified claim.
    ///
    /// Creates a free-tier row on first sight of the subject; on later
    /// calls refreshes name and email from the provider profile.
    pub async fn sync_account(&self, claim: &IdentityClaim) -> AppResult<UserRecord> {
        let name = claim
            .name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(claim.subject())
            .to_owned();
        let email = claim.email().map(str::to_owned);

        match self.raw.find_user_by_subject(claim.subject()).await? {
            Some(mut existing) => {
                if existing.name != name || existing.email != email {
                    existing.name = name;
                    existing.email = email;
                    self.raw.update_user(existing.clone()).await?;
                }
                Ok(existing)
            }
            None => {
                let user = UserRecord::new(claim.subject(), name, email)?;
                self.raw.insert_user(user.clone()).await?;
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use retroscope_core::IdentityClaim;
    use retroscope_domain::PlanTier;
    use crate::in_memory_retro_store::InMemoryRetroStore;

    use crate::store::RetroStore;
    use crate::test_support::store;

    use super::AccountService;

    fn service(raw: &Arc<InMemoryRetroStore>) -> AccountService {
        AccountService::new(Arc::clone(raw) as Arc<dyn RetroStore>)
    }

    #[tokio::test]
    async fn first_sync_creates_a_free_tier_row() {
        let raw = store();
        let service = service(&raw);

        let claim = IdentityClaim::new(
            "idp|alice",
            Some("Alice".to_owned()),
            Some("alice@example.com".to_owned()),
        );
        let user = service
            .sync_account(&claim)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(user.subject, "idp|alice");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.plan, PlanTier::Free);
        assert!(
            raw.find_user_by_subject("idp|alice")
                .await
                .ok()
                .flatten()
                .is_some()
        );
    }

    #[tokio::test]
    async fn repeated_syncs_keep_one_row_and_refresh_the_profile() {
        let raw = store();
        let service = service(&raw);

        let first = service
            .sync_account(&IdentityClaim::new(
                "idp|alice",
                Some("Alice".to_owned()),
                None,
            ))
            .await
            .unwrap_or_else(|_| unreachable!());
        let second = service
            .sync_account(&IdentityClaim::new(
                "idp|alice",
                Some("Alice Liddell".to_owned()),
                Some("alice@example.com".to_owned()),
            ))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Alice Liddell");
        assert_eq!(second.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn missing_profile_name_falls_back_to_the_subject() {
        let raw = store();
        let service = service(&raw);

        let user = service
            .sync_account(&IdentityClaim::new("idp|bob", None, None))
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(user.name, "idp|bob");
    }

    #[tokio::test]
    async fn sync_never_touches_the_plan_tier() {
        let raw = store();
        let service = service(&raw);

        let mut user = service
            .sync_account(&IdentityClaim::new(
                "idp|alice",
                Some("Alice".to_owned()),
                None,
            ))
            .await
            .unwrap_or_else(|_| unreachable!());
        user.plan = PlanTier::Pro;
        raw.update_user(user.clone())
            .await
            .unwrap_or_else(|_| unreachable!());

        let resynced = service
            .sync_account(&IdentityClaim::new(
                "idp|alice",
                Some("Alice Liddell".to_owned()),
                None,
            ))
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(resynced.plan, PlanTier::Pro);
    }
}
