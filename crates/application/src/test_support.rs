use std::sync::Arc;

use chrono::Utc;
use retroscope_core::IdentityClaim;
use retroscope_domain::{
    AccessCode, Entry, EntryId, Retro, RetroFormat, RetroId, Subscription, SubscriptionId,
    SubscriptionStatus, UserRecord, Vote, VoteId, VoteValue,
};
use crate::in_memory_retro_store::InMemoryRetroStore;

use crate::store::RetroStore;

pub(crate) fn store() -> Arc<InMemoryRetroStore> {
    Arc::new(InMemoryRetroStore::new())
}

pub(crate) fn claim(subject: &str) -> IdentityClaim {
    IdentityClaim::new(subject, Some(subject.to_owned()), None)
}

pub(crate) async fn seed_user(store: &InMemoryRetroStore, subject: &str) -> UserRecord {
    let user =
        UserRecord::new(subject, subject, None).unwrap_or_else(|_| unreachable!());
    store
        .insert_user(user.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    user
}

pub(crate) async fn seed_retro(
    store: &InMemoryRetroStore,
    owner: &UserRecord,
    code: &str,
) -> Retro {
    let retro = Retro::new(
        RetroId::new(),
        owner.id,
        "Sprint retro",
        RetroFormat::MadSadGlad,
        AccessCode::parse(code).unwrap_or_else(|_| unreachable!()),
        false,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    store
        .insert_retro(retro.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    retro
}

pub(crate) async fn seed_entry(
    store: &InMemoryRetroStore,
    retro_id: RetroId,
    participant_id: &str,
) -> Entry {
    let entry = Entry::new(
        EntryId::new(),
        retro_id,
        "glad",
        "we shipped",
        participant_id,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    store
        .insert_entry(entry.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    entry
}

pub(crate) async fn seed_vote(
    store: &InMemoryRetroStore,
    entry_id: EntryId,
    participant_id: &str,
) -> Vote {
    let vote = Vote {
        id: VoteId::new(),
        entry_id,
        participant_id: participant_id.to_owned(),
        value: VoteValue::Up,
        created_at: Utc::now(),
    };
    store
        .upsert_vote(vote.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    vote
}

pub(crate) async fn seed_subscription(
    store: &InMemoryRetroStore,
    user: &UserRecord,
    billing_subscription_id: &str,
) -> Subscription {
    let subscription = Subscription {
        id: SubscriptionId::new(),
        user_id: user.id,
        billing_subscription_id: billing_subscription_id.to_owned(),
        price_id: "price_pro_monthly".to_owned(),
        status: SubscriptionStatus::Active,
        current_period_end: Utc::now(),
        cancel_at_period_end: false,
        created_at: Utc::now(),
    };
    store
        .insert_subscription(subscription.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    subscription
}
