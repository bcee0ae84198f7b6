//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod entry;
mod retro;
mod subscription;
mod user;
mod vote;

pub use entry::{ENTRY_CONTENT_MAX_LENGTH, Entry, EntryId, validate_participant_id};
pub use retro::{AccessCode, RETRO_TITLE_MAX_LENGTH, Retro, RetroFormat, RetroId};
pub use subscription::{Subscription, SubscriptionId, SubscriptionStatus};
pub use user::{PlanTier, UserId, UserRecord};
pub use vote::{Vote, VoteId, VoteValue};
