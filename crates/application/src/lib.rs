//! Application services and the row-level authorization core.
//!
//! Every authenticated request handler works through a [`GuardedStore`]
//! built per call by the [`ContextBuilder`]; access rules evaluate
//! against the raw [`RetroStore`] and never re-enter the guard. The
//! anonymous participation and billing webhook paths hold the raw store
//! directly and carry their own inline checks.

#![forbid(unsafe_code)]

// The in-memory store is compiled into the test build directly (rather
// than pulled in through a retroscope-infrastructure dev-dependency)
// because a dev-dependency cycle would link a second copy of this crate
// and split the `RetroStore` trait identity. The self alias lets the
// shared source file name this crate by its package name.
#[cfg(test)]
extern crate self as retroscope_application;

mod account_service;
mod billing_service;
mod context;
mod guard;
mod participation_service;
mod retro_service;
mod rules;
mod store;

#[cfg(test)]
#[path = "../../infrastructure/src/in_memory_retro_store.rs"]
mod in_memory_retro_store;

#[cfg(test)]
mod test_support;

pub use account_service::AccountService;
pub use billing_service::{BillingService, SubscriptionEvent};
pub use context::{ContextBuilder, RequestContext, resolve_principal};
pub use guard::GuardedStore;
pub use participation_service::{BoardEntry, BoardSnapshot, ParticipationService};
pub use retro_service::{RetroPatch, RetroService};
pub use rules::{AccessRules, RuleScope};
pub use store::RetroStore;
