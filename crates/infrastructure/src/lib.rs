//! Infrastructure adapters for the raw store port.

#![forbid(unsafe_code)]

mod in_memory_retro_store;
mod postgres_retro_store;

pub use in_memory_retro_store::InMemoryRetroStore;
pub use postgres_retro_store::PostgresRetroStore;
