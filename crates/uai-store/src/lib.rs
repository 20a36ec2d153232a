//! # uai-store
//!
//! Transactional persistence for users, credentials and role grants.
//!
//! Work that must commit atomically is handed to [`Store::exec_tx`] as a
//! closure over a [`Queries`] handle. The closure only ever sees query
//! operations; begin, commit and rollback stay with the store.
//!
//! Two backends are provided:
//! - [`PgStore`]: Postgres through `sqlx`
//! - [`MemoryStore`]: an in-process store with the same constraint and
//!   atomicity behavior, used for development and tests

pub mod error;
pub mod memory;
pub mod postgres;
pub mod queries;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use queries::{Queries, Store, TxFuture};
