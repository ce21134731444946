//! Persistence layer for an inscription-based token ledger.
//!
//! Stores token deployments, balances, decoded events, pending inscription
//! queues, OTC orders and their fills. Writes are whole-row upserts keyed by
//! primary key; see [`Database::upsert`].

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::StoreConfig;
pub use db::{Database, Entity, EntityKey, TableKind};
pub use error::{Result, StoreError};
