//! Insert-or-replace writes keyed by primary key.
//!
//! A conflicting row is overwritten column by column with the incoming
//! entity: the last writer wins for the whole row, nothing is merged.
//! Callers that change a few fields read the row, modify it, and save it back.

use std::collections::HashSet;
use std::fmt;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row, TransactionBehavior};

use super::{traced, Database, TableKind};
use crate::error::{Result, StoreError};
use crate::models::{Balance, Event, OtcOrder, OtcRecord, PendingInscriptions, Token};

/// Primary key value of a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Int(v) => write!(f, "{v}"),
            EntityKey::Text(v) => write!(f, "{v}"),
        }
    }
}

/// A model type persisted as one row of one ledger table.
pub trait Entity: Sized {
    const KIND: TableKind;

    fn key(&self) -> EntityKey;

    /// Column values in the order the table schema declares them.
    fn to_values(&self) -> Result<Vec<Value>>;

    fn from_row(row: &Row<'_>) -> Result<Self>;
}

impl Database {
    /// Insert `entity`, or overwrite every non-key column of the row that
    /// already holds its key.
    pub fn upsert<E: Entity>(&self, entity: &E) -> Result<()> {
        let schema = E::KIND.schema();
        let values = entity.to_values()?;
        debug_assert_eq!(values.len(), schema.columns.len());

        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&schema.upsert_sql())?;
        stmt.execute(params_from_iter(values.iter()))?;

        tracing::debug!(table = schema.name, key = %entity.key(), "upserted row");
        Ok(())
    }

    /// Upsert every entity in one transaction: all rows apply or none do.
    ///
    /// A batch naming the same key twice is rejected before anything is
    /// written.
    pub fn upsert_batch<E: Entity>(&self, entities: &[E]) -> Result<()> {
        let schema = E::KIND.schema();
        if entities.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(entities.len());
        for entity in entities {
            let key = entity.key();
            if !seen.insert(key.clone()) {
                return Err(StoreError::DuplicateKey {
                    table: schema.name,
                    key: key.to_string(),
                });
            }
        }

        let rows = entities
            .iter()
            .map(|e| e.to_values())
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare_cached(&schema.upsert_sql())?;
            for values in &rows {
                debug_assert_eq!(values.len(), schema.columns.len());
                stmt.execute(params_from_iter(values.iter()))?;
            }
        }
        // dropping an uncommitted transaction rolls it back
        tx.commit()?;

        tracing::debug!(table = schema.name, rows = rows.len(), "upserted batch");
        Ok(())
    }

    // ==================== save ====================

    pub fn save_event(&self, event: &Event) -> Result<()> {
        traced("save_event", || self.upsert(event))
    }

    pub fn batch_save_events(&self, events: &[Event]) -> Result<()> {
        traced("batch_save_events", || self.upsert_batch(events))
    }

    pub fn save_pending_inscription(&self, pending: &PendingInscriptions) -> Result<()> {
        traced("save_pending_inscription", || self.upsert(pending))
    }

    pub fn batch_save_pending_inscriptions(&self, pending: &[PendingInscriptions]) -> Result<()> {
        traced("batch_save_pending_inscriptions", || self.upsert_batch(pending))
    }

    pub fn save_token(&self, token: &Token) -> Result<()> {
        traced("save_token", || self.upsert(token))
    }

    pub fn batch_save_tokens(&self, tokens: &[Token]) -> Result<()> {
        traced("batch_save_tokens", || self.upsert_batch(tokens))
    }

    pub fn save_balance(&self, balance: &Balance) -> Result<()> {
        traced("save_balance", || self.upsert(balance))
    }

    pub fn batch_save_balances(&self, balances: &[Balance]) -> Result<()> {
        traced("batch_save_balances", || self.upsert_batch(balances))
    }

    pub fn save_otc(&self, otc: &OtcOrder) -> Result<()> {
        traced("save_otc", || self.upsert(otc))
    }

    pub fn batch_save_otcs(&self, otcs: &[OtcOrder]) -> Result<()> {
        traced("batch_save_otcs", || self.upsert_batch(otcs))
    }

    pub fn save_otc_record(&self, record: &OtcRecord) -> Result<()> {
        traced("save_otc_record", || self.upsert(record))
    }

    pub fn batch_save_otc_records(&self, records: &[OtcRecord]) -> Result<()> {
        traced("batch_save_otc_records", || self.upsert_batch(records))
    }
}
