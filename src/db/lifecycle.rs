//! Table provisioning and destructive reset

use rusqlite::Transaction;

use super::{traced, Database, TableKind};
use crate::error::Result;

fn create(tx: &Transaction<'_>, kind: TableKind) -> Result<()> {
    let schema = kind.schema();
    tx.execute(&schema.create_table_sql(), [])?;
    for sql in schema.create_index_sql() {
        tx.execute(&sql, [])?;
    }
    Ok(())
}

impl Database {
    /// Create the table and its indexes if they do not exist yet.
    pub fn create_table(&self, kind: TableKind) -> Result<()> {
        traced("create_table", || {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;
            create(&tx, kind)?;
            tx.commit()?;
            tracing::info!(table = %kind, "table ready");
            Ok(())
        })
    }

    pub fn create_all_tables(&self) -> Result<()> {
        TableKind::ALL
            .into_iter()
            .try_for_each(|kind| self.create_table(kind))
    }

    /// Drop the table with all its rows and recreate it empty. Irreversible.
    ///
    /// No other table references a ledger table, so dropping one takes only
    /// its own indexes with it.
    pub fn clear_table(&self, kind: TableKind) -> Result<()> {
        traced("clear_table", || {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;
            tx.execute(&kind.schema().drop_table_sql(), [])?;
            create(&tx, kind)?;
            tx.commit()?;
            tracing::info!(table = %kind, "table cleared");
            Ok(())
        })
    }

    /// Reset all derived ledger state. The event log is kept so the ledger
    /// can be rebuilt from it; use `clear_table(TableKind::Event)` to drop it.
    pub fn clear_all_tables(&self) -> Result<()> {
        TableKind::ALL
            .into_iter()
            .filter(|kind| *kind != TableKind::Event)
            .try_for_each(|kind| self.clear_table(kind))
    }
}
