mod lifecycle;
mod query;
mod rows;
pub mod schema;
mod upsert;

use std::sync::{Arc, RwLock};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Params, Row};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

pub use schema::{TableKind, TableSchema};
pub use upsert::{Entity, EntityKey};

pub(crate) type DbConn = PooledConnection<SqliteConnectionManager>;

/// Handle to the ledger store.
///
/// Cheap to clone; all clones share one connection pool. Every call checks a
/// connection out of the pool for its own duration only.
#[derive(Clone)]
pub struct Database {
    pool: Arc<RwLock<Option<Pool<SqliteConnectionManager>>>>,
}

impl Database {
    /// Build the connection pool. Fails if no connection can be established
    /// within the configured timeout.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let busy_timeout = config.busy_timeout();
        let manager = SqliteConnectionManager::file(&config.database_path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            // journal_mode answers with a row, so it cannot go through execute
            conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))
        });

        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(config.connect_timeout())
            .build(manager)
            .map_err(|e| {
                let err = StoreError::Connectivity(format!(
                    "failed to open {}: {e}",
                    config.database_path
                ));
                tracing::error!(op = "open", error = %err, "store operation failed");
                err
            })?;

        tracing::info!(
            path = %config.database_path,
            max_connections = config.max_connections,
            "Ledger store opened"
        );

        Ok(Self {
            pool: Arc::new(RwLock::new(Some(pool))),
        })
    }

    /// Release the pool. Fails if connections are still checked out; the
    /// handle stays open in that case. Calls after a successful close fail
    /// with [`StoreError::Closed`].
    pub fn close(&self) -> Result<()> {
        let mut guard = self
            .pool
            .write()
            .map_err(|_| StoreError::Connectivity("pool lock poisoned".into()))?;

        let Some(pool) = guard.as_ref() else {
            return Err(log_failure("close", StoreError::Closed));
        };

        let state = pool.state();
        let in_use = state.connections - state.idle_connections;
        if in_use > 0 {
            return Err(log_failure(
                "close",
                StoreError::Connectivity(format!("{in_use} connection(s) still in use")),
            ));
        }

        *guard = None;
        tracing::info!("Ledger store closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.pool.read().map(|p| p.is_none()).unwrap_or(true)
    }

    /// Check a connection out of the pool. It returns to the pool when the
    /// guard drops, on success and failure alike.
    ///
    /// The read lock is held across the checkout, so `close()` either sees
    /// the connection in use or runs before it is taken.
    pub(crate) fn conn(&self) -> Result<DbConn> {
        let guard = self
            .pool
            .read()
            .map_err(|_| StoreError::Connectivity("pool lock poisoned".into()))?;
        let pool = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(pool.get()?)
    }

    /// Run raw SQL. Meant for provisioning and fixtures, not ledger writes.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        traced("execute_batch", || {
            let conn = self.conn()?;
            Ok(conn.execute_batch(sql)?)
        })
    }

    fn query_one<T, P>(&self, kind: TableKind, predicate: &str, params: P) -> Result<Option<T>>
    where
        T: Entity,
        P: Params,
    {
        let conn = self.conn()?;
        let sql = format!("{} WHERE {predicate}", kind.schema().select_sql());
        let mut stmt = conn.prepare_cached(&sql)?;
        // decode outside query_row so mapping failures keep their table name
        let row = stmt
            .query_row(params, |row| Ok(T::from_row(row)))
            .optional()?;
        row.transpose()
    }

    fn query_all<T, P>(&self, kind: TableKind, tail: &str, params: P) -> Result<Vec<T>>
    where
        T: Entity,
        P: Params,
    {
        let conn = self.conn()?;
        let sql = format!("{} WHERE {tail}", kind.schema().select_sql());
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params)?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(T::from_row(row)?);
        }
        Ok(results)
    }

    /// Row count of every ledger table.
    pub fn table_counts(&self) -> Result<Vec<TableCount>> {
        traced("table_counts", || {
            let conn = self.conn()?;
            TableKind::ALL
                .into_iter()
                .map(|kind| -> Result<TableCount> {
                    let rows: i64 = conn.query_row(
                        &format!("SELECT COUNT(*) FROM \"{}\"", kind.name()),
                        [],
                        |row: &Row<'_>| row.get(0),
                    )?;
                    Ok(TableCount { table: kind, rows })
                })
                .collect()
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TableCount {
    pub table: TableKind,
    pub rows: i64,
}

/// Log a failure with the operation that produced it and hand it back.
fn log_failure(op: &'static str, err: StoreError) -> StoreError {
    tracing::error!(op, error = %err, "store operation failed");
    err
}

/// Run one store operation, logging its failure before propagating it.
fn traced<T>(op: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f().map_err(|e| log_failure(op, e))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use super::*;

    fn open(dir: &tempfile::TempDir) -> Database {
        let config = StoreConfig::with_path(dir.path().join("ledger.sqlite").to_string_lossy());
        Database::open(&config).unwrap()
    }

    #[test]
    fn close_refuses_while_a_connection_is_out() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir);

        let conn = db.conn().unwrap();
        assert!(db.close().unwrap_err().is_connectivity());
        assert!(!db.is_closed());

        drop(conn);
        db.close().unwrap();
        assert!(matches!(db.conn(), Err(StoreError::Closed)));
    }

    #[test]
    fn close_never_succeeds_under_a_live_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let db = open(&dir);
        let closed = Arc::new(AtomicBool::new(false));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let db = db.clone();
                let closed = Arc::clone(&closed);
                thread::spawn(move || loop {
                    match db.conn() {
                        Ok(conn) => {
                            assert!(!closed.load(Ordering::SeqCst), "checkout outlived close");
                            drop(conn);
                        }
                        Err(StoreError::Closed) => break,
                        Err(other) => panic!("unexpected error {other:?}"),
                    }
                })
            })
            .collect();

        while db.close().is_err() {
            thread::yield_now();
        }
        closed.store(true, Ordering::SeqCst);

        for w in workers {
            w.join().unwrap();
        }
    }
}
