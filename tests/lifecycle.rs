mod common;

use common::{balance, event, store, token};
use inscribe_ledger::{Database, StoreError, TableKind};

fn counts(db: &Database) -> Vec<(TableKind, i64)> {
    db.table_counts()
        .unwrap()
        .into_iter()
        .map(|c| (c.table, c.rows))
        .collect()
}

#[test]
fn create_is_idempotent_and_keeps_rows() {
    let s = store();
    s.db.save_token(&token(1, "ordi", "100")).unwrap();

    s.db.create_all_tables().unwrap();
    s.db.create_table(TableKind::Token).unwrap();

    assert!(s.db.get_token(1).unwrap().is_some());
}

#[test]
fn clear_table_empties_only_that_table() {
    let s = store();
    s.db.save_token(&token(1, "ordi", "100")).unwrap();
    s.db.save_balance(&balance("A", 1, "1", "0")).unwrap();

    s.db.clear_table(TableKind::Token).unwrap();

    assert_eq!(s.db.get_token(1).unwrap(), None);
    assert!(s.db.get_balance("A", 1).unwrap().is_some());

    // the recreated table accepts writes again
    s.db.save_token(&token(2, "sats", "100")).unwrap();
    assert!(s.db.get_token(2).unwrap().is_some());
}

#[test]
fn clear_all_tables_resets_state_but_keeps_events() {
    let s = store();
    s.db.save_token(&token(1, "ordi", "100")).unwrap();
    s.db.save_balance(&balance("A", 1, "1", "0")).unwrap();
    s.db.save_event(&event("e1", 1, 0)).unwrap();

    s.db.clear_all_tables().unwrap();

    let counts = counts(&s.db);
    assert_eq!(counts.len(), 6);
    for (table, rows) in counts {
        let expected = if table == TableKind::Event { 1 } else { 0 };
        assert_eq!(rows, expected, "{table}");
    }
    assert!(s.db.get_event("e1").unwrap().is_some());

    s.db.clear_table(TableKind::Event).unwrap();
    assert_eq!(s.db.get_event("e1").unwrap(), None);
}

fn index_names(s: &common::TestStore, table: &str) -> Vec<String> {
    let conn = rusqlite::Connection::open(s.config().database_path).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL ORDER BY name")
        .unwrap();
    let names = stmt
        .query_map([table], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

#[test]
fn clear_table_rebuilds_indexes() {
    let s = store();
    assert_eq!(index_names(&s, "balance"), ["idx_balance_address", "idx_balance_tid"]);

    s.db.clear_table(TableKind::Balance).unwrap();
    assert_eq!(index_names(&s, "balance"), ["idx_balance_address", "idx_balance_tid"]);
    assert_eq!(
        index_names(&s, "otc"),
        ["idx_otc_inscription_id", "idx_otc_owner", "idx_otc_tid1", "idx_otc_tid2"]
    );
    assert_eq!(index_names(&s, "event"), ["idx_event_block"]);
    assert!(index_names(&s, "pending_inscriptions").is_empty());
}

#[test]
fn close_twice_reports_closed() {
    let s = store();
    s.db.close().unwrap();
    assert!(matches!(s.db.close(), Err(StoreError::Closed)));
    assert!(s.db.create_all_tables().unwrap_err().is_connectivity());
}

#[test]
fn clones_share_one_pool() {
    let s = store();
    let other = s.db.clone();
    other.save_token(&token(1, "ordi", "100")).unwrap();
    assert!(s.db.get_token(1).unwrap().is_some());

    s.db.close().unwrap();
    assert!(other.is_closed());
}
