//! Shared helpers for integration tests.

#![allow(dead_code)]

use inscribe_ledger::models::{Amount, Balance, Event, EventType, OtcOrder, Token};
use inscribe_ledger::{Database, StoreConfig};
use tempfile::TempDir;

/// A store backed by a fresh database file. The directory lives as long as
/// the fixture.
pub struct TestStore {
    pub db: Database,
    pub dir: TempDir,
}

impl TestStore {
    pub fn config(&self) -> StoreConfig {
        StoreConfig::with_path(self.dir.path().join("ledger.sqlite").to_string_lossy())
    }
}

/// Open a store on a temp file with every table created.
pub fn store() -> TestStore {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = StoreConfig::with_path(dir.path().join("ledger.sqlite").to_string_lossy());
    let db = Database::open(&config).expect("open store");
    db.create_all_tables().expect("create tables");
    TestStore { db, dir }
}

pub fn amount(s: &str) -> Amount {
    s.parse().expect("valid amount")
}

pub fn token(id: i64, tick: &str, max: &str) -> Token {
    Token {
        id,
        tick: tick.to_string(),
        max: amount(max),
        lim: amount("1000"),
        dec: 18,
        deployer: "bc1qdeployer".to_string(),
        deploy_time: 1_700_000_000,
        inscription_id: format!("deploy{id}i0"),
        ..Default::default()
    }
}

pub fn balance(address: &str, tid: i64, available: &str, transferable: &str) -> Balance {
    let available = amount(available);
    let transferable = amount(transferable);
    Balance {
        balance: available.checked_add(&transferable).expect("sum"),
        available_balance: available,
        transferable_balance: transferable,
        ..Balance::new(address, tid, "ordi", &format!("deploy{tid}i0"))
    }
}

pub fn event(id: &str, block_height: i64, block_index: i64) -> Event {
    Event {
        id: id.to_string(),
        event_type: EventType::Inscribe,
        block_height,
        block_index,
        timestamp: 1_700_000_000 + block_index,
        inscription_id: format!("{id}i0"),
        inscription_number: block_height * 1000 + block_index,
        sender: "bc1qsender".to_string(),
        receiver: "bc1qreceiver".to_string(),
        content: serde_json::json!({ "p": "brc-20", "op": "mint", "tick": "ordi", "amt": "1000" }),
        operation: "mint".to_string(),
        function_id: 1,
        valid: true,
        error: None,
    }
}

pub fn otc(id: i64, supply: &str) -> OtcOrder {
    OtcOrder {
        id,
        tick1: "ordi".to_string(),
        tid1: 1,
        supply: amount(supply),
        tick2: "sats".to_string(),
        tid2: 2,
        er: amount("2"),
        mba: amount("1"),
        dl: 900_000,
        owner: "bc1qowner".to_string(),
        deploy_time: 1_700_000_000,
        inscription_id: format!("otc{id}i0"),
        valid: true,
        ..Default::default()
    }
}
