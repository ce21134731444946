mod common;

use common::{amount, balance, event, otc, store, token};
use inscribe_ledger::models::{OtcRecord, Token};
use inscribe_ledger::{Database, StoreConfig, StoreError};

#[test]
fn block_events_come_back_in_block_index_order() {
    let s = store();
    s.db.save_event(&event("second", 100, 2)).unwrap();
    s.db.save_event(&event("first", 100, 1)).unwrap();
    s.db.save_event(&event("other-block", 101, 0)).unwrap();
    s.db.save_event(&event("third", 100, 7)).unwrap();

    let events = s.db.get_events_by_block_height(100).unwrap();
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["first", "second", "third"]);
    assert!(events.windows(2).all(|w| w[0].block_index < w[1].block_index));

    assert!(s.db.get_events_by_block_height(99).unwrap().is_empty());
}

#[test]
fn missing_rows_are_not_errors() {
    let s = store();
    assert_eq!(s.db.get_token(999_999).unwrap(), None);
    assert_eq!(s.db.get_otc(1).unwrap(), None);
    assert_eq!(s.db.get_event("nope").unwrap(), None);
    assert_eq!(s.db.get_pending_inscription("nobody").unwrap(), None);
    assert!(s.db.get_otc_records(1).unwrap().is_empty());
}

#[test]
fn closed_store_fails_distinctly_from_not_found() {
    let s = store();
    assert_eq!(s.db.get_token(999_999).unwrap(), None);

    s.db.close().unwrap();
    assert!(s.db.is_closed());

    let err = s.db.get_token(999_999).unwrap_err();
    assert!(matches!(err, StoreError::Closed));
    assert!(err.is_connectivity());
    assert!(s.db.save_token(&token(1, "ordi", "1")).unwrap_err().is_connectivity());
}

#[test]
fn unreachable_store_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        connect_timeout_ms: 200,
        ..StoreConfig::with_path(
            dir.path()
                .join("missing")
                .join("nested")
                .join("ledger.sqlite")
                .to_string_lossy(),
        )
    };
    let err = Database::open(&config).err().expect("open must fail");
    assert!(err.is_connectivity(), "{err:?}");
}

#[test]
fn undecodable_row_is_a_mapping_error() {
    let s = store();
    s.db.execute_batch(
        "INSERT INTO token (id, tick, max, lim, dec, ug, mp, deployer, deploy_time, inscription_id)
         VALUES (5, 'bad', 'not-a-number', '1', 18, 0, 0, 'd', 0, 'i')",
    )
    .unwrap();

    match s.db.get_token(5).unwrap_err() {
        StoreError::Mapping { table, reason } => {
            assert_eq!(table, "token");
            assert!(reason.contains("max"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn columns_left_out_take_declared_defaults() {
    let s = store();
    s.db.execute_batch(
        "INSERT INTO token (id, tick, max, lim, dec, ug, mp, deployer, deploy_time, inscription_id)
         VALUES (6, 'dflt', '21000000', '1000', 18, 1, 0, 'bc1qd', 42, 'deploy6i0')",
    )
    .unwrap();

    let stored = s.db.get_token(6).unwrap().unwrap();
    let expected = Token {
        id: 6,
        tick: "dflt".into(),
        max: amount("21000000"),
        lim: amount("1000"),
        dec: 18,
        ug: true,
        mp: false,
        deployer: "bc1qd".into(),
        deploy_time: 42,
        inscription_id: "deploy6i0".into(),
        ..Default::default()
    };
    assert_eq!(stored, expected);
    assert!(stored.upgrade_records.is_empty());
    assert_eq!(stored.first_id, "");
}

#[test]
fn decimal_values_survive_storage_exactly() {
    let s = store();
    let mut t = token(7, "prec", "99999999999999999999.999999999999999999");
    t.minted = amount("0.000000000000000001");
    t.circulating = amount("0.000000000000000001");
    s.db.save_token(&t).unwrap();

    let stored = s.db.get_token(7).unwrap().unwrap();
    assert_eq!(stored.max.to_string(), "99999999999999999999.999999999999999999");
    assert_eq!(stored.minted.to_string(), "0.000000000000000001");
}

#[test]
fn secondary_index_lookups() {
    let s = store();
    let mut t1 = token(1, "ordi", "100");
    t1.deployer = "alice".into();
    let mut t2 = token(2, "sats", "100");
    t2.deployer = "alice".into();
    let t3 = token(3, "pepe", "100");
    s.db.batch_save_tokens(&[t3.clone(), t2.clone(), t1.clone()]).unwrap();

    assert_eq!(s.db.get_tokens_by_deployer("alice").unwrap(), vec![t1.clone(), t2]);
    assert_eq!(
        s.db.get_token_by_inscription_id("deploy3i0").unwrap(),
        Some(t3)
    );
    assert_eq!(s.db.get_token_by_inscription_id("nothing").unwrap(), None);

    s.db.batch_save_balances(&[
        balance("alice", 2, "1", "0"),
        balance("alice", 1, "2", "0"),
        balance("bob", 1, "3", "0"),
    ])
    .unwrap();
    let alice: Vec<i64> = s.db.get_balances_by_address("alice").unwrap().iter().map(|b| b.tid).collect();
    assert_eq!(alice, [1, 2]);
    let holders: Vec<String> = s.db.get_balances_by_token(1).unwrap().into_iter().map(|b| b.address).collect();
    assert_eq!(holders, ["alice", "bob"]);

    let mut o1 = otc(20, "10");
    o1.owner = "carol".into();
    let mut o2 = otc(21, "10");
    o2.tid1 = 9;
    o2.tid2 = 1;
    s.db.batch_save_otcs(&[o1.clone(), o2.clone()]).unwrap();

    assert_eq!(s.db.get_otcs_by_owner("carol").unwrap(), vec![o1.clone()]);
    assert_eq!(s.db.get_otc_by_inscription_id("otc21i0").unwrap(), Some(o2.clone()));
    assert_eq!(s.db.get_otcs_by_offered_token(1).unwrap(), vec![o1.clone()]);
    assert_eq!(s.db.get_otcs_by_offered_token(9).unwrap(), vec![o2.clone()]);
    assert_eq!(s.db.get_otcs_by_requested_token(1).unwrap(), vec![o2]);
    assert_eq!(s.db.get_otcs_by_requested_token(2).unwrap(), vec![o1]);

    let record = OtcRecord {
        id: "evt1".into(),
        oid: 20,
        inscription_id: "fill1i0".into(),
        address: "dave".into(),
        amount_out: amount("2"),
        amount_in: amount("1"),
    };
    s.db.save_otc_record(&record).unwrap();
    assert_eq!(s.db.get_otc_records_by_inscription_id("fill1i0").unwrap(), vec![record.clone()]);
    assert_eq!(s.db.get_otc_records_by_address("dave").unwrap(), vec![record]);
    assert!(s.db.get_otc_records_by_address("erin").unwrap().is_empty());
}
