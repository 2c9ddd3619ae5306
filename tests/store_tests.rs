// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal_macros::dec;
use tradelog::models::{Direction, FibLevel, NewTrade, Outcome};
use tradelog::store::{ListOrder, TradeStore};

fn setup() -> TradeStore {
    let store = TradeStore::new(Connection::open_in_memory().unwrap());
    store.create_schema().unwrap();
    store
}

fn nifty_long() -> NewTrade {
    NewTrade {
        date: "2025-04-01".into(),
        instrument: "Nifty".into(),
        direction: Direction::Buy,
        quantity: Some(75),
        entry_price: dec!(22450.50),
        exit_price: Some(dec!(22510)),
        stop_loss: dec!(22400.50),
        take_profit: dec!(22550.50),
        risk_to_reward: dec!(2),
        outcome: Some(Outcome::TpHit),
        profit_loss: dec!(4462.50),
        tags: Some("breakout".into()),
        notes: Some("opening range".into()),
        bos: true,
        retest: false,
        fib_retracement: Some(FibLevel::L618),
    }
}

fn banknifty_short() -> NewTrade {
    NewTrade {
        date: "2025-04-02".into(),
        instrument: "Bank Nifty".into(),
        direction: Direction::Sell,
        quantity: None,
        entry_price: dec!(48000),
        exit_price: None,
        stop_loss: dec!(48100),
        take_profit: dec!(47700),
        risk_to_reward: dec!(3),
        outcome: Some(Outcome::SlHit),
        profit_loss: dec!(-1500),
        tags: None,
        notes: None,
        bos: false,
        retest: true,
        fib_retracement: None,
    }
}

#[test]
fn append_then_list_returns_the_same_fields() {
    let store = setup();
    let first = store.append(&nifty_long()).unwrap();
    let second = store.append(&banknifty_short()).unwrap();
    assert!(second > first);

    let rows = store.list_all(ListOrder::Inserted).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, first);
    assert_eq!(rows[0].fields, nifty_long());
    assert_eq!(rows[1].fields, banknifty_short());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let store = setup();
    let a = store.append(&nifty_long()).unwrap();
    let b = store.append(&nifty_long()).unwrap();
    assert!(store.delete(b).unwrap());
    let c = store.append(&nifty_long()).unwrap();
    assert!(c > b && b > a);
}

#[test]
fn update_replaces_every_field() {
    let store = setup();
    let id = store.append(&nifty_long()).unwrap();
    assert!(store.update(id, &banknifty_short()).unwrap());

    let rows = store.list_all(ListOrder::Inserted).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    // optional fields from the old row are not carried over
    assert_eq!(rows[0].fields, banknifty_short());
    assert_eq!(rows[0].fields.tags, None);
    assert_eq!(rows[0].fields.fib_retracement, None);
}

#[test]
fn update_of_missing_id_is_a_no_op() {
    let store = setup();
    let id = store.append(&nifty_long()).unwrap();
    assert!(!store.update(id + 100, &banknifty_short()).unwrap());
    let rows = store.list_all(ListOrder::Inserted).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields, nifty_long());
}

#[test]
fn delete_removes_only_that_id() {
    let store = setup();
    let a = store.append(&nifty_long()).unwrap();
    let b = store.append(&banknifty_short()).unwrap();
    assert!(store.delete(a).unwrap());
    let ids: Vec<i64> = store
        .list_all(ListOrder::Inserted)
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![b]);

    assert!(!store.delete(a).unwrap());
    assert_eq!(store.list_all(ListOrder::Inserted).unwrap().len(), 1);
}

#[test]
fn create_schema_twice_keeps_data() {
    let store = setup();
    store.append(&nifty_long()).unwrap();
    store.create_schema().unwrap();
    store.create_schema().unwrap();

    let tables: i64 = store
        .conn()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='trades'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(tables, 1);
    assert_eq!(store.list_all(ListOrder::Inserted).unwrap().len(), 1);
}

#[test]
fn get_returns_none_for_unknown_id() {
    let store = setup();
    let id = store.append(&banknifty_short()).unwrap();
    assert_eq!(store.get(id).unwrap().unwrap().fields, banknifty_short());
    assert!(store.get(id + 1).unwrap().is_none());
}

#[test]
fn open_creates_the_file_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.sqlite");
    {
        let store = TradeStore::open(&path).unwrap();
        store.append(&nifty_long()).unwrap();
    }
    let reopened = TradeStore::open(&path).unwrap();
    assert_eq!(reopened.list_all(ListOrder::DateDesc).unwrap().len(), 1);
}
