// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal_macros::dec;
use tradelog::models::{Direction, Outcome};
use tradelog::store::{ListOrder, TradeStore};
use tradelog::{cli, commands::trades};

fn setup() -> TradeStore {
    let store = TradeStore::new(Connection::open_in_memory().unwrap());
    store.create_schema().unwrap();
    store
}

/// Parse `tradelog trade ...` and hand the `trade` matches to the handler.
fn run(store: &TradeStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["tradelog", "trade"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("trade", sub)) => trades::handle(store, sub),
        _ => panic!("no trade subcommand"),
    }
}

fn add(store: &TradeStore, date: &str, pnl: &str) {
    run(
        store,
        &[
            "add", "--date", date, "--instrument", "Nifty", "--direction", "Buy", "--entry", "100",
            "--sl", "95", "--tp", "110", "--pnl", pnl,
        ],
    )
    .unwrap();
}

#[test]
fn add_computes_and_stores_risk_reward() {
    let store = setup();
    run(
        &store,
        &[
            "add", "--date", "15/01/2025", "--instrument", "Bank Nifty", "--direction", "sell",
            "--entry", "48000", "--sl", "48150", "--tp", "47600", "--pnl", "-2250", "--qty", "15",
            "--outcome", "SL Hit", "--fib", "61.8", "--retest", "--tags", "fade",
        ],
    )
    .unwrap();

    let rows = store.list_all(ListOrder::Inserted).unwrap();
    assert_eq!(rows.len(), 1);
    let t = &rows[0].fields;
    assert_eq!(t.date, "2025-01-15");
    assert_eq!(t.direction, Direction::Sell);
    // 400 / 150 = 2.666..
    assert_eq!(t.risk_to_reward, dec!(2.67));
    assert_eq!(t.outcome, Some(Outcome::SlHit));
    assert_eq!(t.quantity, Some(15));
    assert!(t.retest && !t.bos);
    assert_eq!(t.tags.as_deref(), Some("fade"));
    assert_eq!(t.notes, None);
}

#[test]
fn stop_at_entry_stores_zero_ratio() {
    let store = setup();
    run(
        &store,
        &[
            "add", "--date", "2025-01-02", "--instrument", "Equity", "--direction", "Buy",
            "--entry", "250", "--sl", "250", "--tp", "260", "--pnl", "0",
        ],
    )
    .unwrap();
    let rows = store.list_all(ListOrder::Inserted).unwrap();
    assert_eq!(rows[0].fields.risk_to_reward, dec!(0));
}

#[test]
fn malformed_number_is_not_persisted() {
    let store = setup();
    let err = run(
        &store,
        &[
            "add", "--date", "2025-01-02", "--instrument", "Nifty", "--direction", "Buy",
            "--entry", "1o0", "--sl", "95", "--tp", "110", "--pnl", "5",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid decimal '1o0' for entry"));
    assert!(store.list_all(ListOrder::Inserted).unwrap().is_empty());
}

#[test]
fn zero_quantity_is_rejected() {
    let store = setup();
    let err = run(
        &store,
        &[
            "add", "--date", "2025-01-02", "--instrument", "Nifty", "--direction", "Buy",
            "--entry", "100", "--sl", "95", "--tp", "110", "--pnl", "5", "--qty", "0",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("must be at least 1"));
    assert!(store.list_all(ListOrder::Inserted).unwrap().is_empty());
}

#[test]
fn list_orders_by_date_and_respects_limit() {
    let store = setup();
    add(&store, "2025-01-01", "10");
    add(&store, "2025-01-03", "30");
    add(&store, "2025-01-02", "-20");

    let matches = cli::build_cli().get_matches_from(["tradelog", "trade", "list", "--limit", "2"]);
    let Some(("trade", trade_m)) = matches.subcommand() else {
        panic!("no trade subcommand");
    };
    let Some(("list", list_m)) = trade_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = trades::query_rows(&store, list_m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].fields.date, "2025-01-03");
    assert_eq!(rows[1].fields.date, "2025-01-02");

    let matches =
        cli::build_cli().get_matches_from(["tradelog", "trade", "list", "--order", "inserted"]);
    let (_, trade_m) = matches.subcommand().unwrap();
    let (_, list_m) = trade_m.subcommand().unwrap();
    let dates: Vec<String> = trades::query_rows(&store, list_m)
        .unwrap()
        .into_iter()
        .map(|t| t.fields.date)
        .collect();
    assert_eq!(dates, vec!["2025-01-01", "2025-01-03", "2025-01-02"]);
}

#[test]
fn list_filters_by_regex_over_tags_and_notes() {
    let store = setup();
    add(&store, "2025-01-01", "10");
    run(
        &store,
        &[
            "add", "--date", "2025-01-02", "--instrument", "Nifty", "--direction", "Buy",
            "--entry", "100", "--sl", "95", "--tp", "110", "--pnl", "5", "--notes",
            "Gap fill after CPI",
        ],
    )
    .unwrap();

    let matches =
        cli::build_cli().get_matches_from(["tradelog", "trade", "list", "--match", "(?i)gap"]);
    let (_, trade_m) = matches.subcommand().unwrap();
    let (_, list_m) = trade_m.subcommand().unwrap();
    let rows = trades::query_rows(&store, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields.date, "2025-01-02");

    let matches = cli::build_cli().get_matches_from(["tradelog", "trade", "list", "--match", "("]);
    let (_, trade_m) = matches.subcommand().unwrap();
    let (_, list_m) = trade_m.subcommand().unwrap();
    let err = trades::query_rows(&store, list_m).unwrap_err();
    assert!(err.to_string().contains("Invalid regex pattern '('"));
}

#[test]
fn edit_recomputes_ratio_and_keeps_unspecified_fields() {
    let store = setup();
    run(
        &store,
        &[
            "add", "--date", "2025-01-02", "--instrument", "Nifty", "--direction", "Buy",
            "--entry", "100", "--sl", "95", "--tp", "110", "--pnl", "5", "--tags", "orb", "--bos",
        ],
    )
    .unwrap();
    let id = store.list_all(ListOrder::Inserted).unwrap()[0].id;
    let id_s = id.to_string();

    run(&store, &["edit", &id_s, "--tp", "120", "--bos", "false", "--tags", ""]).unwrap();

    let t = store.get(id).unwrap().unwrap().fields;
    assert_eq!(t.take_profit, dec!(120));
    assert_eq!(t.risk_to_reward, dec!(4));
    assert_eq!(t.profit_loss, dec!(5));
    assert_eq!(t.date, "2025-01-02");
    assert!(!t.bos);
    assert_eq!(t.tags, None);
}

#[test]
fn edit_and_rm_of_unknown_id_change_nothing() {
    let store = setup();
    add(&store, "2025-01-01", "10");
    let before = store.list_all(ListOrder::Inserted).unwrap();

    run(&store, &["edit", "999", "--pnl", "1"]).unwrap();
    run(&store, &["rm", "999"]).unwrap();

    assert_eq!(store.list_all(ListOrder::Inserted).unwrap(), before);
}

#[test]
fn rm_deletes_the_row() {
    let store = setup();
    add(&store, "2025-01-01", "10");
    add(&store, "2025-01-02", "20");
    let first = store.list_all(ListOrder::Inserted).unwrap()[0].id;
    run(&store, &["rm", &first.to_string()]).unwrap();
    let left = store.list_all(ListOrder::Inserted).unwrap();
    assert_eq!(left.len(), 1);
    assert_ne!(left[0].id, first);
}
