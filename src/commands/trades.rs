// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::RiskReward;
use crate::error::JournalError;
use crate::models::{NewTrade, Trade, instrument_name};
use crate::settings::{DateFormat, Settings};
use crate::store::{ListOrder, TradeStore};
use crate::utils::{fmt_money, maybe_print_json, non_empty, parse_date, parse_decimal, pretty_table};
use anyhow::{Context, Result, anyhow};
use regex::Regex;
use rust_decimal::Decimal;

pub fn handle(store: &TradeStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("show", sub)) => show(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn text<'a>(sub: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    sub.get_one::<String>(name).map(|s| s.as_str())
}

/// A required value: taken from the arguments, else from `base`, else an error.
fn field<T>(
    sub: &clap::ArgMatches,
    name: &str,
    base: Option<T>,
    parse: impl FnOnce(&str) -> Result<T, JournalError>,
) -> Result<T> {
    match text(sub, name) {
        Some(raw) => Ok(parse(raw)?),
        None => base.ok_or_else(|| anyhow!("--{} is required", name)),
    }
}

/// An optional value: an empty argument clears it, an absent one keeps `base`.
fn optional<T>(
    sub: &clap::ArgMatches,
    name: &str,
    base: Option<T>,
    parse: impl FnOnce(&str) -> Result<T, JournalError>,
) -> Result<Option<T>> {
    match text(sub, name) {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => Ok(Some(parse(raw)?)),
        None => Ok(base),
    }
}

/// Build a complete record from the arguments. With `base`, unspecified
/// arguments keep the base value; the risk/reward ratio is always recomputed.
pub fn trade_from_args(sub: &clap::ArgMatches, base: Option<&NewTrade>) -> Result<NewTrade> {
    let date = field(sub, "date", base.map(|b| b.date.clone()), |s| {
        parse_date(s).map(|d| d.to_string())
    })?;
    let instrument = field(sub, "instrument", base.map(|b| b.instrument.clone()), |s| {
        Ok(instrument_name(s))
    })?;
    if instrument.is_empty() {
        return Err(anyhow!("Instrument must not be empty"));
    }
    let direction = field(sub, "direction", base.map(|b| b.direction), |s| s.parse())?;
    let entry_price = field(sub, "entry", base.map(|b| b.entry_price), |s| {
        parse_decimal("entry", s)
    })?;
    let stop_loss = field(sub, "sl", base.map(|b| b.stop_loss), |s| {
        parse_decimal("stop-loss", s)
    })?;
    let take_profit = field(sub, "tp", base.map(|b| b.take_profit), |s| {
        parse_decimal("take-profit", s)
    })?;
    let profit_loss = field(sub, "pnl", base.map(|b| b.profit_loss), |s| {
        parse_decimal("profit/loss", s)
    })?;
    let exit_price = optional(sub, "exit", base.and_then(|b| b.exit_price), |s| {
        parse_decimal("exit", s)
    })?;
    let outcome = optional(sub, "outcome", base.and_then(|b| b.outcome), |s| s.parse())?;
    let fib_retracement = optional(sub, "fib", base.and_then(|b| b.fib_retracement), |s| {
        s.parse()
    })?;

    let quantity = match sub.get_one::<i64>("qty") {
        Some(q) if *q < 1 => return Err(JournalError::InvalidQuantity(*q).into()),
        Some(q) => Some(*q),
        None => base.and_then(|b| b.quantity),
    };

    let tags = match text(sub, "tags") {
        Some(raw) => non_empty(Some(raw)),
        None => base.and_then(|b| b.tags.clone()),
    };
    let notes = match text(sub, "notes") {
        Some(raw) => non_empty(Some(raw)),
        None => base.and_then(|b| b.notes.clone()),
    };

    let (bos, retest) = match base {
        None => (sub.get_flag("bos"), sub.get_flag("retest")),
        Some(b) => (
            sub.get_one::<bool>("bos").copied().unwrap_or(b.bos),
            sub.get_one::<bool>("retest").copied().unwrap_or(b.retest),
        ),
    };

    let risk_to_reward = RiskReward::compute(entry_price, stop_loss, take_profit, direction)
        .value()
        .context("Risk/reward could not be calculated for these prices")?;

    Ok(NewTrade {
        date,
        instrument,
        direction,
        quantity,
        entry_price,
        exit_price,
        stop_loss,
        take_profit,
        risk_to_reward,
        outcome,
        profit_loss,
        tags,
        notes,
        bos,
        retest,
        fib_retracement,
    })
}

fn rr_label(t: &NewTrade) -> String {
    RiskReward::compute(t.entry_price, t.stop_loss, t.take_profit, t.direction).to_string()
}

fn add(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let trade = trade_from_args(sub, None)?;
    let id = store.append(&trade)?;
    println!(
        "Recorded trade #{}: {} {} on {} (R:R {}, P/L {})",
        id,
        trade.direction,
        trade.instrument,
        trade.date,
        rr_label(&trade),
        fmt_money(&trade.profit_loss)
    );
    Ok(())
}

fn edit(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("trade id is required")?;
    let Some(existing) = store.get(id)? else {
        println!("No trade with id {}", id);
        return Ok(());
    };
    let trade = trade_from_args(sub, Some(&existing.fields))?;
    if store.update(id, &trade)? {
        println!("Updated trade #{} (R:R {})", id, rr_label(&trade));
    } else {
        println!("No trade with id {}", id);
    }
    Ok(())
}

fn rm(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("trade id is required")?;
    if store.delete(id)? {
        println!("Deleted trade #{}", id);
    } else {
        println!("No trade with id {}", id);
    }
    Ok(())
}

/// Trades selected by the `list` arguments, in the requested order.
pub fn query_rows(store: &TradeStore, sub: &clap::ArgMatches) -> Result<Vec<Trade>> {
    let order = match text(sub, "order") {
        Some("inserted") => ListOrder::Inserted,
        _ => ListOrder::DateDesc,
    };
    let pattern = match text(sub, "match") {
        Some(p) => Some(
            Regex::new(p.trim()).map_err(|err| anyhow!("Invalid regex pattern '{}': {}", p, err))?,
        ),
        None => None,
    };
    let instrument = text(sub, "instrument").map(str::trim);

    let mut rows: Vec<Trade> = store
        .list_all(order)?
        .into_iter()
        .filter(|t| instrument.is_none_or(|i| t.fields.instrument.eq_ignore_ascii_case(i)))
        .filter(|t| {
            pattern.as_ref().is_none_or(|re| {
                let hay = format!(
                    "{} {}",
                    t.fields.tags.as_deref().unwrap_or(""),
                    t.fields.notes.as_deref().unwrap_or("")
                );
                re.is_match(&hay)
            })
        })
        .collect();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn opt_money(d: Option<Decimal>) -> String {
    d.map(|v| fmt_money(&v)).unwrap_or_default()
}

fn flags(t: &NewTrade) -> String {
    let mut out = Vec::new();
    if t.bos {
        out.push("BOS");
    }
    if t.retest {
        out.push("Retest");
    }
    out.join(",")
}

pub fn table_row(t: &Trade, fmt: DateFormat) -> Vec<String> {
    let f = &t.fields;
    vec![
        t.id.to_string(),
        fmt.render(&f.date),
        f.instrument.clone(),
        f.direction.to_string(),
        f.quantity.map(|q| q.to_string()).unwrap_or_default(),
        fmt_money(&f.entry_price),
        opt_money(f.exit_price),
        fmt_money(&f.stop_loss),
        fmt_money(&f.take_profit),
        format!("{:.2}", f.risk_to_reward),
        f.outcome.map(|o| o.to_string()).unwrap_or_default(),
        fmt_money(&f.profit_loss),
        flags(f),
        f.fib_retracement.map(|l| l.to_string()).unwrap_or_default(),
        f.tags.clone().unwrap_or_default(),
    ]
}

pub const TABLE_HEADERS: [&str; 15] = [
    "ID", "Date", "Instrument", "Dir", "Qty", "Entry", "Exit", "SL", "TP", "R:R", "Outcome",
    "P/L", "Flags", "Fib", "Tags",
];

fn list(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let fmt = Settings::load(store.conn())?.date_format;
        let rows = data.iter().map(|t| table_row(t, fmt)).collect();
        println!("{}", pretty_table(&TABLE_HEADERS, rows));
    }
    Ok(())
}

fn show(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("trade id is required")?;
    let Some(trade) = store.get(id)? else {
        println!("No trade with id {}", id);
        return Ok(());
    };
    if maybe_print_json(sub.get_flag("json"), false, &trade)? {
        return Ok(());
    }
    let fmt = Settings::load(store.conn())?.date_format;
    let rows = TABLE_HEADERS
        .iter()
        .zip(table_row(&trade, fmt))
        .map(|(h, v)| vec![h.to_string(), v])
        .chain(std::iter::once(vec![
            "Notes".to_string(),
            trade.fields.notes.clone().unwrap_or_default(),
        ]))
        .collect();
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}
