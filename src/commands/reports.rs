// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{EquityCurve, EquityPolicy, Summary, Trend, equity, stats};
use crate::settings::Settings;
use crate::store::{ListOrder, TradeStore};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::path::Path;

const BAR_WIDTH: f64 = 24.0;

pub fn handle(store: &TradeStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(store, sub)?,
        Some(("equity", sub)) => equity_report(store, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct InstrumentSummary {
    pub instrument: String,
    #[serde(flatten)]
    pub summary: Summary,
}

fn opt_or_zero(d: Option<Decimal>) -> String {
    fmt_money(&d.unwrap_or(Decimal::ZERO))
}

fn profit_factor_label(s: &Summary) -> String {
    s.profit_factor
        .map(|pf| format!("{:.2}", pf))
        .unwrap_or_else(|| "n/a".into())
}

fn summary(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let trades = store.list_all(ListOrder::Inserted)?;

    if sub.get_flag("by-instrument") {
        let data: Vec<InstrumentSummary> = stats::summarize_by_instrument(&trades)?
            .into_iter()
            .map(|(instrument, summary)| InstrumentSummary {
                instrument,
                summary,
            })
            .collect();
        if !maybe_print_json(json_flag, jsonl_flag, &data)? {
            let rows = data
                .iter()
                .map(|g| {
                    vec![
                        g.instrument.clone(),
                        g.summary.total_trades.to_string(),
                        format!("{:.2}", g.summary.win_rate_pct),
                        opt_or_zero(g.summary.average_win),
                        opt_or_zero(g.summary.average_loss),
                        profit_factor_label(&g.summary),
                        fmt_money(&g.summary.net_profit),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Instrument", "Trades", "Win %", "Avg Win", "Avg Loss", "PF", "Net"],
                    rows
                )
            );
        }
        return Ok(());
    }

    let s = stats::summarize(&trades)?;
    if !maybe_print_json(json_flag, jsonl_flag, &s)? {
        let mut rows = vec![
            vec!["Total trades".into(), s.total_trades.to_string()],
            vec!["Winning trades".into(), s.winning_trades.to_string()],
            vec!["Losing trades".into(), s.losing_trades.to_string()],
            vec!["Win rate %".into(), format!("{:.2}", s.win_rate_pct)],
            vec!["Average win".into(), opt_or_zero(s.average_win)],
            vec!["Average loss".into(), opt_or_zero(s.average_loss)],
            vec!["Profit factor".into(), profit_factor_label(&s)],
            vec!["Net profit".into(), fmt_money(&s.net_profit)],
        ];
        for (outcome, count) in &s.outcomes {
            rows.push(vec![format!("Outcome: {}", outcome), count.to_string()]);
        }
        println!("{}", pretty_table(&["Metric", "Value"], rows));
    }
    Ok(())
}

/// Curve for the `equity` arguments. Flags override stored preferences.
pub fn equity_curve(store: &TradeStore, sub: &clap::ArgMatches) -> Result<EquityCurve> {
    let settings = Settings::load(store.conn())?;
    let policy = match sub.get_one::<String>("policy") {
        Some(p) => p.parse::<EquityPolicy>()?,
        None => settings.equity_policy,
    };
    let smooth = if sub.get_flag("raw") {
        false
    } else {
        sub.get_flag("smooth") || settings.smooth
    };
    let trades = store.list_all(ListOrder::Inserted)?;
    Ok(equity::from_trades(&trades, policy, smooth)?)
}

pub fn write_csv(curve: &EquityCurve, path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Create {}", path.display()))?;
    wtr.write_record(["date", "equity", "smoothed", "trend"])?;
    for p in &curve.points {
        wtr.write_record([
            p.date.to_string(),
            p.equity.to_string(),
            p.smoothed.round_dp(4).normalize().to_string(),
            match p.trend {
                Some(Trend::Up) => "up".to_string(),
                Some(Trend::Down) => "down".to_string(),
                None => String::new(),
            },
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn bar(value: Decimal, max_abs: Decimal, up: bool) -> String {
    let scale = if max_abs.is_zero() {
        0.0
    } else {
        (value.abs() / max_abs).to_f64().unwrap_or(0.0)
    };
    let cells = (scale * BAR_WIDTH).round() as usize;
    let body = "█".repeat(cells.max(1));
    if up {
        body.if_supports_color(Stream::Stdout, |t| t.green()).to_string()
    } else {
        body.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
    }
}

fn equity_report(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let curve = equity_curve(store, sub)?;

    if let Some(out) = sub.get_one::<String>("csv") {
        write_csv(&curve, Path::new(out))?;
        println!("Wrote equity curve to {}", out);
    }
    if maybe_print_json(json_flag, jsonl_flag, &curve)? {
        return Ok(());
    }
    if curve.points.is_empty() {
        println!("No trades yet. Add a trade to begin!");
        return Ok(());
    }

    let fmt = Settings::load(store.conn())?.date_format;
    let max_abs = curve
        .points
        .iter()
        .map(|p| p.smoothed.abs())
        .max()
        .unwrap_or(Decimal::ZERO);
    let rows = curve
        .points
        .iter()
        .map(|p| {
            // the last point colours by its own sign
            let up = match p.trend {
                Some(t) => t == Trend::Up,
                None => p.smoothed >= Decimal::ZERO,
            };
            let mut row = vec![fmt.render(&p.date.to_string()), fmt_money(&p.equity)];
            if curve.smoothed {
                row.push(fmt_money(&p.smoothed));
            }
            row.push(bar(p.smoothed, max_abs, up));
            row
        })
        .collect();
    let headers: &[&str] = if curve.smoothed {
        &["Date", "Equity", "Smoothed", "Curve"]
    } else {
        &["Date", "Equity", "Curve"]
    };
    println!("{}", pretty_table(headers, rows));
    println!("Aggregation: {} per day", curve.policy);
    if curve.dropped > 0 {
        println!("Skipped {} trade(s) with unreadable dates", curve.dropped);
    }
    Ok(())
}
