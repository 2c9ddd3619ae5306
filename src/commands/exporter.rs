// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::csv_row::{CsvTrade, HEADERS};
use crate::store::{ListOrder, TradeStore};
use crate::utils::required;
use anyhow::{Result, bail};

pub fn handle(store: &TradeStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("trades", sub)) => export_trades(store, sub),
        _ => Ok(()),
    }
}

fn export_trades(store: &TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    if !matches!(fmt.as_str(), "csv" | "json") {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let trades = store.list_all(ListOrder::Inserted)?;
    match fmt.as_str() {
        "csv" => {
            // header row even when there are no trades
            let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(out)?;
            wtr.write_record(HEADERS)?;
            for t in &trades {
                wtr.serialize(CsvTrade::from(t))?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&trades)?)?;
        }
    }
    println!("Exported {} trade(s) to {}", trades.len(), out);
    Ok(())
}
