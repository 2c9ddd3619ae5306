// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::csv_row::CsvTrade;
use crate::store::TradeStore;
use crate::utils::required;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use tracing::debug;

pub fn handle(store: &mut TradeStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("trades", sub)) => import_trades(store, sub),
        _ => Ok(()),
    }
}

fn import_trades(store: &mut TradeStore, sub: &clap::ArgMatches) -> Result<()> {
    let path = required(sub, "path")?.trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let mut trades = Vec::new();
    for (n, result) in rdr.deserialize::<CsvTrade>().enumerate() {
        // header is line 1
        let line = n + 2;
        let rec = result.with_context(|| format!("Line {}: unreadable record", line))?;
        let trade = rec
            .into_new_trade()
            .with_context(|| format!("Line {}", line))?;
        debug!(line, instrument = %trade.instrument, "parsed trade");
        trades.push(trade);
    }

    let ids = store.append_all(&trades)?;
    println!("Imported {} trade(s) from {}", ids.len(), path);
    Ok(())
}
