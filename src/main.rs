// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use tradelog::{cli, commands, db, logging, store::TradeStore};

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    logging::init(matches.get_count("verbose"));

    if !cli::uses_journal(&matches) {
        if let Some(("rr", sub)) = matches.subcommand() {
            commands::rr::handle(sub)?;
        }
        return Ok(());
    }

    let path = db::db_path(matches.get_one::<String>("db").map(|s| s.as_str()))?;
    let mut store = TradeStore::open(&path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("trade", sub)) => commands::trades::handle(&store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("config", sub)) => commands::config::handle(&store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
