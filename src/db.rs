// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tradelog", "tradelog"));

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tradelog.sqlite"))
}

/// Resolve the database location: an explicit path wins over the platform default.
pub fn db_path(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(p) => {
            let path = PathBuf::from(p);
            if let Some(parent) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            Ok(path)
        }
        None => default_db_path(),
    }
}

pub fn open(path: &Path) -> Result<Connection> {
    debug!(path = %path.display(), "opening journal database");
    Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))
}

/// Create every table the journal needs. Safe to run on each startup.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS trades(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        instrument TEXT NOT NULL,
        direction TEXT NOT NULL CHECK(direction IN ('Buy','Sell')),
        quantity INTEGER CHECK(quantity IS NULL OR quantity >= 1),
        entry_price TEXT NOT NULL,
        exit_price TEXT,
        stop_loss TEXT NOT NULL,
        take_profit TEXT NOT NULL,
        risk_to_reward TEXT NOT NULL, -- derived when written
        outcome TEXT,
        profit_loss TEXT NOT NULL,
        tags TEXT,
        notes TEXT,
        bos INTEGER NOT NULL DEFAULT 0,
        retest INTEGER NOT NULL DEFAULT 0,
        fib_retracement TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_trades_date ON trades(date);
    "#,
    )
    .context("Failed to create journal schema")?;
    Ok(())
}
