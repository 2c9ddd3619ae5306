// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings::{self, KEYS, Settings};
use crate::store::TradeStore;
use crate::utils::{pretty_table, required};
use anyhow::Result;

pub fn set_message(key: &str, value: &str) -> String {
    format!("Set {} = {}", key, value)
}

pub fn handle(store: &TradeStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let current = Settings::load(store.conn())?;
            match sub.get_one::<String>("key") {
                Some(key) => println!("{}", current.get(&key.trim().replace('-', "_"))?),
                None => {
                    let mut rows = Vec::new();
                    for key in KEYS {
                        rows.push(vec![key.to_string(), current.get(key)?]);
                    }
                    println!("{}", pretty_table(&["Key", "Value"], rows));
                }
            }
        }
        Some(("set", sub)) => {
            let (key, value) =
                settings::store(store.conn(), required(sub, "key")?, required(sub, "value")?)?;
            println!("{}", set_message(&key, &value));
        }
        _ => {}
    }
    Ok(())
}
