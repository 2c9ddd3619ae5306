// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::EquityPolicy;
use crate::error::JournalError;
use crate::utils::{get_setting, parse_date, set_setting};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::str::FromStr;

pub const KEYS: [&str; 3] = ["equity_policy", "date_format", "smooth"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    Iso,
    /// dd/mm/yyyy
    #[default]
    Dmy,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormat::Iso => "iso",
            DateFormat::Dmy => "dmy",
        }
    }

    /// Render a stored date. Text that is not a date is shown as stored.
    pub fn render(&self, stored: &str) -> String {
        match (self, parse_date(stored)) {
            (DateFormat::Iso, Ok(d)) => d.format("%Y-%m-%d").to_string(),
            (DateFormat::Dmy, Ok(d)) => d.format("%d/%m/%Y").to_string(),
            (_, Err(_)) => stored.to_string(),
        }
    }
}

impl FromStr for DateFormat {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso" => Ok(DateFormat::Iso),
            "dmy" => Ok(DateFormat::Dmy),
            _ => Err(JournalError::InvalidDateFormat(s.to_string())),
        }
    }
}

fn parse_switch(key: &str, value: &str) -> Result<bool, JournalError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(JournalError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn switch_text(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

/// Preferences kept in the `settings` table. Command-line flags override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Settings {
    pub equity_policy: EquityPolicy,
    pub date_format: DateFormat,
    pub smooth: bool,
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(v) = get_setting(conn, "equity_policy")? {
            s.equity_policy = v.parse()?;
        }
        if let Some(v) = get_setting(conn, "date_format")? {
            s.date_format = v.parse()?;
        }
        if let Some(v) = get_setting(conn, "smooth")? {
            s.smooth = parse_switch("smooth", &v)?;
        }
        Ok(s)
    }

    pub fn get(&self, key: &str) -> Result<String, JournalError> {
        match key {
            "equity_policy" => Ok(self.equity_policy.to_string()),
            "date_format" => Ok(self.date_format.as_str().to_string()),
            "smooth" => Ok(switch_text(self.smooth).to_string()),
            _ => Err(JournalError::UnknownSetting(key.to_string())),
        }
    }
}

/// Validate and persist one preference. Keys accept `-` in place of `_`.
/// Returns the key and value as written.
pub fn store(conn: &Connection, key: &str, value: &str) -> Result<(String, String)> {
    let key = key.trim().replace('-', "_");
    let canonical = match key.as_str() {
        "equity_policy" => value.parse::<EquityPolicy>()?.to_string(),
        "date_format" => value.parse::<DateFormat>()?.as_str().to_string(),
        "smooth" => switch_text(parse_switch("smooth", value)?).to_string(),
        _ => return Err(JournalError::UnknownSetting(key).into()),
    };
    set_setting(conn, &key, &canonical)?;
    Ok((key, canonical))
}
