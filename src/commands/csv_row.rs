// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CSV layout shared by import and export.

use crate::analytics::RiskReward;
use crate::error::JournalError;
use crate::models::{NewTrade, Trade, instrument_name};
use crate::utils::{non_empty, parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Column order written by export, matching the fields of [`CsvTrade`].
pub const HEADERS: [&str; 17] = [
    "id",
    "date",
    "instrument",
    "direction",
    "quantity",
    "entry_price",
    "exit_price",
    "stop_loss",
    "take_profit",
    "risk_to_reward",
    "outcome",
    "profit_loss",
    "tags",
    "notes",
    "bos",
    "retest",
    "fib_retracement",
];

/// One trade as a CSV record. Every column is text so a bad cell can be
/// reported with its field name. Older journals used `symbol`, `qty`, `price`
/// and `pnl`; those headers are read as well.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CsvTrade {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(alias = "symbol")]
    pub instrument: String,
    pub direction: String,
    #[serde(default, alias = "qty")]
    pub quantity: String,
    #[serde(alias = "price")]
    pub entry_price: String,
    #[serde(default)]
    pub exit_price: String,
    #[serde(default)]
    pub stop_loss: String,
    #[serde(default)]
    pub take_profit: String,
    #[serde(default)]
    pub risk_to_reward: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(alias = "pnl")]
    pub profit_loss: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub bos: String,
    #[serde(default)]
    pub retest: String,
    #[serde(default)]
    pub fib_retracement: String,
}

impl From<&Trade> for CsvTrade {
    fn from(t: &Trade) -> Self {
        let f = &t.fields;
        CsvTrade {
            id: t.id.to_string(),
            date: f.date.clone(),
            instrument: f.instrument.clone(),
            direction: f.direction.to_string(),
            quantity: f.quantity.map(|q| q.to_string()).unwrap_or_default(),
            entry_price: f.entry_price.to_string(),
            exit_price: f.exit_price.map(|d| d.to_string()).unwrap_or_default(),
            stop_loss: f.stop_loss.to_string(),
            take_profit: f.take_profit.to_string(),
            risk_to_reward: f.risk_to_reward.to_string(),
            outcome: f.outcome.map(|o| o.to_string()).unwrap_or_default(),
            profit_loss: f.profit_loss.to_string(),
            tags: f.tags.clone().unwrap_or_default(),
            notes: f.notes.clone().unwrap_or_default(),
            bos: f.bos.to_string(),
            retest: f.retest.to_string(),
            fib_retracement: f
                .fib_retracement
                .map(|l| l.to_string())
                .unwrap_or_default(),
        }
    }
}

fn flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" => Ok(false),
        "true" | "1" | "yes" | "y" => Ok(true),
        other => Err(anyhow!("Invalid {} flag '{}'", name, other)),
    }
}

fn opt<T>(
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, JournalError>,
) -> Result<Option<T>, JournalError> {
    match raw.trim() {
        "" => Ok(None),
        s => parse(s).map(Some),
    }
}

impl CsvTrade {
    /// Validate into a record. The stored ratio column is ignored and
    /// recomputed; a missing stop or target falls back to the entry price.
    pub fn into_new_trade(self) -> Result<NewTrade> {
        let date = parse_date(&self.date)?.to_string();
        let instrument = instrument_name(&self.instrument);
        if instrument.is_empty() {
            return Err(anyhow!("instrument missing"));
        }
        let direction = self.direction.parse()?;
        let entry_price = parse_decimal("entry", &self.entry_price)?;
        let stop_loss = opt(&self.stop_loss, |s| parse_decimal("stop-loss", s))?
            .unwrap_or(entry_price);
        let take_profit = opt(&self.take_profit, |s| parse_decimal("take-profit", s))?
            .unwrap_or(entry_price);
        let quantity = match self.quantity.trim() {
            "" => None,
            s => {
                let q: i64 = s
                    .parse()
                    .with_context(|| format!("Invalid quantity '{}'", s))?;
                if q < 1 {
                    return Err(JournalError::InvalidQuantity(q).into());
                }
                Some(q)
            }
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
            exit_price: opt(&self.exit_price, |s| parse_decimal("exit", s))?,
            stop_loss,
            take_profit,
            risk_to_reward,
            outcome: opt(&self.outcome, |s| s.parse())?,
            profit_loss: parse_decimal("profit/loss", &self.profit_loss)?,
            tags: non_empty(Some(&self.tags)),
            notes: non_empty(Some(&self.notes)),
            bos: flag("bos", &self.bos)?,
            retest: flag("retest", &self.retest)?,
            fib_retracement: opt(&self.fib_retracement, |s| s.parse())?,
        })
    }
}
