// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::JournalError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruments offered as suggestions; any free text is accepted.
pub const KNOWN_INSTRUMENTS: [&str; 3] = ["Nifty", "Bank Nifty", "Equity"];

/// Trimmed instrument name, with the casing of a known instrument when it
/// matches one.
pub fn instrument_name(raw: &str) -> String {
    let s = raw.trim();
    KNOWN_INSTRUMENTS
        .iter()
        .find(|k| k.eq_ignore_ascii_case(s))
        .map_or_else(|| s.to_string(), |k| k.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "Buy",
            Direction::Sell => "Sell",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" => Ok(Direction::Buy),
            "sell" | "short" => Ok(Direction::Sell),
            _ => Err(JournalError::InvalidDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "TP Hit")]
    TpHit,
    #[serde(rename = "SL Hit")]
    SlHit,
    Breakeven,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::TpHit, Outcome::SlHit, Outcome::Breakeven];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::TpHit => "TP Hit",
            Outcome::SlHit => "SL Hit",
            Outcome::Breakeven => "Breakeven",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "tphit" | "tp" => Ok(Outcome::TpHit),
            "slhit" | "sl" => Ok(Outcome::SlHit),
            "breakeven" | "be" => Ok(Outcome::Breakeven),
            _ => Err(JournalError::InvalidOutcome(s.to_string())),
        }
    }
}

/// Fibonacci retracement bucket a trade was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FibLevel {
    #[serde(rename = "23.6")]
    L236,
    #[serde(rename = "38.2")]
    L382,
    #[serde(rename = "50")]
    L500,
    #[serde(rename = "61.8")]
    L618,
    #[serde(rename = "78.6")]
    L786,
}

impl FibLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FibLevel::L236 => "23.6",
            FibLevel::L382 => "38.2",
            FibLevel::L500 => "50",
            FibLevel::L618 => "61.8",
            FibLevel::L786 => "78.6",
        }
    }
}

impl fmt::Display for FibLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FibLevel {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        match trimmed {
            "23.6" | "0.236" => Ok(FibLevel::L236),
            "38.2" | "0.382" => Ok(FibLevel::L382),
            "50" | "50.0" | "0.5" => Ok(FibLevel::L500),
            "61.8" | "0.618" => Ok(FibLevel::L618),
            "78.6" | "0.786" => Ok(FibLevel::L786),
            _ => Err(JournalError::InvalidFibLevel(s.to_string())),
        }
    }
}

macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: JournalError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_column!(Direction);
text_column!(Outcome);
text_column!(FibLevel);

/// A journal entry as it is written: everything except the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrade {
    pub date: String,
    pub instrument: String,
    pub direction: Direction,
    pub quantity: Option<i64>,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub risk_to_reward: Decimal,
    pub outcome: Option<Outcome>,
    pub profit_loss: Decimal,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub bos: bool,
    pub retest: bool,
    pub fib_retracement: Option<FibLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    #[serde(flatten)]
    pub fields: NewTrade,
}

impl Trade {
    pub fn into_fields(self) -> NewTrade {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_instruments_get_canonical_casing() {
        assert_eq!(instrument_name(" bank nifty "), "Bank Nifty");
        assert_eq!(instrument_name("AAPL"), "AAPL");
        assert_eq!(instrument_name("  "), "");
    }

    #[test]
    fn outcome_accepts_display_and_short_forms() {
        assert_eq!("TP Hit".parse::<Outcome>().unwrap(), Outcome::TpHit);
        assert_eq!("sl_hit".parse::<Outcome>().unwrap(), Outcome::SlHit);
        assert_eq!("BE".parse::<Outcome>().unwrap(), Outcome::Breakeven);
        assert!("stopped".parse::<Outcome>().is_err());
    }

    #[test]
    fn fib_level_accepts_ratio_and_percent() {
        assert_eq!("0.618".parse::<FibLevel>().unwrap(), FibLevel::L618);
        assert_eq!("61.8%".parse::<FibLevel>().unwrap(), FibLevel::L618);
        assert_eq!(FibLevel::L500.to_string(), "50");
        assert!("100".parse::<FibLevel>().is_err());
    }

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!("SELL".parse::<Direction>().unwrap(), Direction::Sell);
        assert_eq!(" buy ".parse::<Direction>().unwrap(), Direction::Buy);
        assert_eq!(
            "hold".parse::<Direction>().unwrap_err(),
            JournalError::InvalidDirection("hold".into())
        );
    }
}
