// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Validation failures for user-supplied trade fields and settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD or DD/MM/YYYY")]
    InvalidDate(String),
    #[error("Invalid decimal '{value}' for {field}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("Invalid direction '{0}', expected Buy or Sell")]
    InvalidDirection(String),
    #[error("Invalid outcome '{0}', expected 'TP Hit', 'SL Hit' or 'Breakeven'")]
    InvalidOutcome(String),
    #[error("Invalid quantity {0}, must be at least 1")]
    InvalidQuantity(i64),
    #[error("Invalid Fibonacci level '{0}', expected one of 23.6, 38.2, 50, 61.8, 78.6")]
    InvalidFibLevel(String),
    #[error("Invalid equity policy '{0}', expected 'last' or 'sum'")]
    InvalidEquityPolicy(String),
    #[error("Invalid date format '{0}', expected 'iso' or 'dmy'")]
    InvalidDateFormat(String),
    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),
    #[error("Invalid value '{value}' for setting {key}")]
    InvalidSetting { key: String, value: String },
    #[error("{0} is outside the decimal range")]
    Overflow(&'static str),
}
