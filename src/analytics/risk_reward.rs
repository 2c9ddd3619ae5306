// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Direction;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;

/// Result of the risk/reward calculation.
///
/// `NoRisk` covers a stop at or beyond the entry (risk <= 0). It is stored as
/// `0` so existing rows keep their meaning, but it is never shown as a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RiskReward {
    Ratio(Decimal),
    NoRisk,
    Invalid,
}

impl RiskReward {
    pub fn compute(
        entry: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        direction: Direction,
    ) -> Self {
        let legs = match direction {
            Direction::Buy => entry
                .checked_sub(stop_loss)
                .zip(take_profit.checked_sub(entry)),
            Direction::Sell => stop_loss
                .checked_sub(entry)
                .zip(entry.checked_sub(take_profit)),
        };
        let Some((risk, reward)) = legs else {
            return RiskReward::Invalid;
        };
        if risk <= Decimal::ZERO {
            return RiskReward::NoRisk;
        }
        match reward.checked_div(risk) {
            Some(r) => RiskReward::Ratio(
                r.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            ),
            None => RiskReward::Invalid,
        }
    }

    /// Compute from raw text, as typed. Anything unparsable yields `Invalid`.
    pub fn from_text(entry: &str, stop_loss: &str, take_profit: &str, direction: &str) -> Self {
        let num = |s: &str| s.trim().parse::<Decimal>().ok();
        match (
            num(entry),
            num(stop_loss),
            num(take_profit),
            direction.parse::<Direction>().ok(),
        ) {
            (Some(e), Some(sl), Some(tp), Some(d)) => Self::compute(e, sl, tp, d),
            _ => RiskReward::Invalid,
        }
    }

    /// Numeric value as persisted; `None` only for `Invalid`.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            RiskReward::Ratio(r) => Some(*r),
            RiskReward::NoRisk => Some(Decimal::ZERO),
            RiskReward::Invalid => None,
        }
    }
}

impl fmt::Display for RiskReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskReward::Ratio(r) => write!(f, "{:.2}", r),
            RiskReward::NoRisk => f.write_str("n/a"),
            RiskReward::Invalid => f.write_str("calculation error"),
        }
    }
}
