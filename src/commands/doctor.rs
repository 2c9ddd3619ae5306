// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::RiskReward;
use crate::models::{Direction, Outcome, Trade};
use crate::store::{ListOrder, TradeStore};
use crate::utils::{parse_date, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub id: i64,
    pub kind: &'static str,
    pub detail: String,
}

/// Rows whose stored fields disagree with each other. Nothing is enforced at
/// write time, so these are reported rather than rejected.
pub fn find_issues(trades: &[Trade]) -> Vec<Issue> {
    let mut issues = Vec::new();
    for t in trades {
        let f = &t.fields;
        let mut push = |kind: &'static str, detail: String| {
            issues.push(Issue {
                id: t.id,
                kind,
                detail,
            })
        };

        if parse_date(&f.date).is_err() {
            push("unreadable_date", f.date.clone());
        }

        let expected = RiskReward::compute(f.entry_price, f.stop_loss, f.take_profit, f.direction);
        if expected.value() != Some(f.risk_to_reward) {
            push(
                "stale_risk_reward",
                format!("stored {} vs prices {}", f.risk_to_reward, expected),
            );
        }

        match f.outcome {
            Some(Outcome::TpHit) if f.profit_loss < Decimal::ZERO => push(
                "outcome_pnl_mismatch",
                format!("TP Hit with P/L {}", f.profit_loss),
            ),
            Some(Outcome::SlHit) if f.profit_loss > Decimal::ZERO => push(
                "outcome_pnl_mismatch",
                format!("SL Hit with P/L {}", f.profit_loss),
            ),
            _ => {}
        }

        if let Some(exit) = f.exit_price {
            let move_in_favour = match f.direction {
                Direction::Buy => exit.checked_sub(f.entry_price),
                Direction::Sell => f.entry_price.checked_sub(exit),
            };
            let Some(move_in_favour) = move_in_favour else {
                push(
                    "price_out_of_range",
                    format!("entry {} and exit {} are too far apart", f.entry_price, exit),
                );
                continue;
            };
            let opposite = (move_in_favour > Decimal::ZERO && f.profit_loss < Decimal::ZERO)
                || (move_in_favour < Decimal::ZERO && f.profit_loss > Decimal::ZERO);
            if opposite {
                push(
                    "exit_pnl_mismatch",
                    format!(
                        "{} {} -> {} with P/L {}",
                        f.direction, f.entry_price, exit, f.profit_loss
                    ),
                );
            }
        }
    }
    issues
}

pub fn handle(store: &TradeStore) -> Result<()> {
    let trades = store.list_all(ListOrder::Inserted)?;
    let issues = find_issues(&trades);
    if issues.is_empty() {
        println!("✅ doctor: no issues found in {} trade(s)", trades.len());
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.id.to_string(), i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Trade", "Issue", "Detail"], rows));
    }
    Ok(())
}
