// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::JournalError;
use crate::models::{Outcome, Trade};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: Decimal,
    pub average_win: Option<Decimal>,
    pub average_loss: Option<Decimal>,
    /// `None` when there are no losing trades.
    pub profit_factor: Option<Decimal>,
    pub net_profit: Decimal,
    pub outcomes: BTreeMap<String, usize>,
}

fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn mean(sum: Decimal, count: usize) -> Option<Decimal> {
    if count == 0 {
        None
    } else {
        Some(sum / Decimal::from(count))
    }
}

/// Win/loss statistics over `trades`. A trade with zero P&L counts toward the
/// total but is neither a win nor a loss. Fails when the gross totals leave
/// the `Decimal` range.
pub fn summarize<'a, I>(trades: I) -> Result<Summary, JournalError>
where
    I: IntoIterator<Item = &'a Trade>,
{
    let mut total = 0usize;
    let (mut wins, mut losses) = (0usize, 0usize);
    let (mut gross_win, mut gross_loss) = (Decimal::ZERO, Decimal::ZERO);
    let mut outcomes: BTreeMap<String, usize> = BTreeMap::new();

    for t in trades {
        total += 1;
        let pnl = t.fields.profit_loss;
        if pnl > Decimal::ZERO {
            wins += 1;
            gross_win = gross_win
                .checked_add(pnl)
                .ok_or(JournalError::Overflow("gross profit"))?;
        } else if pnl < Decimal::ZERO {
            losses += 1;
            gross_loss = gross_loss
                .checked_add(pnl)
                .ok_or(JournalError::Overflow("gross loss"))?;
        }
        let label = t
            .fields
            .outcome
            .map(|o| o.as_str())
            .unwrap_or("Unspecified");
        *outcomes.entry(label.to_string()).or_insert(0) += 1;
    }
    for o in Outcome::ALL {
        outcomes.entry(o.as_str().to_string()).or_insert(0);
    }

    let win_rate_pct = if total == 0 {
        Decimal::ZERO
    } else {
        round2(Decimal::from(wins) * Decimal::ONE_HUNDRED / Decimal::from(total))
    };
    let profit_factor = if losses == 0 {
        None
    } else {
        gross_win.checked_div(gross_loss.abs()).map(round2)
    };

    Ok(Summary {
        total_trades: total,
        winning_trades: wins,
        losing_trades: losses,
        win_rate_pct,
        average_win: mean(gross_win, wins),
        average_loss: mean(gross_loss, losses),
        profit_factor,
        net_profit: gross_win + gross_loss,
        outcomes,
    })
}

/// One summary per instrument, ordered by instrument name.
pub fn summarize_by_instrument(trades: &[Trade]) -> Result<Vec<(String, Summary)>, JournalError> {
    let mut groups: BTreeMap<&str, Vec<&Trade>> = BTreeMap::new();
    for t in trades {
        groups.entry(t.fields.instrument.as_str()).or_default().push(t);
    }
    groups
        .into_iter()
        .map(|(name, group)| Ok((name.to_string(), summarize(group)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, NewTrade};
    use rust_decimal_macros::dec;

    fn trade(id: i64, instrument: &str, pnl: Decimal) -> Trade {
        Trade {
            id,
            fields: NewTrade {
                date: format!("2025-01-{:02}", id),
                instrument: instrument.into(),
                direction: Direction::Buy,
                quantity: None,
                entry_price: dec!(100),
                exit_price: None,
                stop_loss: dec!(95),
                take_profit: dec!(110),
                risk_to_reward: dec!(2),
                outcome: None,
                profit_loss: pnl,
                tags: None,
                notes: None,
                bos: false,
                retest: false,
                fib_retracement: None,
            },
        }
    }

    #[test]
    fn mixed_book() {
        let trades = vec![
            trade(1, "Nifty", dec!(100)),
            trade(2, "Nifty", dec!(-50)),
            trade(3, "Nifty", dec!(200)),
            trade(4, "Nifty", dec!(-25)),
        ];
        let s = summarize(&trades).unwrap();
        assert_eq!(s.total_trades, 4);
        assert_eq!(s.win_rate_pct, dec!(50.0));
        assert_eq!(s.average_win, Some(dec!(150.0)));
        assert_eq!(s.average_loss, Some(dec!(-37.5)));
        assert_eq!(s.profit_factor, Some(dec!(4.0)));
        assert_eq!(s.net_profit, dec!(225));
    }

    #[test]
    fn empty_book_has_zero_rate() {
        let s = summarize(&Vec::<Trade>::new()).unwrap();
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.win_rate_pct, Decimal::ZERO);
        assert_eq!(s.average_win, None);
        assert_eq!(s.average_loss, None);
        assert_eq!(s.profit_factor, None);
    }

    #[test]
    fn no_losers_means_no_profit_factor() {
        let trades = vec![trade(1, "Equity", dec!(10)), trade(2, "Equity", dec!(0))];
        let s = summarize(&trades).unwrap();
        assert_eq!(s.winning_trades, 1);
        assert_eq!(s.losing_trades, 0);
        assert_eq!(s.win_rate_pct, dec!(50));
        assert_eq!(s.profit_factor, None);
    }

    #[test]
    fn win_rate_rounds() {
        let trades = vec![
            trade(1, "Nifty", dec!(1)),
            trade(2, "Nifty", dec!(-1)),
            trade(3, "Nifty", dec!(-1)),
        ];
        assert_eq!(summarize(&trades).unwrap().win_rate_pct, dec!(33.33));
    }

    #[test]
    fn grouped_by_instrument() {
        let trades = vec![
            trade(1, "Nifty", dec!(10)),
            trade(2, "Bank Nifty", dec!(-5)),
            trade(3, "Nifty", dec!(-10)),
        ];
        let groups = summarize_by_instrument(&trades).unwrap();
        let names: Vec<&str> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Bank Nifty", "Nifty"]);
        assert_eq!(groups[1].1.total_trades, 2);
        assert_eq!(groups[1].1.profit_factor, Some(dec!(1)));
    }

    #[test]
    fn totals_past_the_decimal_range_are_an_error() {
        let trades = vec![trade(1, "Nifty", Decimal::MAX), trade(2, "Nifty", Decimal::MAX)];
        assert_eq!(
            summarize(&trades),
            Err(JournalError::Overflow("gross profit"))
        );
        let losers = vec![trade(1, "Nifty", Decimal::MIN), trade(2, "Nifty", Decimal::MIN)];
        assert_eq!(summarize(&losers), Err(JournalError::Overflow("gross loss")));
    }
}
