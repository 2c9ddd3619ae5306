// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cumulative profit/loss per calendar day.

use crate::error::JournalError;
use crate::models::Trade;
use crate::utils::parse_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const SMOOTHING_WINDOW: usize = 3;

/// How trades falling on the same day become one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EquityPolicy {
    /// Running total per trade, then the last value seen on each day.
    LastPerDay,
    /// Daily sum first, then the running total across days.
    #[default]
    SumPerDay,
}

impl FromStr for EquityPolicy {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" | "last-per-day" => Ok(EquityPolicy::LastPerDay),
            "sum" | "sum-per-day" => Ok(EquityPolicy::SumPerDay),
            _ => Err(JournalError::InvalidEquityPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for EquityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EquityPolicy::LastPerDay => "last",
            EquityPolicy::SumPerDay => "sum",
        })
    }
}

/// Colour class of the segment leaving a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: Decimal,
    pub smoothed: Decimal,
    /// `None` for the final point, which starts no segment.
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityCurve {
    pub policy: EquityPolicy,
    pub smoothed: bool,
    /// Rows skipped because their date could not be read.
    pub dropped: usize,
    pub points: Vec<EquityPoint>,
}

/// Cumulative equity per day from `(date, profit_loss)` rows in any order.
/// Returns the series and the number of rows dropped for unreadable dates.
pub fn daily_equity<'a, I>(
    rows: I,
    policy: EquityPolicy,
) -> Result<(Vec<(NaiveDate, Decimal)>, usize), JournalError>
where
    I: IntoIterator<Item = (&'a str, Decimal)>,
{
    let mut dated = Vec::new();
    let mut dropped = 0usize;
    for (raw, pnl) in rows {
        match parse_date(raw) {
            Ok(d) => dated.push((d, pnl)),
            Err(_) => {
                warn!(date = raw, "skipping trade with unreadable date");
                dropped += 1;
            }
        }
    }
    // stable: same-day trades keep their stored order
    dated.sort_by_key(|(d, _)| *d);

    let series = match policy {
        EquityPolicy::LastPerDay => {
            let mut running = Decimal::ZERO;
            let mut out: Vec<(NaiveDate, Decimal)> = Vec::new();
            for (d, pnl) in dated {
                running = add(running, pnl)?;
                match out.last_mut() {
                    Some((last, value)) if *last == d => *value = running,
                    _ => out.push((d, running)),
                }
            }
            out
        }
        EquityPolicy::SumPerDay => {
            let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
            for (d, pnl) in dated {
                let day = per_day.entry(d).or_insert(Decimal::ZERO);
                *day = add(*day, pnl)?;
            }
            let mut running = Decimal::ZERO;
            per_day
                .into_iter()
                .map(|(d, total)| {
                    running = add(running, total)?;
                    Ok((d, running))
                })
                .collect::<Result<Vec<_>, JournalError>>()?
        }
    };
    Ok((series, dropped))
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal, JournalError> {
    a.checked_add(b).ok_or(JournalError::Overflow("equity"))
}

/// Centered moving average with the output the same length as the input.
/// Neighbours outside the series count as zero, so the edges are pulled
/// toward zero. Series shorter than `window` are returned unchanged.
pub fn moving_average(values: &[Decimal], window: usize) -> Result<Vec<Decimal>, JournalError> {
    if window <= 1 || values.len() < window {
        return Ok(values.to_vec());
    }
    let left = window / 2;
    let right = window - 1 - left;
    let width = Decimal::from(window);
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(values.len() - 1);
            let sum = values[lo..=hi]
                .iter()
                .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
                .ok_or(JournalError::Overflow("smoothed equity"))?;
            Ok(sum / width)
        })
        .collect()
}

/// Trend of each segment, classified by the value it starts from.
pub fn trends(values: &[Decimal]) -> Vec<Trend> {
    values
        .windows(2)
        .map(|pair| {
            if pair[0] >= Decimal::ZERO {
                Trend::Up
            } else {
                Trend::Down
            }
        })
        .collect()
}

pub fn build<'a, I>(
    rows: I,
    policy: EquityPolicy,
    smooth: bool,
) -> Result<EquityCurve, JournalError>
where
    I: IntoIterator<Item = (&'a str, Decimal)>,
{
    let (series, dropped) = daily_equity(rows, policy)?;
    let equity: Vec<Decimal> = series.iter().map(|(_, v)| *v).collect();
    let smoothed_applied = smooth && equity.len() >= SMOOTHING_WINDOW;
    let line = if smoothed_applied {
        moving_average(&equity, SMOOTHING_WINDOW)?
    } else {
        equity.clone()
    };
    let segs = trends(&line);

    let points = series
        .into_iter()
        .zip(line)
        .enumerate()
        .map(|(i, ((date, equity), smoothed))| EquityPoint {
            date,
            equity,
            smoothed,
            trend: segs.get(i).copied(),
        })
        .collect();

    Ok(EquityCurve {
        policy,
        smoothed: smoothed_applied,
        dropped,
        points,
    })
}

pub fn from_trades(
    trades: &[Trade],
    policy: EquityPolicy,
    smooth: bool,
) -> Result<EquityCurve, JournalError> {
    build(
        trades
            .iter()
            .map(|t| (t.fields.date.as_str(), t.fields.profit_loss)),
        policy,
        smooth,
    )
}
