// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::RiskReward;
use crate::utils::required;
use anyhow::Result;

/// Preview the ratio for a planned trade. Bad input prints the error label
/// rather than failing, so the prices can be corrected and re-run.
pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let rr = evaluate(m)?;
    match rr {
        RiskReward::Ratio(r) => println!("Risk/Reward: 1:{:.2}", r),
        RiskReward::NoRisk => println!("Risk/Reward: n/a (stop-loss leaves no risk)"),
        RiskReward::Invalid => println!("Risk/Reward: calculation error"),
    }
    Ok(())
}

pub fn evaluate(m: &clap::ArgMatches) -> Result<RiskReward> {
    Ok(RiskReward::from_text(
        required(m, "entry")?,
        required(m, "sl")?,
        required(m, "tp")?,
        required(m, "direction")?,
    ))
}
