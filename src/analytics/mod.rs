// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure calculations over journal rows. Nothing here touches the database.

pub mod equity;
pub mod risk_reward;
pub mod stats;

pub use equity::{EquityCurve, EquityPoint, EquityPolicy, Trend};
pub use risk_reward::RiskReward;
pub use stats::Summary;
