//! Trend parameters and per-point status bands.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::{LangelierRatioStatus, PuckoriusStatus};

/// A stored analysis column that can be charted over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendParameter {
    Ph,
    Tds,
    Hardness,
    TotalAlkalinity,
    Chloride,
    Temperature,
    Lsi,
    Rsi,
    Ls,
    Psi,
    Lr,
    StabilityScore,
}

impl TrendParameter {
    pub const ALL: [TrendParameter; 12] = [
        Self::Ph,
        Self::Tds,
        Self::Hardness,
        Self::TotalAlkalinity,
        Self::Chloride,
        Self::Temperature,
        Self::Lsi,
        Self::Rsi,
        Self::Ls,
        Self::Psi,
        Self::Lr,
        Self::StabilityScore,
    ];

    /// Column name in `water_analyses`. Only ever one of a fixed set, so it is safe to splice into
    /// SQL.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Ph => "ph",
            Self::Tds => "tds",
            Self::Hardness => "hardness",
            Self::TotalAlkalinity => "total_alkalinity",
            Self::Chloride => "chloride",
            Self::Temperature => "temperature",
            Self::Lsi => "lsi",
            Self::Rsi => "rsi",
            Self::Ls => "ls",
            Self::Psi => "psi",
            Self::Lr => "lr",
            Self::StabilityScore => "stability_score",
        }
    }

    /// Status of a single trend value.
    pub fn status(&self, value: f64) -> &'static str {
        match self {
            Self::Ph => {
                if (6.5..=8.0).contains(&value) {
                    "optimal"
                } else if value < 6.5 {
                    "low"
                } else {
                    "high"
                }
            }
            Self::Lsi => {
                if (-0.5..=0.5).contains(&value) {
                    "stable"
                } else if value > 0.5 {
                    "scaling"
                } else {
                    "corrosion"
                }
            }
            Self::Rsi => {
                if (6.0..=7.0).contains(&value) {
                    "stable"
                } else if value < 6.0 {
                    "scaling"
                } else {
                    "corrosion"
                }
            }
            Self::Ls => {
                if value < 0.2 {
                    "acceptable"
                } else if value < 0.8 {
                    "moderate"
                } else {
                    "corrosion"
                }
            }
            Self::Psi => match PuckoriusStatus::from_psi(value) {
                PuckoriusStatus::Scaling => "scaling",
                PuckoriusStatus::Optimal => "optimal",
                PuckoriusStatus::Corrosive => "corrosion",
            },
            Self::Lr => match LangelierRatioStatus::from_lr(value) {
                LangelierRatioStatus::Low => "low",
                LangelierRatioStatus::Moderate => "moderate",
                LangelierRatioStatus::High => "high",
            },
            _ => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trend parameter '{0}'")]
pub struct UnknownTrendParameter(pub String);

impl FromStr for TrendParameter {
    type Err = UnknownTrendParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.column() == normalized)
            .ok_or_else(|| UnknownTrendParameter(s.to_string()))
    }
}
