//! Threshold bands mapping index values onto status labels.
//!
//! Each band set is disjoint and exhaustive over the real line: every finite index value lands in
//! exactly one band. Boundary values belong to the middle band where the published tables say so
//! (PSI at 4.5 and 6.5, LR at 0.8 and 1.2).

use std::fmt;

/// Saturation tendency used for both the Langelier and Ryznar indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaturationStatus {
    ScalingLikely,
    Stable,
    CorrosionLikely,
}

impl SaturationStatus {
    /// LSI above 0.5 scales, below -0.5 corrodes.
    pub fn from_lsi(lsi: f64) -> Self {
        if lsi > 0.5 {
            Self::ScalingLikely
        } else if lsi < -0.5 {
            Self::CorrosionLikely
        } else {
            Self::Stable
        }
    }

    /// RSI below 6.0 scales, above 7.0 corrodes.
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi < 6.0 {
            Self::ScalingLikely
        } else if rsi > 7.0 {
            Self::CorrosionLikely
        } else {
            Self::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ScalingLikely => "Scaling Likely",
            Self::Stable => "Stable",
            Self::CorrosionLikely => "Corrosion Likely",
        }
    }
}

/// Puckorius scaling index bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuckoriusStatus {
    Scaling,
    Optimal,
    Corrosive,
}

impl PuckoriusStatus {
    pub fn from_psi(psi: f64) -> Self {
        if psi < 4.5 {
            Self::Scaling
        } else if psi <= 6.5 {
            Self::Optimal
        } else {
            Self::Corrosive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Scaling => "Water has a tendency to scale",
            Self::Optimal => "Water is in optimal range with no corrosion or scaling",
            Self::Corrosive => "Water has a tendency to corrode",
        }
    }
}

/// Langelier ratio (chloride and sulphate interference) bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LangelierRatioStatus {
    Low,
    Moderate,
    High,
}

impl LangelierRatioStatus {
    pub fn from_lr(lr: f64) -> Self {
        if lr < 0.8 {
            Self::Low
        } else if lr <= 1.2 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Chlorides and sulfate probably will not interfere with natural film formation",
            Self::Moderate => {
                "Chlorides and sulfates may interfere with natural film formation. Higher than desired corrosion rates might be anticipated."
            }
            Self::High => "The tendency towards high corrosion rates of a local type should be expected as the index increases",
        }
    }
}

/// Larson-Skold index bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LarsonSkoldStatus {
    Acceptable,
    Moderate,
    CorrosionLikely,
}

impl LarsonSkoldStatus {
    pub fn from_ls(ls: f64) -> Self {
        if ls > 0.8 {
            Self::CorrosionLikely
        } else if ls < 0.2 {
            Self::Acceptable
        } else {
            Self::Moderate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Acceptable => "Acceptable",
            Self::Moderate => "Moderate",
            Self::CorrosionLikely => "Corrosion Likely",
        }
    }
}

/// Aggregate verdict over all indices (cooling) or the deduction score (boiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverallStatus {
    Stable,
    Moderate,
    Unstable,
}

impl OverallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Moderate => "Moderate",
            Self::Unstable => "Unstable",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_label!(
    SaturationStatus,
    PuckoriusStatus,
    LangelierRatioStatus,
    LarsonSkoldStatus,
    OverallStatus
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psi_bands_have_no_gap_at_boundaries() {
        assert_eq!(PuckoriusStatus::from_psi(4.499_999), PuckoriusStatus::Scaling);
        assert_eq!(PuckoriusStatus::from_psi(4.5), PuckoriusStatus::Optimal);
        assert_eq!(PuckoriusStatus::from_psi(6.5), PuckoriusStatus::Optimal);
        assert_eq!(PuckoriusStatus::from_psi(6.500_001), PuckoriusStatus::Corrosive);
    }

    #[test]
    fn psi_bands_are_exhaustive() {
        let mut psi = -5.0;
        let mut seen = std::collections::HashSet::new();
        while psi < 15.0 {
            seen.insert(PuckoriusStatus::from_psi(psi));
            psi += 0.01;
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn lr_bands_have_no_gap_at_boundaries() {
        assert_eq!(LangelierRatioStatus::from_lr(0.799_999), LangelierRatioStatus::Low);
        assert_eq!(LangelierRatioStatus::from_lr(0.8), LangelierRatioStatus::Moderate);
        assert_eq!(LangelierRatioStatus::from_lr(1.2), LangelierRatioStatus::Moderate);
        assert_eq!(LangelierRatioStatus::from_lr(1.200_001), LangelierRatioStatus::High);
        assert_eq!(LangelierRatioStatus::from_lr(0.0), LangelierRatioStatus::Low);
    }

    #[test]
    fn saturation_bands() {
        assert_eq!(SaturationStatus::from_lsi(0.5), SaturationStatus::Stable);
        assert_eq!(SaturationStatus::from_lsi(0.51), SaturationStatus::ScalingLikely);
        assert_eq!(SaturationStatus::from_lsi(-0.5), SaturationStatus::Stable);
        assert_eq!(SaturationStatus::from_lsi(-0.51), SaturationStatus::CorrosionLikely);

        assert_eq!(SaturationStatus::from_rsi(5.99), SaturationStatus::ScalingLikely);
        assert_eq!(SaturationStatus::from_rsi(6.0), SaturationStatus::Stable);
        assert_eq!(SaturationStatus::from_rsi(7.0), SaturationStatus::Stable);
        assert_eq!(SaturationStatus::from_rsi(7.01), SaturationStatus::CorrosionLikely);
    }

    #[test]
    fn larson_skold_bands() {
        assert_eq!(LarsonSkoldStatus::from_ls(0.1), LarsonSkoldStatus::Acceptable);
        assert_eq!(LarsonSkoldStatus::from_ls(0.2), LarsonSkoldStatus::Moderate);
        assert_eq!(LarsonSkoldStatus::from_ls(0.8), LarsonSkoldStatus::Moderate);
        assert_eq!(LarsonSkoldStatus::from_ls(0.81), LarsonSkoldStatus::CorrosionLikely);
    }

    #[test]
    fn labels_render_through_display() {
        assert_eq!(SaturationStatus::CorrosionLikely.to_string(), "Corrosion Likely");
        assert_eq!(OverallStatus::Moderate.to_string(), "Moderate");
    }
}
