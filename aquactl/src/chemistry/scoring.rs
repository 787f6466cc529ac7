//! Aggregate stability score and overall status.
//!
//! Cooling water is scored from the index bands: the score starts at 50 and every index adds or
//! removes points depending on its band. Boiler water has no saturation indices; its score starts at
//! 100 and loses points for each parameter outside the control range.

use super::status::{LangelierRatioStatus, OverallStatus, PuckoriusStatus, SaturationStatus};

const COOLING_BASE_SCORE: f64 = 50.0;
const BOILER_BASE_SCORE: f64 = 100.0;

/// Band of every index contributing to the cooling-water aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoolingBands {
    pub lsi: SaturationStatus,
    pub rsi: SaturationStatus,
    pub psi: PuckoriusStatus,
    pub lr: LangelierRatioStatus,
}

impl CoolingBands {
    /// Score in [0, 100].
    pub fn stability_score(&self) -> f64 {
        let saturation = |status: SaturationStatus| match status {
            SaturationStatus::Stable => 20.0,
            SaturationStatus::ScalingLikely => -10.0,
            SaturationStatus::CorrosionLikely => -20.0,
        };
        let psi = match self.psi {
            PuckoriusStatus::Optimal => 12.0,
            PuckoriusStatus::Scaling => -6.0,
            PuckoriusStatus::Corrosive => -12.0,
        };
        let lr = match self.lr {
            LangelierRatioStatus::Low => 10.0,
            LangelierRatioStatus::Moderate => 5.0,
            LangelierRatioStatus::High => -10.0,
        };

        clamp_score(COOLING_BASE_SCORE + saturation(self.lsi) + saturation(self.rsi) + psi + lr)
    }

    /// Number of indices sitting in their favourable band.
    pub fn favourable_count(&self) -> usize {
        [
            self.lsi == SaturationStatus::Stable,
            self.rsi == SaturationStatus::Stable,
            self.psi == PuckoriusStatus::Optimal,
            self.lr == LangelierRatioStatus::Low,
        ]
        .into_iter()
        .filter(|favourable| *favourable)
        .count()
    }

    pub fn overall_status(&self) -> OverallStatus {
        match self.favourable_count() {
            3.. => OverallStatus::Stable,
            2 => OverallStatus::Moderate,
            _ => OverallStatus::Unstable,
        }
    }
}

/// Boiler water parameters used by the deduction score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoilerSample {
    pub ph: f64,
    pub tds: f64,
    pub hardness: f64,
    /// M-alkalinity as CaCO3; a missing reading counts as zero
    pub m_alkalinity: Option<f64>,
}

impl BoilerSample {
    pub fn stability_score(&self) -> f64 {
        let mut score = BOILER_BASE_SCORE;

        if !(10.5..=11.5).contains(&self.ph) {
            score -= (self.ph - 11.0).abs() / 0.1 * 5.0;
        }

        if !(2500.0..=3500.0).contains(&self.tds) {
            score -= if self.tds > 4000.0 { 20.0 } else { 10.0 };
        }

        if self.hardness > 2.0 {
            score -= if self.hardness > 5.0 { 20.0 } else { 10.0 };
        }

        let m_alkalinity = self.m_alkalinity.unwrap_or(0.0);
        if !(250.0..=600.0).contains(&m_alkalinity) {
            score -= (m_alkalinity - 425.0).abs() / 50.0 * 2.0;
        }

        clamp_score(score)
    }
}

/// Overall status thresholds for a boiler deduction score.
pub fn boiler_overall_status(score: f64) -> OverallStatus {
    if score >= 70.0 {
        OverallStatus::Stable
    } else if score >= 50.0 {
        OverallStatus::Moderate
    } else {
        OverallStatus::Unstable
    }
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
