//! Water stability chemistry.
//!
//! Everything in this module is pure and synchronous: a [`WaterSample`] goes in and a
//! [`CoolingReport`] comes out, with no I/O or shared state. The HTTP handlers and the persistence
//! layer both build on [`assess_cooling`] and [`assess_boiler`].
//!
//! ## Indices
//!
//! - **LSI** (Langelier Saturation Index): `pH - pHs`
//! - **RSI** (Ryznar Stability Index): `2·pHs - pH`
//! - **PSI** (Puckorius Scaling Index): `2·pHs - pHe`
//! - **LR** (Langelier ratio): aggressive anions over carbonate alkalinity, in epm
//! - **LS** (Larson-Skold): chloride over total alkalinity
//!
//! The saturation pH `pHs` is derived from TDS, temperature, calcium hardness and alkalinity
//! (see [`indices::SaturationTerms`]); the carbonate split used by LR comes from
//! [`carbonate::Speciation`].

pub mod carbonate;
pub mod indices;
pub mod recommendations;
pub mod scoring;
pub mod status;
pub mod trends;

use thiserror::Error;

pub use indices::StabilityIndices;
pub use recommendations::{Priority, Recommendation, RecommendationKind};
pub use scoring::{BoilerSample, CoolingBands};
pub use status::{LangelierRatioStatus, LarsonSkoldStatus, OverallStatus, PuckoriusStatus, SaturationStatus};

/// Default water temperature (°C) when a sample omits it.
pub const DEFAULT_TEMPERATURE: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChemistryError {
    #[error("{parameter} must be a finite number")]
    NotFinite { parameter: &'static str },

    #[error("{parameter} must be greater than zero (got {value})")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("{parameter} must not be negative (got {value})")]
    Negative { parameter: &'static str, value: f64 },

    #[error("{parameter} must be between {min} and {max} (got {value})")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{parameter} is zero and cannot be used as a divisor")]
    ZeroDenominator { parameter: &'static str },

    #[error("carbonate speciation is undefined for this pH and temperature")]
    DegenerateSpeciation,
}

pub type Result<T> = std::result::Result<T, ChemistryError>;

/// One set of measured water parameters. Concentrations are in mg/L (ppm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterSample {
    pub ph: f64,
    /// Total dissolved solids
    pub tds: f64,
    /// Total alkalinity as CaCO3
    pub total_alkalinity: f64,
    /// Calcium hardness as CaCO3
    pub hardness: f64,
    pub chloride: f64,
    pub sulphate: f64,
    /// Degrees Celsius
    pub temperature: f64,
}

impl WaterSample {
    /// Check every parameter against its accepted range.
    ///
    /// Errors name the first offending parameter. The log10 arguments (TDS, alkalinity,
    /// hardness) must be strictly positive; pH is limited to 0-14 and temperature to liquid water
    /// at atmospheric pressure.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("ph", self.ph),
            ("tds", self.tds),
            ("total_alkalinity", self.total_alkalinity),
            ("hardness", self.hardness),
            ("chloride", self.chloride),
            ("sulphate", self.sulphate),
            ("temperature", self.temperature),
        ];
        if let Some(&(parameter, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ChemistryError::NotFinite { parameter });
        }

        check_range("ph", self.ph, 0.0, 14.0)?;
        check_positive("tds", self.tds)?;
        check_positive("total_alkalinity", self.total_alkalinity)?;
        check_positive("hardness", self.hardness)?;
        check_non_negative("chloride", self.chloride)?;
        check_non_negative("sulphate", self.sulphate)?;
        check_range("temperature", self.temperature, 0.0, 100.0)?;
        Ok(())
    }
}

fn check_range(parameter: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value < min || value > max {
        return Err(ChemistryError::OutOfRange {
            parameter,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value <= 0.0 {
        return Err(ChemistryError::NonPositive { parameter, value });
    }
    Ok(())
}

fn check_non_negative(parameter: &'static str, value: f64) -> Result<()> {
    if value < 0.0 {
        return Err(ChemistryError::Negative { parameter, value });
    }
    Ok(())
}

/// Full result of a cooling water assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingReport {
    pub indices: StabilityIndices,
    pub lsi_status: SaturationStatus,
    pub rsi_status: SaturationStatus,
    pub ls_status: LarsonSkoldStatus,
    pub psi_status: PuckoriusStatus,
    pub lr_status: LangelierRatioStatus,
    pub stability_score: f64,
    pub overall_status: OverallStatus,
    pub recommendations: Vec<Recommendation>,
}

impl CoolingReport {
    fn bands(&self) -> CoolingBands {
        CoolingBands {
            lsi: self.lsi_status,
            rsi: self.rsi_status,
            psi: self.psi_status,
            lr: self.lr_status,
        }
    }

    /// Recommendation titles, falling back to a single routine-monitoring line when no rule fired.
    pub fn recommendation_titles(&self) -> Vec<String> {
        if self.recommendations.is_empty() {
            return vec![recommendations::ROUTINE_MONITORING.to_string()];
        }
        self.recommendations.iter().map(|r| r.title.clone()).collect()
    }
}

/// Validate a sample, compute every index and derive statuses, score and recommendations.
pub fn assess_cooling(sample: &WaterSample) -> Result<CoolingReport> {
    sample.validate()?;
    let indices = StabilityIndices::compute(sample)?;

    let mut report = CoolingReport {
        indices,
        lsi_status: SaturationStatus::from_lsi(indices.lsi),
        rsi_status: SaturationStatus::from_rsi(indices.rsi),
        ls_status: LarsonSkoldStatus::from_ls(indices.ls),
        psi_status: PuckoriusStatus::from_psi(indices.psi),
        lr_status: LangelierRatioStatus::from_lr(indices.lr),
        stability_score: 0.0,
        overall_status: OverallStatus::Unstable,
        recommendations: Vec::new(),
    };
    let bands = report.bands();
    report.stability_score = bands.stability_score();
    report.overall_status = bands.overall_status();
    report.recommendations = recommendations::for_cooling(&bands, report.overall_status);
    Ok(report)
}

/// Result of a boiler water assessment. Boiler water is judged on control ranges, not indices.
#[derive(Debug, Clone, PartialEq)]
pub struct BoilerReport {
    pub stability_score: f64,
    pub overall_status: OverallStatus,
    pub recommendations: Vec<Recommendation>,
}

pub fn assess_boiler(sample: &BoilerSample) -> Result<BoilerReport> {
    let fields = [
        ("ph", Some(sample.ph)),
        ("tds", Some(sample.tds)),
        ("hardness", Some(sample.hardness)),
        ("m_alkalinity", sample.m_alkalinity),
    ];
    for (parameter, value) in fields {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(ChemistryError::NotFinite { parameter });
        }
    }
    check_range("ph", sample.ph, 0.0, 14.0)?;
    check_non_negative("tds", sample.tds)?;
    check_non_negative("hardness", sample.hardness)?;

    let stability_score = sample.stability_score();
    let overall_status = scoring::boiler_overall_status(stability_score);
    Ok(BoilerReport {
        stability_score,
        overall_status,
        recommendations: recommendations::for_boiler(overall_status),
    })
}

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_sample() -> WaterSample {
        WaterSample {
            ph: 7.5,
            tds: 300.0,
            total_alkalinity: 150.0,
            hardness: 200.0,
            chloride: 50.0,
            sulphate: 75.0,
            temperature: 25.0,
        }
    }

    #[test]
    fn reference_sample_assessment() {
        let report = assess_cooling(&reference_sample()).unwrap();
        assert_eq!(report.lsi_status, SaturationStatus::Stable);
        assert_eq!(report.rsi_status, SaturationStatus::CorrosionLikely);
        assert_eq!(report.psi_status, PuckoriusStatus::Corrosive);
        assert_eq!(report.lr_status, LangelierRatioStatus::Low);
        assert_eq!(report.ls_status, LarsonSkoldStatus::Moderate);
        assert_eq!(report.stability_score, 48.0);
        assert_eq!(report.overall_status, OverallStatus::Moderate);
        assert_eq!(
            report.recommendation_titles(),
            vec!["Monitor system for corrosion", "Address corrosion tendency"]
        );
    }

    #[test]
    fn validation_rejects_out_of_range_inputs() {
        let sample = WaterSample {
            ph: 14.5,
            ..reference_sample()
        };
        assert!(matches!(
            assess_cooling(&sample),
            Err(ChemistryError::OutOfRange { parameter: "ph", .. })
        ));

        let sample = WaterSample {
            total_alkalinity: 0.0,
            ..reference_sample()
        };
        assert!(matches!(
            assess_cooling(&sample),
            Err(ChemistryError::NonPositive {
                parameter: "total_alkalinity",
                ..
            })
        ));

        let sample = WaterSample {
            chloride: -1.0,
            ..reference_sample()
        };
        assert!(matches!(
            assess_cooling(&sample),
            Err(ChemistryError::Negative { parameter: "chloride", .. })
        ));

        let sample = WaterSample {
            temperature: f64::NAN,
            ..reference_sample()
        };
        assert_eq!(
            assess_cooling(&sample),
            Err(ChemistryError::NotFinite { parameter: "temperature" })
        );
    }

    #[test]
    fn score_is_bounded_over_a_grid_of_samples() {
        for ph in [6.0, 7.0, 8.0, 9.0] {
            for hardness in [10.0, 200.0, 800.0] {
                for chloride in [0.0, 50.0, 500.0] {
                    let report = assess_cooling(&WaterSample {
                        ph,
                        hardness,
                        chloride,
                        ..reference_sample()
                    })
                    .unwrap();
                    assert!((0.0..=100.0).contains(&report.stability_score));
                }
            }
        }
    }

    #[test]
    fn quiet_sample_falls_back_to_routine_monitoring() {
        // LSI 0.18, RSI 6.84, PSI 6.39, LR 0.28
        let sample = WaterSample {
            ph: 7.2,
            tds: 200.0,
            total_alkalinity: 5.0,
            hardness: 2500.0,
            chloride: 0.5,
            sulphate: 1.0,
            temperature: 70.0,
        };
        let report = assess_cooling(&sample).unwrap();
        assert_eq!(report.stability_score, 100.0);
        assert_eq!(report.overall_status, OverallStatus::Stable);
        assert_eq!(report.ls_status, LarsonSkoldStatus::Acceptable);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.recommendation_titles(), vec![recommendations::ROUTINE_MONITORING]);
    }

    #[test]
    fn boiler_assessment() {
        let report = assess_boiler(&BoilerSample {
            ph: 11.0,
            tds: 3000.0,
            hardness: 1.0,
            m_alkalinity: Some(400.0),
        })
        .unwrap();
        assert_eq!(report.stability_score, 100.0);
        assert_eq!(report.overall_status, OverallStatus::Stable);

        assert!(assess_boiler(&BoilerSample {
            ph: f64::INFINITY,
            tds: 3000.0,
            hardness: 1.0,
            m_alkalinity: None,
        })
        .is_err());
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(0.041_126), 0.04);
        assert_eq!(round2(7.189_77), 7.19);
        assert_eq!(round2(-0.125), -0.13);
    }
}
