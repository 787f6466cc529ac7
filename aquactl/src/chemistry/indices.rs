//! Closed-form stability indices.

use super::carbonate::{CarbonateEquivalents, EquilibriumConstants, Speciation};
use super::{ChemistryError, Result, WaterSample};

/// Equivalent weight of chloride (mg per milliequivalent).
pub const CHLORIDE_DIVISOR: f64 = 35.5;

/// Divisor applied to sulphate (mg/L) when expressing it alongside chloride in the ratio.
pub const SULPHATE_DIVISOR: f64 = 96.0;

/// The four correction terms of the saturation pH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationTerms {
    /// Total dissolved solids term
    pub a: f64,
    /// Temperature term
    pub b: f64,
    /// Calcium hardness term
    pub c: f64,
    /// Alkalinity term
    pub d: f64,
}

impl SaturationTerms {
    pub fn for_sample(sample: &WaterSample) -> Result<Self> {
        Ok(Self {
            a: (checked_log10("tds", sample.tds)? - 1.0) / 10.0,
            b: -13.12 * checked_log10("temperature", sample.temperature + 273.0)? + 34.55,
            c: checked_log10("hardness", sample.hardness)? - 0.4,
            d: checked_log10("total_alkalinity", sample.total_alkalinity)?,
        })
    }

    /// pHs = 9.3 + A + B - C - D
    pub fn saturation_ph(&self) -> f64 {
        9.3 + self.a + self.b - self.c - self.d
    }
}

/// All indices for one sample, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityIndices {
    /// Saturation pH
    pub phs: f64,
    /// Puckorius equilibrium pH
    pub phe: f64,
    pub lsi: f64,
    pub rsi: f64,
    pub ls: f64,
    pub psi: f64,
    pub lr: f64,
}

impl StabilityIndices {
    pub fn compute(sample: &WaterSample) -> Result<Self> {
        let phs = SaturationTerms::for_sample(sample)?.saturation_ph();
        let phe = equilibrium_ph(sample.total_alkalinity)?;

        Ok(Self {
            phs,
            phe,
            lsi: langelier(sample.ph, phs),
            rsi: ryznar(sample.ph, phs),
            ls: larson_skold(sample.chloride, sample.total_alkalinity)?,
            psi: puckorius(phs, phe),
            lr: langelier_ratio(sample)?,
        })
    }
}

/// LSI = pH - pHs
pub fn langelier(ph: f64, phs: f64) -> f64 {
    ph - phs
}

/// RSI = 2·pHs - pH
pub fn ryznar(ph: f64, phs: f64) -> f64 {
    2.0 * phs - ph
}

/// Puckorius equilibrium pH: pHe = 1.465 + log10(Alk) + 4.54
pub fn equilibrium_ph(total_alkalinity: f64) -> Result<f64> {
    Ok(1.465 + checked_log10("total_alkalinity", total_alkalinity)? + 4.54)
}

/// PSI = 2·pHe - pHs
pub fn puckorius(phs: f64, phe: f64) -> f64 {
    2.0 * phe - phs
}

/// Chloride to alkalinity ratio.
pub fn larson_skold(chloride: f64, total_alkalinity: f64) -> Result<f64> {
    if total_alkalinity <= 0.0 {
        return Err(ChemistryError::ZeroDenominator {
            parameter: "total_alkalinity",
        });
    }
    Ok(chloride / total_alkalinity)
}

/// LR = (epm Cl + epm SO4) / (epm HCO3 + epm CO3)
pub fn langelier_ratio(sample: &WaterSample) -> Result<f64> {
    let speciation = Speciation::at(sample.ph, EquilibriumConstants::at_temperature(sample.temperature))?;
    let carbonate = CarbonateEquivalents::from_alkalinity(sample.total_alkalinity, &speciation);
    let denominator = carbonate.total();
    if !denominator.is_finite() || denominator <= 0.0 {
        return Err(ChemistryError::DegenerateSpeciation);
    }

    let aggressive_anions = sample.chloride / CHLORIDE_DIVISOR + sample.sulphate / SULPHATE_DIVISOR;
    Ok(aggressive_anions / denominator)
}

fn checked_log10(parameter: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ChemistryError::NotFinite { parameter });
    }
    if value <= 0.0 {
        return Err(ChemistryError::NonPositive { parameter, value });
    }
    Ok(value.log10())
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

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
    }

    #[test]
    fn reference_sample_indices() {
        let indices = StabilityIndices::compute(&reference_sample()).unwrap();
        assert_close(indices.phs, 7.458_873_486);
        assert_close(indices.lsi, 0.041_126_514);
        assert_close(indices.rsi, 7.417_746_972);
        assert_close(indices.phe, 8.181_091_259);
        assert_close(indices.psi, 8.903_309_032);
        assert_close(indices.lr, 0.781_627_592);
        assert_close(indices.ls, 1.0 / 3.0);
    }

    #[test]
    fn computation_is_deterministic() {
        let sample = reference_sample();
        let first = StabilityIndices::compute(&sample).unwrap();
        for _ in 0..100 {
            assert_eq!(StabilityIndices::compute(&sample).unwrap(), first);
        }
    }

    #[test]
    fn saturation_terms() {
        let terms = SaturationTerms::for_sample(&reference_sample()).unwrap();
        assert_close(terms.a, (300f64.log10() - 1.0) / 10.0);
        assert_close(terms.d, 150f64.log10());
        assert_close(terms.saturation_ph(), 9.3 + terms.a + terms.b - terms.c - terms.d);
    }

    #[test]
    fn log_domain_errors_name_the_parameter() {
        let mut sample = reference_sample();
        sample.hardness = 0.0;
        assert_eq!(
            StabilityIndices::compute(&sample),
            Err(ChemistryError::NonPositive {
                parameter: "hardness",
                value: 0.0
            })
        );

        let mut sample = reference_sample();
        sample.tds = -1.0;
        assert!(matches!(
            StabilityIndices::compute(&sample),
            Err(ChemistryError::NonPositive { parameter: "tds", .. })
        ));
    }

    #[test]
    fn larson_skold_rejects_zero_alkalinity() {
        assert_eq!(
            larson_skold(50.0, 0.0),
            Err(ChemistryError::ZeroDenominator {
                parameter: "total_alkalinity"
            })
        );
    }

    #[test]
    fn langelier_ratio_follows_ph_and_temperature() {
        let reference = langelier_ratio(&reference_sample()).unwrap();

        let acidic = langelier_ratio(&WaterSample {
            ph: 6.0,
            ..reference_sample()
        })
        .unwrap();
        assert_close(acidic, 2.368_007_624);
        assert!(acidic > reference);

        let hot_and_basic = langelier_ratio(&WaterSample {
            ph: 10.0,
            temperature: 80.0,
            ..reference_sample()
        })
        .unwrap();
        assert_close(hot_and_basic, 0.729_999_049);

        let warm = langelier_ratio(&WaterSample {
            temperature: 60.0,
            ..reference_sample()
        })
        .unwrap();
        assert!((warm - reference).abs() > 1e-3);
    }

    #[test]
    fn langelier_ratio_rejects_undefined_speciation() {
        let sample = WaterSample {
            ph: f64::NAN,
            ..reference_sample()
        };
        assert_eq!(langelier_ratio(&sample), Err(ChemistryError::DegenerateSpeciation));

        let sample = WaterSample {
            total_alkalinity: 0.0,
            ..reference_sample()
        };
        assert_eq!(langelier_ratio(&sample), Err(ChemistryError::DegenerateSpeciation));
    }

    #[test]
    fn warmer_water_lowers_saturation_ph() {
        let cold = StabilityIndices::compute(&reference_sample()).unwrap();
        let hot = StabilityIndices::compute(&WaterSample {
            temperature: 50.0,
            ..reference_sample()
        })
        .unwrap();
        assert!(hot.phs < cold.phs);
        assert!(hot.lsi > cold.lsi);
    }
}
