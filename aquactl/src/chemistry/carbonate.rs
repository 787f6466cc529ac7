//! Carbonate equilibrium and speciation.
//!
//! Dissolved inorganic carbon is distributed between carbonic acid, bicarbonate and carbonate
//! depending on pH and temperature. The distribution is expressed as ionisation fractions
//! (`α` values) derived from the first and second dissociation constants of carbonic acid.

use super::{ChemistryError, Result};

/// Offset between degrees Celsius and kelvin.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Equivalent weight of CaCO3 (mg per milliequivalent); alkalinity reported "as CaCO3" divided by
/// this gives epm.
pub const CACO3_EQUIVALENT_WEIGHT: f64 = 50.0;

/// Convert degrees Celsius to kelvin.
#[inline]
pub fn kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Temperature dependent dissociation constants of carbonic acid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumConstants {
    /// H2CO3 <-> H+ + HCO3-
    pub k1: f64,
    /// HCO3- <-> H+ + CO3--
    pub k2: f64,
}

impl EquilibriumConstants {
    /// Evaluate K1 and K2 at the given water temperature.
    ///
    /// `K1 = 10^-(3404.71/T + 0.032786*T - 14.8435)` and
    /// `K2 = 10^-(2902.39/T + 0.02379*T - 6.498)` with `T` in kelvin.
    pub fn at_temperature(celsius: f64) -> Self {
        let t = kelvin(celsius);
        let pk1 = 3404.71 / t + 0.032786 * t - 14.8435;
        let pk2 = 2902.39 / t + 0.02379 * t - 6.498;
        Self {
            k1: 10f64.powf(-pk1),
            k2: 10f64.powf(-pk2),
        }
    }
}

/// Fractions of total dissolved carbonate present as each species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speciation {
    /// α0, carbonic acid (dissolved CO2)
    pub h2co3: f64,
    /// α1, bicarbonate
    pub hco3: f64,
    /// α2, carbonate
    pub co3: f64,
}

impl Speciation {
    /// Compute the ionisation fractions for a pH and set of equilibrium constants.
    pub fn at(ph: f64, constants: EquilibriumConstants) -> Result<Self> {
        let h = 10f64.powf(-ph);
        let EquilibriumConstants { k1, k2 } = constants;
        let denominator = h * h + h * k1 + k1 * k2;
        if !denominator.is_finite() || denominator <= 0.0 {
            return Err(ChemistryError::DegenerateSpeciation);
        }

        Ok(Self {
            h2co3: h * h / denominator,
            hco3: h * k1 / denominator,
            co3: k1 * k2 / denominator,
        })
    }

    /// Sum of all fractions. Equal to one up to rounding.
    pub fn total(&self) -> f64 {
        self.h2co3 + self.hco3 + self.co3
    }
}

/// Bicarbonate and carbonate concentrations in equivalents per million.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonateEquivalents {
    pub hco3: f64,
    pub co3: f64,
}

impl CarbonateEquivalents {
    /// Bicarbonate and carbonate epm for a total alkalinity (mg/L as CaCO3).
    ///
    /// Each species is its ionisation fraction applied to the alkalinity expressed as CaCO3
    /// equivalents, so the split shifts with pH and temperature.
    pub fn from_alkalinity(total_alkalinity: f64, speciation: &Speciation) -> Self {
        let alkalinity_molar = total_alkalinity / CACO3_EQUIVALENT_WEIGHT;
        Self {
            hco3: speciation.hco3 * alkalinity_molar,
            co3: speciation.co3 * alkalinity_molar,
        }
    }

    pub fn total(&self) -> f64 {
        self.hco3 + self.co3
    }
}
