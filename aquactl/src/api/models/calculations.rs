//! Request and response bodies for the stateless calculation endpoints.

use crate::chemistry::{CoolingReport, DEFAULT_TEMPERATURE, WaterSample, round2};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::ToSchema;

/// Measured water parameters. Every field accepts a JSON number or a numeric string.
#[serde_as]
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WaterSampleRequest {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(example = 7.5)]
    pub ph: f64,
    /// Total dissolved solids (ppm)
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(example = 300.0)]
    pub tds: f64,
    /// Total alkalinity as CaCO3 (ppm)
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(example = 150.0)]
    pub total_alkalinity: f64,
    /// Calcium hardness as CaCO3 (ppm)
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(example = 200.0)]
    pub hardness: f64,
    /// Chloride (ppm)
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(example = 50.0)]
    pub chloride: f64,
    /// Water temperature in °C (default 25)
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[schema(example = 25.0)]
    pub temperature: Option<f64>,
    /// Sulphate (ppm, default 0)
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[schema(example = 75.0)]
    pub sulphate: Option<f64>,
}

impl From<WaterSampleRequest> for WaterSample {
    fn from(request: WaterSampleRequest) -> Self {
        Self {
            ph: request.ph,
            tds: request.tds,
            total_alkalinity: request.total_alkalinity,
            hardness: request.hardness,
            chloride: request.chloride,
            sulphate: request.sulphate.unwrap_or(0.0),
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        }
    }
}

/// Index values (rounded to two decimals) with their status labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CalculationResponse {
    pub lsi: f64,
    pub rsi: f64,
    pub ls: f64,
    pub psi: f64,
    pub lr: f64,
    pub lsi_status: String,
    pub rsi_status: String,
    pub ls_status: String,
    pub psi_status: String,
    pub lr_status: String,
    /// Aggregate score between 0 and 100
    pub stability_score: f64,
    /// One of "Stable", "Moderate" or "Unstable"
    pub overall_status: String,
}

impl From<&CoolingReport> for CalculationResponse {
    fn from(report: &CoolingReport) -> Self {
        Self {
            lsi: round2(report.indices.lsi),
            rsi: round2(report.indices.rsi),
            ls: round2(report.indices.ls),
            psi: round2(report.indices.psi),
            lr: round2(report.indices.lr),
            lsi_status: report.lsi_status.to_string(),
            rsi_status: report.rsi_status.to_string(),
            ls_status: report.ls_status.to_string(),
            psi_status: report.psi_status.to_string(),
            lr_status: report.lr_status.to_string(),
            stability_score: round2(report.stability_score),
            overall_status: report.overall_status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CalculationWithRecommendationsResponse {
    pub calculation: CalculationResponse,
    pub recommendations: Vec<String>,
}

impl From<&CoolingReport> for CalculationWithRecommendationsResponse {
    fn from(report: &CoolingReport) -> Self {
        Self {
            calculation: CalculationResponse::from(report),
            recommendations: report.recommendation_titles(),
        }
    }
}
