//! Database models for water analyses.

use crate::api::models::water_analyses::AnalysisType;
use crate::chemistry::{BoilerReport, CoolingReport};
use crate::types::{AnalysisId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Raw measurements as entered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    pub ph: f64,
    pub tds: f64,
    pub hardness: f64,
    pub total_alkalinity: Option<f64>,
    pub chloride: Option<f64>,
    pub temperature: Option<f64>,
    pub basin_temperature: Option<f64>,
    pub sulphate: Option<f64>,
    pub m_alkalinity: Option<f64>,
}

/// Derived columns. Index columns stay empty for boiler water.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedResults {
    pub lsi: Option<f64>,
    pub rsi: Option<f64>,
    pub ls: Option<f64>,
    pub psi: Option<f64>,
    pub lr: Option<f64>,
    pub stability_score: Option<f64>,
    pub lsi_status: Option<String>,
    pub rsi_status: Option<String>,
    pub ls_status: Option<String>,
    pub psi_status: Option<String>,
    pub lr_status: Option<String>,
    pub overall_status: Option<String>,
}

impl From<&CoolingReport> for ComputedResults {
    fn from(report: &CoolingReport) -> Self {
        Self {
            lsi: Some(report.indices.lsi),
            rsi: Some(report.indices.rsi),
            ls: Some(report.indices.ls),
            psi: Some(report.indices.psi),
            lr: Some(report.indices.lr),
            stability_score: Some(report.stability_score),
            lsi_status: Some(report.lsi_status.to_string()),
            rsi_status: Some(report.rsi_status.to_string()),
            ls_status: Some(report.ls_status.to_string()),
            psi_status: Some(report.psi_status.to_string()),
            lr_status: Some(report.lr_status.to_string()),
            overall_status: Some(report.overall_status.to_string()),
        }
    }
}

impl From<&BoilerReport> for ComputedResults {
    fn from(report: &BoilerReport) -> Self {
        Self {
            stability_score: Some(report.stability_score),
            overall_status: Some(report.overall_status.to_string()),
            ..Default::default()
        }
    }
}

/// Everything needed to write an analysis row. Used for both inserts and full replacements.
#[derive(Debug, Clone)]
pub struct WaterAnalysisDBRequest {
    pub user_id: UserId,
    pub analysis_name: String,
    pub analysis_type: AnalysisType,
    pub analysis_date: NaiveDate,
    pub measurements: Measurements,
    pub computed: ComputedResults,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct WaterAnalysisDBResponse {
    pub id: AnalysisId,
    pub user_id: UserId,
    pub analysis_name: String,
    pub analysis_type: AnalysisType,
    pub analysis_date: NaiveDate,
    pub ph: f64,
    pub tds: f64,
    pub hardness: f64,
    pub total_alkalinity: Option<f64>,
    pub chloride: Option<f64>,
    pub temperature: Option<f64>,
    pub basin_temperature: Option<f64>,
    pub sulphate: Option<f64>,
    pub m_alkalinity: Option<f64>,
    pub lsi: Option<f64>,
    pub rsi: Option<f64>,
    pub ls: Option<f64>,
    pub psi: Option<f64>,
    pub lr: Option<f64>,
    pub stability_score: Option<f64>,
    pub lsi_status: Option<String>,
    pub rsi_status: Option<String>,
    pub ls_status: Option<String>,
    pub psi_status: Option<String>,
    pub lr_status: Option<String>,
    pub overall_status: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One dated value of a single column.
#[derive(Debug, Clone, FromRow)]
pub struct TrendRow {
    pub analysis_date: NaiveDate,
    pub value: f64,
}
