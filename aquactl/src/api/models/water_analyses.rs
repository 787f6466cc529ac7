//! API request/response models for stored water analyses.

use super::pagination::Pagination;
use super::recommendations::RecommendationResponse;
use crate::chemistry::round2;
use crate::db::models::water_analyses::WaterAnalysisDBResponse;
use crate::types::{AnalysisId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Cooling water is judged on the stability indices, boiler water on its control ranges.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "analysis_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    #[default]
    Cooling,
    Boiler,
}

/// Body of create (POST) and replace (PUT) requests.
///
/// Numeric fields accept JSON numbers or numeric strings.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WaterAnalysisRequest {
    /// Defaults to "Water Analysis"
    pub analysis_name: Option<String>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    /// Defaults to today
    pub analysis_date: Option<NaiveDate>,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub ph: f64,
    /// Total dissolved solids (ppm)
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub tds: f64,
    /// Hardness as CaCO3 (ppm)
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub hardness: f64,

    /// Total alkalinity as CaCO3 (ppm); required for cooling water
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub total_alkalinity: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub chloride: Option<f64>,
    /// Hot side temperature (°C)
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub temperature: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub basin_temperature: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub sulphate: Option<f64>,
    /// M-alkalinity as CaCO3 (ppm); used for boiler water
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub m_alkalinity: Option<f64>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WaterAnalysisResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AnalysisId,
    #[schema(value_type = String, format = "uuid")]
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

    /// Recommendations derived from this analysis (omitted in list responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<RecommendationResponse>>,
}

impl From<WaterAnalysisDBResponse> for WaterAnalysisResponse {
    fn from(db: WaterAnalysisDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            analysis_name: db.analysis_name,
            analysis_type: db.analysis_type,
            analysis_date: db.analysis_date,
            ph: db.ph,
            tds: db.tds,
            hardness: db.hardness,
            total_alkalinity: db.total_alkalinity,
            chloride: db.chloride,
            temperature: db.temperature,
            basin_temperature: db.basin_temperature,
            sulphate: db.sulphate,
            m_alkalinity: db.m_alkalinity,
            lsi: db.lsi.map(round2),
            rsi: db.rsi.map(round2),
            ls: db.ls.map(round2),
            psi: db.psi.map(round2),
            lr: db.lr.map(round2),
            stability_score: db.stability_score.map(round2),
            lsi_status: db.lsi_status,
            rsi_status: db.rsi_status,
            ls_status: db.ls_status,
            psi_status: db.psi_status,
            lr_status: db.lr_status,
            overall_status: db.overall_status,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
            recommendations: None,
        }
    }
}

impl WaterAnalysisResponse {
    pub fn with_recommendations(mut self, recommendations: Vec<RecommendationResponse>) -> Self {
        self.recommendations = Some(recommendations);
        self
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListWaterAnalysesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Another user's analyses (managers and admins only)
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,

    pub analysis_type: Option<AnalysisType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_defaults() {
        let request: WaterAnalysisRequest = serde_json::from_value(json!({
            "ph": "7.4",
            "tds": 450,
            "hardness": "220"
        }))
        .unwrap();
        assert_eq!(request.analysis_type, AnalysisType::Cooling);
        assert_eq!(request.hardness, 220.0);
        assert!(request.total_alkalinity.is_none());
        assert!(request.analysis_date.is_none());
    }

    #[test]
    fn analysis_type_is_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_value(AnalysisType::Boiler).unwrap(), json!("boiler"));
        let parsed: AnalysisType = serde_json::from_value(json!("cooling")).unwrap();
        assert_eq!(parsed, AnalysisType::Cooling);
    }
}
