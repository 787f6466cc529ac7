//! Recommendation rules.
//!
//! Two rule sets live here. [`for_cooling`] and [`for_boiler`] derive the recommendations attached
//! to a single assessment; [`alerts_for_latest`] produces the live alerts shown in the
//! recommendation feed from a user's most recent readings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::scoring::CoolingBands;
use super::status::{LangelierRatioStatus, OverallStatus, PuckoriusStatus, SaturationStatus};

/// Returned by the calculation endpoint when none of the rules fire.
pub const ROUTINE_MONITORING: &str = "Water chemistry is within target ranges; continue routine monitoring";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "recommendation_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Scaling,
    Corrosion,
    Treatment,
    Monitoring,
    Maintenance,
    Optimization,
}

/// Ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "recommendation_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, priority: Priority, title: &str, description: impl Into<String>) -> Self {
        Self {
            kind,
            priority,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Rules for a cooling water assessment, in evaluation order.
pub fn for_cooling(bands: &CoolingBands, overall: OverallStatus) -> Vec<Recommendation> {
    use Priority::*;
    use RecommendationKind::*;

    let mut out = Vec::new();

    match bands.lsi {
        SaturationStatus::ScalingLikely => {
            out.push(Recommendation::new(
                Scaling,
                High,
                "Review chemical dosing to reduce scaling tendency",
                "High LSI indicates potential for scale formation. Consider adjusting chemical treatment.",
            ));
            out.push(Recommendation::new(
                Treatment,
                Medium,
                "Increase blowdown rate",
                "Higher blowdown rate can help reduce scaling potential.",
            ));
        }
        SaturationStatus::CorrosionLikely => out.push(Recommendation::new(
            Corrosion,
            High,
            "Implement corrosion inhibitor treatment",
            "Low LSI indicates potential for corrosion. Add corrosion inhibitors.",
        )),
        SaturationStatus::Stable => {}
    }

    match bands.rsi {
        SaturationStatus::ScalingLikely => out.push(Recommendation::new(
            Scaling,
            Medium,
            "Optimize water treatment program",
            "Low RSI indicates scaling tendency. Review treatment chemicals.",
        )),
        SaturationStatus::CorrosionLikely => out.push(Recommendation::new(
            Corrosion,
            Medium,
            "Monitor system for corrosion",
            "High RSI indicates corrosion potential. Increase monitoring frequency.",
        )),
        SaturationStatus::Stable => {}
    }

    match bands.psi {
        PuckoriusStatus::Scaling => out.push(Recommendation::new(
            Scaling,
            Medium,
            "Address scaling tendency",
            "High PSI indicates scaling potential. Review treatment program.",
        )),
        PuckoriusStatus::Corrosive => out.push(Recommendation::new(
            Corrosion,
            Medium,
            "Address corrosion tendency",
            "High PSI indicates corrosion potential. Add corrosion inhibitors.",
        )),
        PuckoriusStatus::Optimal => {}
    }

    if bands.lr == LangelierRatioStatus::High {
        out.push(Recommendation::new(
            Corrosion,
            High,
            "Address chloride and sulfate corrosion",
            "High Langelier Ratio indicates chloride/sulfate corrosion potential.",
        ));
    }

    if overall == OverallStatus::Unstable {
        out.push(unstable_monitoring());
    }

    out
}

/// Boiler water has no index bands, so only the overall verdict produces a recommendation.
pub fn for_boiler(overall: OverallStatus) -> Vec<Recommendation> {
    if overall == OverallStatus::Unstable {
        vec![unstable_monitoring()]
    } else {
        Vec::new()
    }
}

fn unstable_monitoring() -> Recommendation {
    Recommendation::new(
        RecommendationKind::Monitoring,
        Priority::High,
        "Increase monitoring frequency",
        "Overall unstable conditions require more frequent monitoring.",
    )
}

/// The readings from a user's most recent analysis that drive live alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatestReadings {
    pub ph: Option<f64>,
    pub tds: Option<f64>,
    pub lsi: Option<f64>,
    pub rsi: Option<f64>,
    pub temperature: Option<f64>,
}

/// Live alerts for the latest readings.
pub fn alerts_for_latest(readings: &LatestReadings) -> Vec<Recommendation> {
    use Priority::*;
    use RecommendationKind::*;

    let mut out = Vec::new();

    if let Some(ph) = readings.ph {
        if ph > 8.0 {
            out.push(Recommendation::new(
                Treatment,
                High,
                "High pH Level Detected",
                format!("pH level of {ph} is above optimal range. Consider pH reduction treatment."),
            ));
        } else if ph < 6.5 {
            out.push(Recommendation::new(
                Treatment,
                High,
                "Low pH Level Detected",
                format!("pH level of {ph} is below optimal range. Consider pH increase treatment."),
            ));
        }
    }

    if let Some(lsi) = readings.lsi {
        if lsi > 0.5 {
            out.push(Recommendation::new(
                Treatment,
                High,
                "Scaling Risk Detected",
                format!(
                    "LSI value of {lsi:.2} indicates scaling potential. Monitor closely and consider anti-scaling treatment."
                ),
            ));
        } else if lsi < -0.5 {
            out.push(Recommendation::new(
                Treatment,
                High,
                "Corrosion Risk Detected",
                format!("LSI value of {lsi:.2} indicates corrosion potential. Consider corrosion inhibitor treatment."),
            ));
        }
    }

    if let Some(rsi) = readings.rsi {
        if rsi < 6.0 {
            out.push(Recommendation::new(
                Maintenance,
                Medium,
                "RSI Scaling Warning",
                format!("RSI value of {rsi:.2} indicates scaling tendency. Schedule maintenance."),
            ));
        } else if rsi > 7.0 {
            out.push(Recommendation::new(
                Monitoring,
                Medium,
                "RSI Corrosion Warning",
                format!("RSI value of {rsi:.2} indicates corrosion tendency. Monitor system integrity."),
            ));
        }
    }

    if let Some(temperature) = readings.temperature.filter(|t| *t > 30.0) {
        out.push(Recommendation::new(
            Optimization,
            Medium,
            "High Temperature Alert",
            format!("Temperature of {temperature}°C is above optimal range. Consider cooling system adjustment."),
        ));
    }

    if let Some(tds) = readings.tds.filter(|t| *t > 200.0) {
        out.push(Recommendation::new(
            Treatment,
            Medium,
            "High TDS Levels",
            format!("TDS of {tds} ppm is elevated. Consider water treatment or filtration."),
        ));
    }

    out
}
