//! HTTP handlers for the stateless calculation endpoints.
//!
//! Nothing is stored and no authentication is required.

use crate::{
    api::models::calculations::{CalculationResponse, CalculationWithRecommendationsResponse, WaterSampleRequest},
    chemistry::{self, CoolingReport, WaterSample},
    errors::{Error, Result},
};
use axum::{Json, extract::rejection::JsonRejection};
use tracing::debug;

/// Turn a parsed (or rejected) body into a full cooling water report.
fn assess(body: std::result::Result<Json<WaterSampleRequest>, JsonRejection>) -> Result<CoolingReport> {
    let Json(request) = body.map_err(|rejection| Error::BadRequest {
        message: rejection.body_text(),
    })?;

    let sample = WaterSample::from(request);
    let report = chemistry::assess_cooling(&sample)?;
    debug!(
        lsi = report.indices.lsi,
        rsi = report.indices.rsi,
        overall_status = %report.overall_status,
        "Assessed water sample"
    );
    metrics::counter!("aquactl_calculations_total", "overall_status" => report.overall_status.label()).increment(1);
    Ok(report)
}

/// Calculate stability indices with recommendations
#[utoipa::path(
    post,
    path = "/calculate-water-analysis-with-recommendations/",
    tag = "calculations",
    summary = "Calculate indices and recommendations",
    description = "Compute LSI, RSI, Larson-Skold, PSI and the Langelier ratio for a water sample, \
        together with their statuses, the aggregate stability score, and treatment recommendations. \
        Nothing is stored.",
    request_body = WaterSampleRequest,
    responses(
        (status = 200, description = "Indices and recommendations", body = CalculationWithRecommendationsResponse),
        (status = 400, description = "Missing, malformed or out-of-range parameters"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn calculate_with_recommendations(
    body: std::result::Result<Json<WaterSampleRequest>, JsonRejection>,
) -> Result<Json<CalculationWithRecommendationsResponse>> {
    let report = assess(body)?;
    Ok(Json(CalculationWithRecommendationsResponse::from(&report)))
}

/// Calculate stability indices
#[utoipa::path(
    post,
    path = "/calculate-water-analysis/",
    tag = "calculations",
    summary = "Calculate indices",
    description = "Same computation as the recommendations endpoint, returning only the indices, statuses and score.",
    request_body = WaterSampleRequest,
    responses(
        (status = 200, description = "Indices, statuses and score", body = CalculationResponse),
        (status = 400, description = "Missing, malformed or out-of-range parameters"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn calculate(body: std::result::Result<Json<WaterSampleRequest>, JsonRejection>) -> Result<Json<CalculationResponse>> {
    let report = assess(body)?;
    Ok(Json(CalculationResponse::from(&report)))
}
