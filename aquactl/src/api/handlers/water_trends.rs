use crate::{
    AppState,
    api::models::trends::{TrendPoint, TrendsQuery},
    auth::permissions::{self, RequiresPermission, operation, resource},
    chemistry::trends::TrendParameter,
    db::handlers::WaterAnalyses,
    errors::{Error, Result},
    types::Resource,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{Duration, Utc};

/// Get a trend series
#[utoipa::path(
    get,
    path = "/water-trends/",
    tag = "water_trends",
    summary = "Get a trend series",
    description = "Values of one analysis column over the trailing window, oldest first. \
        Analyses without a value for the column are skipped. Managers and admins may pass `user_id`.",
    params(TrendsQuery),
    responses(
        (status = 200, description = "Trend points", body = [TrendPoint]),
        (status = 400, description = "Unknown parameter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - cannot read other users' trends"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_trends(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Trends, operation::ReadOwn>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<Vec<TrendPoint>>> {
    let parameter = match query.parameter.as_deref() {
        Some(raw) => raw
            .parse::<TrendParameter>()
            .map_err(|e| Error::BadRequest { message: e.to_string() })?,
        None => TrendParameter::Ph,
    };

    let target = permissions::target_user(&perm.user, query.user_id, Resource::Trends)?;
    let window = &state.config.trends;
    let days = query.days.unwrap_or(window.default_days).clamp(1, window.max_days);
    let since = Utc::now().date_naive() - Duration::days(days);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = WaterAnalyses::new(&mut conn)
        .trend_points(target, parameter, since)
        .await?;

    tracing::debug!(parameter = parameter.column(), days, points = rows.len(), "built trend series");
    Ok(Json(
        rows.into_iter()
            .map(|row| TrendPoint::new(parameter, row.analysis_date, row.value))
            .collect(),
    ))
}
