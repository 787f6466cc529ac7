//! HTTP handlers for the recommendation feed.
//!
//! The feed merges recommendations stored with the caller's analyses and live alerts derived
//! from their most recent analysis. Live alerts have no ID and cannot be marked implemented.

use crate::{
    AppState,
    api::models::recommendations::{ListRecommendationsQuery, RecommendationResponse, RecommendationUpdate, sort_feed},
    auth::permissions::{self, RequiresPermission, operation, resource},
    chemistry::recommendations::{LatestReadings, alerts_for_latest},
    db::handlers::{WaterAnalyses, WaterRecommendations},
    errors::{Error, Result},
    types::{Operation, Permission, RecommendationId, Resource},
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};

/// List recommendations
#[utoipa::path(
    get,
    path = "/water-recommendations/",
    tag = "water_recommendations",
    summary = "List recommendations",
    description = "Stored recommendations from the caller's analyses plus live alerts for their latest analysis, \
        most urgent first. Managers and admins may pass `user_id` to see another user's feed.",
    params(ListRecommendationsQuery),
    responses(
        (status = 200, description = "Recommendation feed", body = [RecommendationResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - cannot read other users' recommendations"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_recommendations(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Recommendations, operation::ReadOwn>,
    Query(query): Query<ListRecommendationsQuery>,
) -> Result<Json<Vec<RecommendationResponse>>> {
    let user_id = permissions::target_user(&perm.user, query.user_id, Resource::Recommendations)?;
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut feed: Vec<RecommendationResponse> = WaterRecommendations::new(&mut conn)
        .list_for_user(Some(user_id), query.pending_only)
        .await?
        .into_iter()
        .map(RecommendationResponse::from)
        .collect();

    if let Some(latest) = WaterAnalyses::new(&mut conn).latest_for_user(user_id).await? {
        let readings = LatestReadings {
            ph: Some(latest.ph),
            tds: Some(latest.tds),
            lsi: latest.lsi,
            rsi: latest.rsi,
            temperature: latest.temperature,
        };
        feed.extend(
            alerts_for_latest(&readings)
                .into_iter()
                .map(|alert| RecommendationResponse::dynamic(latest.id, latest.created_at, alert)),
        );
    }

    sort_feed(&mut feed);
    Ok(Json(feed))
}

/// Update a recommendation
#[utoipa::path(
    patch,
    path = "/water-recommendations/{id}/",
    tag = "water_recommendations",
    summary = "Update a recommendation",
    description = "Mark a stored recommendation as implemented, or not.",
    params(("id" = uuid::Uuid, Path, description = "Recommendation ID")),
    request_body = RecommendationUpdate,
    responses(
        (status = 200, description = "Updated recommendation", body = RecommendationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Recommendation not found"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all, fields(recommendation_id = %id))]
pub async fn update_recommendation(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Recommendations, operation::UpdateOwn>,
    Path(id): Path<RecommendationId>,
    Json(update): Json<RecommendationUpdate>,
) -> Result<Json<RecommendationResponse>> {
    let not_found = || Error::NotFound {
        resource: "Recommendation".to_string(),
        id: id.to_string(),
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = WaterRecommendations::new(&mut tx);
    let existing = repo.get_by_id(id).await?.ok_or_else(not_found)?;

    if !permissions::can_access_owned(&perm.user, Resource::Recommendations, Operation::ReadOwn, existing.user_id) {
        return Err(not_found());
    }
    if !permissions::can_access_owned(&perm.user, Resource::Recommendations, Operation::UpdateOwn, existing.user_id) {
        return Err(Error::InsufficientPermissions {
            required: Permission(Resource::Recommendations, Operation::UpdateOwn),
            action: Operation::UpdateOwn,
            resource: format!("recommendation {id}"),
        });
    }

    let updated = repo.set_implemented(id, update.is_implemented).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(RecommendationResponse::from(updated)))
}
