//! HTTP handlers for stored water analyses.
//!
//! Indices are computed whenever an analysis is created or replaced, and the analysis'
//! recommendations are replaced in the same transaction.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        recommendations::RecommendationResponse,
        users::CurrentUser,
        water_analyses::{AnalysisType, ListWaterAnalysesQuery, WaterAnalysisRequest, WaterAnalysisResponse},
    },
    auth::permissions::{self, RequiresPermission, operation, resource},
    chemistry::{self, BoilerSample, DEFAULT_TEMPERATURE, Recommendation, WaterSample},
    db::{
        handlers::{Repository, WaterAnalyses, WaterRecommendations, water_analyses::AnalysisFilter},
        models::water_analyses::{ComputedResults, Measurements, WaterAnalysisDBRequest, WaterAnalysisDBResponse},
    },
    errors::{Error, Result},
    types::{AnalysisId, Operation, Permission, Resource, UserId},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;

const DEFAULT_ANALYSIS_NAME: &str = "Water Analysis";

/// Compute the derived columns for a request body and pair them with the recommendations to store.
fn evaluate(user_id: UserId, body: WaterAnalysisRequest) -> Result<(WaterAnalysisDBRequest, Vec<Recommendation>)> {
    let measurements = Measurements {
        ph: body.ph,
        tds: body.tds,
        hardness: body.hardness,
        total_alkalinity: body.total_alkalinity,
        chloride: body.chloride,
        temperature: body.temperature,
        basin_temperature: body.basin_temperature,
        sulphate: body.sulphate,
        m_alkalinity: body.m_alkalinity,
    };

    let (computed, recommendations) = match body.analysis_type {
        AnalysisType::Cooling => {
            let total_alkalinity = body.total_alkalinity.ok_or_else(|| Error::BadRequest {
                message: "total_alkalinity is required for cooling water analyses".to_string(),
            })?;
            let sample = WaterSample {
                ph: body.ph,
                tds: body.tds,
                total_alkalinity,
                hardness: body.hardness,
                chloride: body.chloride.unwrap_or(0.0),
                sulphate: body.sulphate.unwrap_or(0.0),
                temperature: body.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            };
            let report = chemistry::assess_cooling(&sample)?;
            (ComputedResults::from(&report), report.recommendations)
        }
        AnalysisType::Boiler => {
            let report = chemistry::assess_boiler(&BoilerSample {
                ph: body.ph,
                tds: body.tds,
                hardness: body.hardness,
                m_alkalinity: body.m_alkalinity,
            })?;
            (ComputedResults::from(&report), report.recommendations)
        }
    };

    let request = WaterAnalysisDBRequest {
        user_id,
        analysis_name: body
            .analysis_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_ANALYSIS_NAME.to_string()),
        analysis_type: body.analysis_type,
        analysis_date: body.analysis_date.unwrap_or_else(|| Utc::now().date_naive()),
        measurements,
        computed,
        notes: body.notes,
    };
    Ok((request, recommendations))
}

fn not_found(id: AnalysisId) -> Error {
    Error::NotFound {
        resource: "Water analysis".to_string(),
        id: id.to_string(),
    }
}

/// Check `operation` on an existing analysis. Analyses the caller cannot even read are reported
/// as missing.
fn authorize(user: &CurrentUser, analysis: &WaterAnalysisDBResponse, operation: Operation) -> Result<()> {
    if !permissions::can_access_owned(user, Resource::Analyses, Operation::ReadOwn, analysis.user_id) {
        return Err(not_found(analysis.id));
    }
    if !permissions::can_access_owned(user, Resource::Analyses, operation, analysis.user_id) {
        return Err(Error::InsufficientPermissions {
            required: Permission(Resource::Analyses, operation),
            action: operation,
            resource: format!("water analysis {}", analysis.id),
        });
    }
    Ok(())
}

/// List water analyses
#[utoipa::path(
    get,
    path = "/water-analysis/",
    tag = "water_analyses",
    summary = "List water analyses",
    description = "List the caller's analyses, newest first. Managers and admins may pass `user_id` to list another user's analyses.",
    params(ListWaterAnalysesQuery),
    responses(
        (status = 200, description = "Paginated list of analyses", body = PaginatedResponse<WaterAnalysisResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - cannot list other users' analyses"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_analyses(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Analyses, operation::ReadOwn>,
    Query(query): Query<ListWaterAnalysesQuery>,
) -> Result<Json<PaginatedResponse<WaterAnalysisResponse>>> {
    let target = permissions::target_user(&perm.user, query.user_id, Resource::Analyses)?;

    let filter = AnalysisFilter::new(query.pagination.skip(), query.pagination.limit())
        .for_user(Some(target))
        .of_type(query.analysis_type);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = WaterAnalyses::new(&mut conn);
    let analyses = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    let data = analyses.into_iter().map(WaterAnalysisResponse::from).collect();
    Ok(Json(PaginatedResponse::page(data, total_count, &query.pagination)))
}

/// Create a water analysis
#[utoipa::path(
    post,
    path = "/water-analysis/",
    tag = "water_analyses",
    summary = "Create a water analysis",
    description = "Store a set of measurements. Indices, statuses, the stability score and recommendations are computed and stored with it.",
    request_body = WaterAnalysisRequest,
    responses(
        (status = 201, description = "Analysis created", body = WaterAnalysisResponse),
        (status = 400, description = "Missing or out-of-range parameters"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - viewers cannot create analyses"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_analysis(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Analyses, operation::CreateOwn>,
    Json(body): Json<WaterAnalysisRequest>,
) -> Result<(StatusCode, Json<WaterAnalysisResponse>)> {
    let (request, recommendations) = evaluate(perm.user.id, body)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let analysis = WaterAnalyses::new(&mut tx).create(&request).await?;
    let stored = WaterRecommendations::new(&mut tx)
        .replace_for_analysis(analysis.id, &recommendations)
        .await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let response = WaterAnalysisResponse::from(analysis)
        .with_recommendations(stored.into_iter().map(RecommendationResponse::from).collect());
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a water analysis
#[utoipa::path(
    get,
    path = "/water-analysis/{id}/",
    tag = "water_analyses",
    summary = "Get a water analysis",
    params(("id" = uuid::Uuid, Path, description = "Analysis ID")),
    responses(
        (status = 200, description = "The analysis with its recommendations", body = WaterAnalysisResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Analysis not found"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all, fields(analysis_id = %id))]
pub async fn get_analysis(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Analyses, operation::ReadOwn>,
    Path(id): Path<AnalysisId>,
) -> Result<Json<WaterAnalysisResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let analysis = WaterAnalyses::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    authorize(&perm.user, &analysis, Operation::ReadOwn)?;

    let recommendations = WaterRecommendations::new(&mut conn).list_for_analysis(id).await?;
    let response = WaterAnalysisResponse::from(analysis)
        .with_recommendations(recommendations.into_iter().map(RecommendationResponse::from).collect());
    Ok(Json(response))
}

/// Replace a water analysis
#[utoipa::path(
    put,
    path = "/water-analysis/{id}/",
    tag = "water_analyses",
    summary = "Replace a water analysis",
    description = "Replace every measurement of an analysis. Derived values and recommendations are recomputed; \
        recommendations already marked as implemented are discarded with the rest.",
    params(("id" = uuid::Uuid, Path, description = "Analysis ID")),
    request_body = WaterAnalysisRequest,
    responses(
        (status = 200, description = "Updated analysis", body = WaterAnalysisResponse),
        (status = 400, description = "Missing or out-of-range parameters"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Analysis not found"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all, fields(analysis_id = %id))]
pub async fn replace_analysis(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Analyses, operation::UpdateOwn>,
    Path(id): Path<AnalysisId>,
    Json(body): Json<WaterAnalysisRequest>,
) -> Result<Json<WaterAnalysisResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let existing = WaterAnalyses::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    authorize(&perm.user, &existing, Operation::UpdateOwn)?;

    let (request, recommendations) = evaluate(existing.user_id, body)?;
    let analysis = WaterAnalyses::new(&mut tx).update(id, &request).await?;
    let stored = WaterRecommendations::new(&mut tx)
        .replace_for_analysis(id, &recommendations)
        .await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let response = WaterAnalysisResponse::from(analysis)
        .with_recommendations(stored.into_iter().map(RecommendationResponse::from).collect());
    Ok(Json(response))
}

/// Delete a water analysis
#[utoipa::path(
    delete,
    path = "/water-analysis/{id}/",
    tag = "water_analyses",
    summary = "Delete a water analysis",
    description = "Delete an analysis together with its recommendations.",
    params(("id" = uuid::Uuid, Path, description = "Analysis ID")),
    responses(
        (status = 204, description = "Analysis deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Analysis not found"),
    ),
    security(("X-Aquactl-User" = []))
)]
#[tracing::instrument(skip_all, fields(analysis_id = %id))]
pub async fn delete_analysis(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Analyses, operation::DeleteOwn>,
    Path(id): Path<AnalysisId>,
) -> Result<StatusCode> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = WaterAnalyses::new(&mut tx);
    let existing = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    authorize(&perm.user, &existing, Operation::DeleteOwn)?;

    if !repo.delete(id).await? {
        return Err(not_found(id));
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::{pagination::PaginatedResponse, users::Role, water_analyses::WaterAnalysisResponse};
    use crate::test_utils::{USER_HEADER, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    fn cooling_body() -> serde_json::Value {
        json!({
            "analysis_name": "Tower 2 basin",
            "analysis_date": "2025-05-14",
            "ph": 7.5,
            "tds": 300,
            "total_alkalinity": 150,
            "hardness": 200,
            "chloride": 50,
            "temperature": 25,
            "sulphate": 75
        })
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_computes_and_stores_recommendations(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let operator = create_test_user(&pool, Role::Operator).await;

        let response = server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &operator.email)
            .json(&cooling_body())
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let created: WaterAnalysisResponse = response.json();
        assert_eq!(created.user_id, operator.id);
        assert_eq!(created.analysis_name, "Tower 2 basin");
        assert_eq!(created.lsi, Some(0.04));
        assert_eq!(created.psi_status.as_deref(), Some("Water has a tendency to corrode"));
        assert_eq!(
            created.lr_status.as_deref(),
            Some("Chlorides and sulfate probably will not interfere with natural film formation")
        );
        assert_eq!(created.stability_score, Some(48.0));
        assert_eq!(created.overall_status.as_deref(), Some("Moderate"));

        let recommendations = created.recommendations.unwrap();
        let titles: Vec<_> = recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Address corrosion tendency"));
        assert!(recommendations.iter().all(|r| r.id.is_some()));

        let fetched: WaterAnalysisResponse = server
            .get(&format!("/api/water-analysis/{}/", created.id))
            .add_header(USER_HEADER, &operator.email)
            .await
            .json();
        assert_eq!(fetched.recommendations.unwrap().len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_validation(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let operator = create_test_user(&pool, Role::Operator).await;

        let mut body = cooling_body();
        body.as_object_mut().unwrap().remove("total_alkalinity");
        server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &operator.email)
            .json(&body)
            .await
            .assert_status_bad_request();

        let mut body = cooling_body();
        body["tds"] = json!(-5);
        server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &operator.email)
            .json(&body)
            .await
            .assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_boiler_analysis_has_no_indices(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let operator = create_test_user(&pool, Role::Operator).await;

        let created: WaterAnalysisResponse = server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &operator.email)
            .json(&json!({
                "analysis_type": "boiler",
                "ph": 11.0,
                "tds": 3000,
                "hardness": 1,
                "m_alkalinity": 400
            }))
            .await
            .json();
        assert_eq!(created.analysis_name, "Water Analysis");
        assert!(created.lsi.is_none());
        assert_eq!(created.stability_score, Some(100.0));
        assert_eq!(created.overall_status.as_deref(), Some("Stable"));
        assert!(created.recommendations.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_replace_recomputes(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let operator = create_test_user(&pool, Role::Operator).await;

        let created: WaterAnalysisResponse = server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &operator.email)
            .json(&cooling_body())
            .await
            .json();

        let replaced: WaterAnalysisResponse = server
            .put(&format!("/api/water-analysis/{}/", created.id))
            .add_header(USER_HEADER, &operator.email)
            .json(&json!({
                "analysis_name": "Tower 2 basin",
                "ph": 7.2,
                "tds": 200,
                "total_alkalinity": 5,
                "hardness": 2500,
                "chloride": 0.5,
                "sulphate": 1,
                "temperature": 70
            }))
            .await
            .json();
        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.overall_status.as_deref(), Some("Stable"));
        assert_eq!(replaced.stability_score, Some(100.0));
        assert!(replaced.recommendations.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_ownership_rules(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let owner = create_test_user(&pool, Role::Operator).await;
        let other = create_test_user(&pool, Role::Operator).await;
        let manager = create_test_user(&pool, Role::Manager).await;
        let viewer = create_test_user(&pool, Role::Viewer).await;

        let created: WaterAnalysisResponse = server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &owner.email)
            .json(&cooling_body())
            .await
            .json();
        let path = format!("/api/water-analysis/{}/", created.id);

        // Other operators cannot see it at all
        server
            .get(&path)
            .add_header(USER_HEADER, &other.email)
            .await
            .assert_status_not_found();
        server
            .delete(&path)
            .add_header(USER_HEADER, &other.email)
            .await
            .assert_status_not_found();

        // Managers read it but cannot change it
        server.get(&path).add_header(USER_HEADER, &manager.email).await.assert_status_ok();
        server
            .put(&path)
            .add_header(USER_HEADER, &manager.email)
            .json(&cooling_body())
            .await
            .assert_status_forbidden();

        // Viewers cannot create
        server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &viewer.email)
            .json(&cooling_body())
            .await
            .assert_status_forbidden();

        // Listing another user's analyses needs ReadAll
        server
            .get("/api/water-analysis/")
            .add_query_param("user_id", owner.id)
            .add_header(USER_HEADER, &other.email)
            .await
            .assert_status_forbidden();
        let listed: PaginatedResponse<WaterAnalysisResponse> = server
            .get("/api/water-analysis/")
            .add_query_param("user_id", owner.id)
            .add_header(USER_HEADER, &manager.email)
            .await
            .json();
        assert_eq!(listed.total_count, 1);

        server
            .delete(&path)
            .add_header(USER_HEADER, &owner.email)
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);
        server
            .get(&path)
            .add_header(USER_HEADER, &owner.email)
            .await
            .assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_paginates_own_analyses(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let operator = create_test_user(&pool, Role::Operator).await;
        let other = create_test_user(&pool, Role::Operator).await;

        for _ in 0..3 {
            server
                .post("/api/water-analysis/")
                .add_header(USER_HEADER, &operator.email)
                .json(&cooling_body())
                .await
                .assert_status(axum::http::StatusCode::CREATED);
        }
        server
            .post("/api/water-analysis/")
            .add_header(USER_HEADER, &other.email)
            .json(&cooling_body())
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let page: PaginatedResponse<WaterAnalysisResponse> = server
            .get("/api/water-analysis/")
            .add_query_param("limit", 2)
            .add_header(USER_HEADER, &operator.email)
            .await
            .json();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|a| a.user_id == operator.id));
        assert!(page.data.iter().all(|a| a.recommendations.is_none()));

        server
            .get("/api/water-analysis/")
            .await
            .assert_status_unauthorized();
    }
}
