//! Database repository for water analyses.

use crate::api::models::water_analyses::AnalysisType;
use crate::chemistry::trends::TrendParameter;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::water_analyses::{TrendRow, WaterAnalysisDBRequest, WaterAnalysisDBResponse},
};
use crate::types::{AnalysisId, UserId, abbrev_uuid};
use chrono::NaiveDate;
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing analyses
#[derive(Debug, Clone)]
pub struct AnalysisFilter {
    pub skip: i64,
    pub limit: i64,
    /// Only analyses owned by this user; `None` lists everyone's
    pub user_id: Option<UserId>,
    pub analysis_type: Option<AnalysisType>,
}

impl AnalysisFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            user_id: None,
            analysis_type: None,
        }
    }

    pub fn for_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn of_type(mut self, analysis_type: Option<AnalysisType>) -> Self {
        self.analysis_type = analysis_type;
        self
    }
}

pub struct WaterAnalyses<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for WaterAnalyses<'c> {
    type CreateRequest = WaterAnalysisDBRequest;
    type UpdateRequest = WaterAnalysisDBRequest;
    type Response = WaterAnalysisDBResponse;
    type Id = AnalysisId;
    type Filter = AnalysisFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let m = &request.measurements;
        let c = &request.computed;
        let analysis = sqlx::query_as::<_, WaterAnalysisDBResponse>(
            r#"
            INSERT INTO water_analyses (
                user_id, analysis_name, analysis_type, analysis_date,
                ph, tds, hardness, total_alkalinity, chloride, temperature, basin_temperature, sulphate, m_alkalinity,
                lsi, rsi, ls, psi, lr, stability_score,
                lsi_status, rsi_status, ls_status, psi_status, lr_status, overall_status,
                notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.analysis_name)
        .bind(request.analysis_type)
        .bind(request.analysis_date)
        .bind(m.ph)
        .bind(m.tds)
        .bind(m.hardness)
        .bind(m.total_alkalinity)
        .bind(m.chloride)
        .bind(m.temperature)
        .bind(m.basin_temperature)
        .bind(m.sulphate)
        .bind(m.m_alkalinity)
        .bind(c.lsi)
        .bind(c.rsi)
        .bind(c.ls)
        .bind(c.psi)
        .bind(c.lr)
        .bind(c.stability_score)
        .bind(&c.lsi_status)
        .bind(&c.rsi_status)
        .bind(&c.ls_status)
        .bind(&c.psi_status)
        .bind(&c.lr_status)
        .bind(&c.overall_status)
        .bind(&request.notes)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(analysis)
    }

    #[instrument(skip(self), fields(analysis_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let analysis = sqlx::query_as::<_, WaterAnalysisDBResponse>("SELECT * FROM water_analyses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(analysis)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<AnalysisId>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let analyses = sqlx::query_as::<_, WaterAnalysisDBResponse>("SELECT * FROM water_analyses WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(analyses.into_iter().map(|a| (a.id, a)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let analyses = sqlx::query_as::<_, WaterAnalysisDBResponse>(
            r#"
            SELECT * FROM water_analyses
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::analysis_type IS NULL OR analysis_type = $2)
            ORDER BY analysis_date DESC, created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.analysis_type)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(analyses)
    }

    #[instrument(skip(self), fields(analysis_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM water_analyses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace every measured and computed column. The owner never changes.
    #[instrument(skip(self, request), fields(analysis_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let m = &request.measurements;
        let c = &request.computed;
        let analysis = sqlx::query_as::<_, WaterAnalysisDBResponse>(
            r#"
            UPDATE water_analyses SET
                analysis_name = $2, analysis_type = $3, analysis_date = $4,
                ph = $5, tds = $6, hardness = $7, total_alkalinity = $8, chloride = $9,
                temperature = $10, basin_temperature = $11, sulphate = $12, m_alkalinity = $13,
                lsi = $14, rsi = $15, ls = $16, psi = $17, lr = $18, stability_score = $19,
                lsi_status = $20, rsi_status = $21, ls_status = $22, psi_status = $23, lr_status = $24,
                overall_status = $25, notes = $26,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.analysis_name)
        .bind(request.analysis_type)
        .bind(request.analysis_date)
        .bind(m.ph)
        .bind(m.tds)
        .bind(m.hardness)
        .bind(m.total_alkalinity)
        .bind(m.chloride)
        .bind(m.temperature)
        .bind(m.basin_temperature)
        .bind(m.sulphate)
        .bind(m.m_alkalinity)
        .bind(c.lsi)
        .bind(c.rsi)
        .bind(c.ls)
        .bind(c.psi)
        .bind(c.lr)
        .bind(c.stability_score)
        .bind(&c.lsi_status)
        .bind(&c.rsi_status)
        .bind(&c.ls_status)
        .bind(&c.psi_status)
        .bind(&c.lr_status)
        .bind(&c.overall_status)
        .bind(&request.notes)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(analysis)
    }
}

impl<'c> WaterAnalyses<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &AnalysisFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM water_analyses
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::analysis_type IS NULL OR analysis_type = $2)
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.analysis_type)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }

    /// Most recently created analysis of a user.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn latest_for_user(&mut self, user_id: UserId) -> Result<Option<WaterAnalysisDBResponse>> {
        let analysis = sqlx::query_as::<_, WaterAnalysisDBResponse>(
            "SELECT * FROM water_analyses WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(analysis)
    }

    /// Non-null values of one column dated on or after `since`, oldest first.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn trend_points(
        &mut self,
        user_id: UserId,
        parameter: TrendParameter,
        since: NaiveDate,
    ) -> Result<Vec<TrendRow>> {
        let column = parameter.column();
        let rows = sqlx::query_as::<_, TrendRow>(&format!(
            r#"
            SELECT analysis_date, {column} AS value FROM water_analyses
            WHERE user_id = $1 AND analysis_date >= $2 AND {column} IS NOT NULL
            ORDER BY analysis_date ASC, created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(since)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }
}
