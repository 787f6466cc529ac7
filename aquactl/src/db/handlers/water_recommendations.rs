//! Database repository for recommendations attached to analyses.

use crate::chemistry::Recommendation;
use crate::db::{
    errors::{DbError, Result},
    models::water_recommendations::{OwnedRecommendation, RecommendationDBResponse},
};
use crate::types::{AnalysisId, RecommendationId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

const RECOMMENDATION_COLUMNS: &str =
    "r.id, r.analysis_id, r.recommendation_type, r.title, r.description, r.priority, r.is_implemented, r.created_at";

pub struct WaterRecommendations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> WaterRecommendations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Drop whatever was stored for an analysis and store `recommendations` in its place.
    ///
    /// Run this inside the same transaction that writes the analysis.
    #[instrument(skip(self, recommendations), fields(analysis_id = %abbrev_uuid(&analysis_id), count = recommendations.len()), err)]
    pub async fn replace_for_analysis(
        &mut self,
        analysis_id: AnalysisId,
        recommendations: &[Recommendation],
    ) -> Result<Vec<RecommendationDBResponse>> {
        sqlx::query("DELETE FROM water_recommendations WHERE analysis_id = $1")
            .bind(analysis_id)
            .execute(&mut *self.db)
            .await?;

        let mut stored = Vec::with_capacity(recommendations.len());
        for recommendation in recommendations {
            let row = sqlx::query_as::<_, RecommendationDBResponse>(
                r#"
                INSERT INTO water_recommendations (analysis_id, recommendation_type, title, description, priority)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, analysis_id, recommendation_type, title, description, priority, is_implemented, created_at
                "#,
            )
            .bind(analysis_id)
            .bind(recommendation.kind)
            .bind(&recommendation.title)
            .bind(&recommendation.description)
            .bind(recommendation.priority)
            .fetch_one(&mut *self.db)
            .await?;
            stored.push(row);
        }

        Ok(stored)
    }

    #[instrument(skip(self), fields(analysis_id = %abbrev_uuid(&analysis_id)), err)]
    pub async fn list_for_analysis(&mut self, analysis_id: AnalysisId) -> Result<Vec<RecommendationDBResponse>> {
        let rows = sqlx::query_as::<_, RecommendationDBResponse>(&format!(
            r#"
            SELECT {RECOMMENDATION_COLUMNS} FROM water_recommendations r
            WHERE r.analysis_id = $1
            ORDER BY r.priority ASC, r.created_at DESC
            "#
        ))
        .bind(analysis_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Stored recommendations across analyses, most urgent first.
    ///
    /// `user_id` of `None` spans every user.
    #[instrument(skip(self), err)]
    pub async fn list_for_user(
        &mut self,
        user_id: Option<UserId>,
        pending_only: bool,
    ) -> Result<Vec<RecommendationDBResponse>> {
        let rows = sqlx::query_as::<_, RecommendationDBResponse>(&format!(
            r#"
            SELECT {RECOMMENDATION_COLUMNS} FROM water_recommendations r
            JOIN water_analyses a ON a.id = r.analysis_id
            WHERE ($1::uuid IS NULL OR a.user_id = $1)
              AND (NOT $2 OR r.is_implemented = FALSE)
            ORDER BY r.priority ASC, r.created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(pending_only)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    #[instrument(skip(self), fields(recommendation_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: RecommendationId) -> Result<Option<OwnedRecommendation>> {
        let row = sqlx::query_as::<_, OwnedRecommendation>(&format!(
            r#"
            SELECT {RECOMMENDATION_COLUMNS}, a.user_id FROM water_recommendations r
            JOIN water_analyses a ON a.id = r.analysis_id
            WHERE r.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), fields(recommendation_id = %abbrev_uuid(&id)), err)]
    pub async fn set_implemented(&mut self, id: RecommendationId, is_implemented: bool) -> Result<RecommendationDBResponse> {
        let row = sqlx::query_as::<_, RecommendationDBResponse>(
            r#"
            UPDATE water_recommendations SET is_implemented = $2
            WHERE id = $1
            RETURNING id, analysis_id, recommendation_type, title, description, priority, is_implemented, created_at
            "#,
        )
        .bind(id)
        .bind(is_implemented)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(row)
    }
}
