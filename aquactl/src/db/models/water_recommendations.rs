//! Database models for stored recommendations.

use crate::chemistry::{Priority, RecommendationKind};
use crate::types::{AnalysisId, RecommendationId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct RecommendationDBResponse {
    pub id: RecommendationId,
    pub analysis_id: AnalysisId,
    pub recommendation_type: RecommendationKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub is_implemented: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored recommendation joined with the owner of its analysis.
#[derive(Debug, Clone, FromRow)]
pub struct OwnedRecommendation {
    #[sqlx(flatten)]
    pub recommendation: RecommendationDBResponse,
    pub user_id: UserId,
}
