//! API models for the recommendation feed.

use crate::chemistry::{Priority, Recommendation, RecommendationKind};
use crate::db::models::water_recommendations::RecommendationDBResponse;
use crate::types::{AnalysisId, RecommendationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Where a feed entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Stored with an analysis when it was created or updated
    Database,
    /// Derived on the fly from the latest analysis
    Dynamic,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationResponse {
    /// Absent for dynamic entries, which cannot be updated
    #[schema(value_type = Option<String>, format = "uuid")]
    pub id: Option<RecommendationId>,
    #[schema(value_type = String, format = "uuid")]
    pub analysis_id: AnalysisId,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub is_implemented: bool,
    pub created_at: DateTime<Utc>,
    pub source: RecommendationSource,
}

impl From<RecommendationDBResponse> for RecommendationResponse {
    fn from(db: RecommendationDBResponse) -> Self {
        Self {
            id: Some(db.id),
            analysis_id: db.analysis_id,
            kind: db.recommendation_type,
            title: db.title,
            description: db.description,
            priority: db.priority,
            is_implemented: db.is_implemented,
            created_at: db.created_at,
            source: RecommendationSource::Database,
        }
    }
}

impl RecommendationResponse {
    /// A live alert derived from an analysis that has not been stored as a recommendation.
    pub fn dynamic(analysis_id: AnalysisId, created_at: DateTime<Utc>, recommendation: Recommendation) -> Self {
        Self {
            id: None,
            analysis_id,
            kind: recommendation.kind,
            title: recommendation.title,
            description: recommendation.description,
            priority: recommendation.priority,
            is_implemented: false,
            created_at,
            source: RecommendationSource::Dynamic,
        }
    }
}

/// Order a feed most urgent first, then newest first.
pub fn sort_feed(feed: &mut [RecommendationResponse]) {
    feed.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| b.created_at.cmp(&a.created_at)));
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationUpdate {
    pub is_implemented: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListRecommendationsQuery {
    /// Leave out recommendations already marked as implemented
    #[serde(default)]
    pub pending_only: bool,
    /// Another user's feed (managers and admins only)
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn entry(priority: Priority, created_at: DateTime<Utc>) -> RecommendationResponse {
        RecommendationResponse::dynamic(
            Uuid::new_v4(),
            created_at,
            Recommendation {
                kind: RecommendationKind::Monitoring,
                priority,
                title: format!("{priority:?}"),
                description: String::new(),
            },
        )
    }

    #[test]
    fn feed_sorts_by_priority_then_recency() {
        let now = Utc::now();
        let mut feed = vec![
            entry(Priority::Low, now),
            entry(Priority::High, now - Duration::days(2)),
            entry(Priority::Medium, now),
            entry(Priority::High, now),
        ];
        sort_feed(&mut feed);

        let order: Vec<_> = feed.iter().map(|r| (r.priority, r.created_at)).collect();
        assert_eq!(
            order,
            vec![
                (Priority::High, now),
                (Priority::High, now - Duration::days(2)),
                (Priority::Medium, now),
                (Priority::Low, now),
            ]
        );
    }

    #[test]
    fn kind_serializes_as_type() {
        let value = serde_json::to_value(entry(Priority::High, Utc::now())).unwrap();
        assert_eq!(value["type"], "monitoring");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["source"], "dynamic");
        assert!(value["id"].is_null());
    }
}
