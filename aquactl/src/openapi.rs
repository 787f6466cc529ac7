//! OpenAPI document for everything under `/api`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;
use crate::api::models::{
    calculations::{CalculationResponse, CalculationWithRecommendationsResponse, WaterSampleRequest},
    recommendations::{RecommendationResponse, RecommendationSource, RecommendationUpdate},
    trends::TrendPoint,
    users::{Role, UserResponse, UserUpdate},
    water_analyses::{AnalysisType, WaterAnalysisRequest, WaterAnalysisResponse},
};
use crate::chemistry::{Priority, RecommendationKind, trends::TrendParameter};

/// Registers the trusted proxy header as the only security scheme.
struct ProxyHeaderAddon;

impl Modify for ProxyHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "X-Aquactl-User".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-aquactl-user",
                    "Email of the authenticated user, set by the SSO proxy in front of the service. \
                    The header name is configurable through `auth.proxy_header.header_name`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "aquactl",
        description = "Water stability analysis: Langelier, Ryznar, Larson-Skold and Puckorius indices, \
            the Langelier ratio, stored analyses and treatment recommendations."
    ),
    servers((url = "/api")),
    paths(
        api::handlers::calculations::calculate_with_recommendations,
        api::handlers::calculations::calculate,
        api::handlers::water_analyses::list_analyses,
        api::handlers::water_analyses::create_analysis,
        api::handlers::water_analyses::get_analysis,
        api::handlers::water_analyses::replace_analysis,
        api::handlers::water_analyses::delete_analysis,
        api::handlers::water_recommendations::list_recommendations,
        api::handlers::water_recommendations::update_recommendation,
        api::handlers::water_trends::get_trends,
        api::handlers::users::get_profile,
        api::handlers::users::list_users,
        api::handlers::users::update_user,
    ),
    components(schemas(
        WaterSampleRequest,
        CalculationResponse,
        CalculationWithRecommendationsResponse,
        AnalysisType,
        WaterAnalysisRequest,
        WaterAnalysisResponse,
        RecommendationKind,
        Priority,
        RecommendationSource,
        RecommendationResponse,
        RecommendationUpdate,
        TrendParameter,
        TrendPoint,
        Role,
        UserResponse,
        UserUpdate,
    )),
    modifiers(&ProxyHeaderAddon),
    tags(
        (name = "calculations", description = "Stateless index calculation"),
        (name = "water_analyses", description = "Stored water analyses"),
        (name = "water_recommendations", description = "Stored and live treatment recommendations"),
        (name = "water_trends", description = "Analysis values over time"),
        (name = "users", description = "Profile and user administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/calculate-water-analysis-with-recommendations/",
            "/calculate-water-analysis/",
            "/water-analysis/",
            "/water-analysis/{id}/",
            "/water-recommendations/",
            "/water-recommendations/{id}/",
            "/water-trends/",
            "/auth/profile/",
            "/admin/users/",
            "/admin/users/{id}/",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("X-Aquactl-User"));
        assert!(components.schemas.contains_key("WaterAnalysisResponse"));
    }

    #[test]
    fn user_filters_are_documented_as_uuids() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        for path in ["/water-analysis/", "/water-recommendations/", "/water-trends/"] {
            let parameters = doc["paths"][path]["get"]["parameters"].as_array().expect(path);
            let user_id = parameters
                .iter()
                .find(|p| p["name"] == "user_id")
                .unwrap_or_else(|| panic!("{path} has no user_id parameter"));
            assert_eq!(user_id["schema"]["format"], "uuid", "{path}");
            assert!(user_id["schema"]["type"].to_string().contains("string"), "{path}");
        }
    }
}
