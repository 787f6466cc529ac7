//! Helpers for handler and repository tests.

use crate::{
    AppState, Application,
    api::models::users::Role,
    config::{Config, DatabaseConfig, PoolSettings},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
};
use axum_test::TestServer;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

/// Default name of the trusted proxy header.
pub const USER_HEADER: &str = "x-aquactl-user";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        database: DatabaseConfig::External {
            // Tests hand a pool to the application, so this is never dialled
            url: "postgres://localhost:5432/aquactl_test".to_string(),
            pool: PoolSettings {
                max_connections: 2,
                ..Default::default()
            },
        },
        admin_email: "admin@aquactl.test".to_string(),
        enable_metrics: false,
        enable_otel_export: false,
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool, config: Config) -> AppState {
    AppState::builder().db(pool).config(config).build()
}

/// Full application on a pool prepared by `#[sqlx::test]`.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    Application::new_with_pool(create_test_config(), Some(pool))
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// Router over a pool that never connects, for routes that do not touch the database.
pub fn create_lazy_test_server() -> TestServer {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:5432/aquactl_unused")
        .expect("Failed to create lazy pool");
    let state = create_test_state(pool, create_test_config());
    let router = crate::build_router(&state).expect("Failed to build router");
    TestServer::new(router.into_make_service()).expect("Failed to create test server")
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let email = format!("testuser_{}@example.com", Uuid::new_v4().simple());

    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email,
            display_name: Some("Test User".to_string()),
            role,
            auth_source: "test".to_string(),
        })
        .await
        .expect("Failed to create test user")
}
