//! # aquactl: water stability analysis service
//!
//! `aquactl` computes scaling and corrosion indices for cooling water and keeps a history of
//! analyses per user. From a handful of measurements (pH, TDS, total alkalinity, calcium
//! hardness, chloride, sulphate and temperature) it derives:
//!
//! - the Langelier Saturation Index (LSI) and Ryznar Stability Index (RSI)
//! - the Puckorius Scaling Index (PSI)
//! - the Larson-Skold index (LS) and the Langelier ratio (LR)
//!
//! Each index gets a status, the statuses are folded into a 0-100 stability score and an overall
//! verdict, and rule-based treatment recommendations are attached.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); persistence is PostgreSQL through
//! `sqlx`, either external or embedded (with the `embedded-db` feature).
//!
//! The **chemistry core** ([`chemistry`]) is pure and synchronous: validation, carbonate
//! equilibria, indices, statuses, scoring and recommendation rules. Handlers call it directly.
//!
//! The **API layer** ([`api`]) exposes a stateless calculator and authenticated resources for
//! stored analyses, recommendations, trends and users. See [`api`] for the route table.
//!
//! The **authentication layer** ([`auth`]) trusts an SSO proxy to put the caller's email in a
//! header, creates unknown users on first sight, and checks role permissions per handler.
//!
//! The **database layer** ([`db`]) uses one repository per table over a `&mut PgConnection`, so
//! handlers decide transaction boundaries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use aquactl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = aquactl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     aquactl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! Migrations run on startup; they can also be applied by hand:
//!
//! ```no_run
//! # async fn example(pool: sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! aquactl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod chemistry;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    config::{CorsOrigin, DatabaseConfig},
    db::handlers::Users,
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::{get, patch, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AnalysisId, RecommendationId, UserId};

/// Shared state handed to every handler.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Make sure the configured admin account exists and holds the admin role.
///
/// Safe to call on every startup.
#[instrument(skip(db))]
pub async fn create_initial_admin_user(email: &str, db: &PgPool) -> db::errors::Result<UserId> {
    let mut conn = db.acquire().await?;
    let admin = Users::new(&mut conn).ensure_with_role(email, Role::Admin).await?;
    Ok(admin.id)
}

fn pool_options(config: &Config) -> PgPoolOptions {
    let settings = config.database.pool();
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout((settings.idle_timeout_secs > 0).then(|| Duration::from_secs(settings.idle_timeout_secs)))
}

/// Start or connect to the database and run migrations.
async fn setup_database(config: &Config) -> anyhow::Result<(Option<db::embedded::EmbeddedDatabase>, PgPool)> {
    let (embedded_db, database_url) = match &config.database {
        DatabaseConfig::Embedded { data_dir, persistent, .. } => {
            info!(persistent, "starting embedded database");
            if !persistent {
                info!("embedded database is ephemeral; analyses will be lost on shutdown");
            }
            #[cfg(feature = "embedded-db")]
            {
                let embedded_db = db::embedded::EmbeddedDatabase::start(data_dir.clone(), *persistent).await?;
                let url = embedded_db.connection_string().to_string();
                (Some(embedded_db), url)
            }
            #[cfg(not(feature = "embedded-db"))]
            {
                let _ = data_dir;
                anyhow::bail!(
                    "database.type is embedded but aquactl was built without the embedded-db feature"
                );
            }
        }
        DatabaseConfig::External { url, .. } => {
            info!("using external database");
            (None, url.clone())
        }
    };

    let pool = pool_options(config).connect(&database_url).await?;
    migrator().run(&pool).await?;

    Ok((embedded_db, pool))
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.security.cors;
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::with_capacity(cors_config.allowed_origins.len());
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the router: the `/api` routes, health check, OpenAPI document and docs UI, plus
/// metrics when enabled. CORS and request tracing wrap everything.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{calculations, users, water_analyses, water_recommendations, water_trends};

    let api_routes = Router::new()
        // Stateless calculator
        .route(
            "/calculate-water-analysis-with-recommendations/",
            post(calculations::calculate_with_recommendations),
        )
        .route("/calculate-water-analysis/", post(calculations::calculate))
        // Stored analyses
        .route(
            "/water-analysis/",
            get(water_analyses::list_analyses).post(water_analyses::create_analysis),
        )
        .route(
            "/water-analysis/{id}/",
            get(water_analyses::get_analysis)
                .put(water_analyses::replace_analysis)
                .delete(water_analyses::delete_analysis),
        )
        // Recommendations and trends
        .route("/water-recommendations/", get(water_recommendations::list_recommendations))
        .route(
            "/water-recommendations/{id}/",
            patch(water_recommendations::update_recommendation),
        )
        .route("/water-trends/", get(water_trends::get_trends))
        // Users
        .route("/auth/profile/", get(users::get_profile))
        .route("/admin/users/", get(users::list_users))
        .route("/admin/users/{id}/", patch(users::update_user))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()));

    let mut router = router.layer(create_cors_layer(&state.config)?);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    Ok(router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    ))
}

/// The assembled service.
///
/// [`Application::new`] connects to (or starts) the database, runs migrations, makes sure the
/// admin account exists and builds the router. [`Application::serve`] binds the listener and runs
/// until the shutdown future resolves, then releases the pool, telemetry and embedded database.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    embedded_db: Option<db::embedded::EmbeddedDatabase>,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Build the application on an existing pool. Migrations are assumed to have been applied.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting aquactl with configuration: {:#?}", config);

        let (embedded_db, pool) = match pool {
            Some(pool) => (None, pool),
            None => setup_database(&config).await?,
        };

        create_initial_admin_user(&config.admin_email, &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            pool,
            embedded_db,
        })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(address = %bind_addr, "aquactl listening");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("shutting down");
        self.pool.close().await;
        telemetry::shutdown_telemetry();

        if let Some(embedded_db) = self.embedded_db {
            embedded_db.stop().await?;
            info!("embedded database stopped");
        }

        Ok(())
    }
}
