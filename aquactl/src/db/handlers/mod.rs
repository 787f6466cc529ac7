//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection`, which can be a pooled connection or an open
//! transaction:
//!
//! ```ignore
//! use aquactl::db::handlers::{Repository, WaterAnalyses};
//!
//! let mut tx = pool.begin().await?;
//! let mut analyses = WaterAnalyses::new(&mut tx);
//! let analysis = analyses.create(&request).await?;
//! tx.commit().await?;
//! ```
//!
//! - [`Users`]: user accounts
//! - [`WaterAnalyses`]: stored analyses, latest readings and trend series
//! - [`WaterRecommendations`]: recommendations attached to analyses

pub mod repository;
pub mod users;
pub mod water_analyses;
pub mod water_recommendations;

pub use repository::Repository;
pub use users::Users;
pub use water_analyses::WaterAnalyses;
pub use water_recommendations::WaterRecommendations;
