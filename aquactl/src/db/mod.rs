//! Database layer for data persistence and access.
//!
//! Data access uses SQLx with PostgreSQL behind the Repository pattern:
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//! - [`embedded`]: Embedded PostgreSQL database support (optional feature)
//!
//! # Transactions
//!
//! Writes that touch an analysis and its recommendations go through a single transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let analysis = WaterAnalyses::new(&mut tx).create(&request).await?;
//! WaterRecommendations::new(&mut tx).replace_for_analysis(analysis.id, &recommendations).await?;
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations live in `migrations/` and run on startup through [`crate::migrator`].

pub mod embedded;
pub mod errors;
pub mod handlers;
pub mod models;
