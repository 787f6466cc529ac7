//! Database record models matching table schemas.
//!
//! Models derive `sqlx::FromRow` and are converted into the API models in
//! [`crate::api::models`] with `From` impls, so storage and wire formats can evolve separately.
//!
//! - [`users`]: user accounts and roles
//! - [`water_analyses`]: measurements with their computed indices and statuses
//! - [`water_recommendations`]: recommendations stored with an analysis

pub mod users;
pub mod water_analyses;
pub mod water_recommendations;
