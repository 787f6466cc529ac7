//! API request and response data models.
//!
//! API models are kept separate from the database models in [`crate::db::models`] so the wire
//! format and the storage layout can change independently. All of them carry `utoipa`
//! annotations for the OpenAPI document.
//!
//! - [`calculations`]: stateless index calculation bodies
//! - [`water_analyses`]: stored analyses
//! - [`recommendations`]: the recommendation feed
//! - [`trends`]: trend series points
//! - [`users`]: user profiles and roles
//! - [`pagination`]: shared `skip`/`limit` parameters

pub mod calculations;
pub mod pagination;
pub mod recommendations;
pub mod trends;
pub mod users;
pub mod water_analyses;
