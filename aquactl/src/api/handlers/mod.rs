//! HTTP request handlers, organized by resource.
//!
//! - [`calculations`]: stateless index calculation
//! - [`water_analyses`]: stored analysis CRUD
//! - [`water_recommendations`]: the recommendation feed
//! - [`water_trends`]: trend series
//! - [`users`]: profile and user administration
//!
//! # Authentication
//!
//! Everything except the calculation endpoints needs an authenticated caller, resolved from the
//! trusted proxy header by the [`crate::api::models::users::CurrentUser`] extractor. Handlers
//! check roles through [`crate::auth::permissions::RequiresPermission`].

pub mod calculations;
pub mod users;
pub mod water_analyses;
pub mod water_recommendations;
pub mod water_trends;
