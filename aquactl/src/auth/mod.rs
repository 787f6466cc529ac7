//! Authentication and authorization.
//!
//! Requests are authenticated by a trusted upstream proxy (for example oauth2-proxy) which sets
//! a header carrying the user's email, `x-aquactl-user` by default. The service never sees
//! passwords or tokens.
//!
//! Authorization is role based. Every user holds exactly one [`Role`](crate::api::models::users::Role),
//! and each role extends the one below it:
//!
//! | role | may |
//! |---|---|
//! | viewer | read own analyses, trends and recommendations |
//! | operator | also create, replace and delete own analyses, mark own recommendations implemented |
//! | manager | also read everyone's analyses, trends and recommendations |
//! | admin | everything, including user management |
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use aquactl::auth::permissions::{RequiresPermission, operation, resource};
//!
//! async fn create(
//!     State(state): State<AppState>,
//!     perm: RequiresPermission<resource::Analyses, operation::CreateOwn>,
//!     Json(body): Json<WaterAnalysisRequest>,
//! ) -> Result<Json<WaterAnalysisResponse>> {
//!     let user = perm.user;
//!     // ...
//! }
//! ```
//!
//! # Modules
//!
//! - [`current_user`]: `CurrentUser` extractor
//! - [`permissions`]: role matrix and the `RequiresPermission` extractor

pub mod current_user;
pub mod permissions;
