//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! Everything lives under `/api` and every path ends in a slash:
//!
//! - **Calculations** (`/api/calculate-water-analysis*/`): stateless index calculation, no auth
//! - **Water analyses** (`/api/water-analysis/`): stored analyses, recomputed on every write
//! - **Recommendations** (`/api/water-recommendations/`): stored and live recommendations
//! - **Trends** (`/api/water-trends/`): one analysis column over time
//! - **Users** (`/api/auth/profile/`, `/api/admin/users/`): profile and user administration
//!
//! The OpenAPI document is served at `/api/openapi.json` with a Scalar UI at `/api/docs`.

pub mod handlers;
pub mod models;
