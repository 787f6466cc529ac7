//! Common type definitions and permission system types.
//!
//! # Permission System
//!
//! - [`Resource`]: what entity type is being accessed
//! - [`Operation`]: what action is being performed. `*All` operations are unrestricted, `*Own`
//!   operations are limited to the caller's own records.
//! - [`Permission`]: the pair, as reported when a check fails

use std::fmt;
use uuid::Uuid;

pub type UserId = Uuid;
pub type AnalysisId = Uuid;
pub type RecommendationId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAll,
    CreateOwn,
    ReadAll,
    ReadOwn,
    UpdateAll,
    UpdateOwn,
    DeleteAll,
    DeleteOwn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Analyses,
    Recommendations,
    Trends,
}

/// A single grant: `operation` on `resource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission(pub Resource, pub Operation);

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateAll | Operation::CreateOwn => write!(f, "Create"),
            Operation::ReadAll | Operation::ReadOwn => write!(f, "Read"),
            Operation::UpdateAll | Operation::UpdateOwn => write!(f, "Update"),
            Operation::DeleteAll | Operation::DeleteOwn => write!(f, "Delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Users => write!(f, "users"),
            Resource::Analyses => write!(f, "water analyses"),
            Resource::Recommendations => write!(f, "recommendations"),
            Resource::Trends => write!(f, "trends"),
        }
    }
}
