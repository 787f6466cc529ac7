//! `skip`/`limit` paging shared by the list endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Requested page. Query strings carry numbers as text, so both fields accept either form.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// Rows to skip before the page starts
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,

    /// Page size, clamped to 1..=100
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn skip(&self) -> i64 {
        self.skip.map_or(0, |skip| skip.max(0))
    }

    pub fn limit(&self) -> i64 {
        self.limit.map_or(DEFAULT_LIMIT, |limit| limit.clamp(1, MAX_LIMIT))
    }
}

/// One page of a list endpoint, with the unpaged total.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    pub data: Vec<T>,
    /// Rows matching the filter across all pages
    pub total_count: i64,
    pub skip: i64,
    pub limit: i64,
}

impl<T: ToSchema> PaginatedResponse<T> {
    /// Wrap `data` as the page described by `pagination`.
    pub fn page(data: Vec<T>, total_count: i64, pagination: &Pagination) -> Self {
        Self {
            data,
            total_count,
            skip: pagination.skip(),
            limit: pagination.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(skip: Option<i64>, limit: Option<i64>) -> Pagination {
        Pagination { skip, limit }
    }

    #[test]
    fn unset_fields_fall_back_to_defaults() {
        let p = Pagination::default();
        assert_eq!((p.skip(), p.limit()), (0, DEFAULT_LIMIT));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(page(None, Some(0)).limit(), 1);
        assert_eq!(page(None, Some(1000)).limit(), MAX_LIMIT);
        assert_eq!(page(Some(-10), Some(50)).skip(), 0);
    }

    #[test]
    fn numbers_parse_from_query_strings() {
        let p: Pagination = serde_json::from_value(serde_json::json!({ "skip": "20", "limit": "5" })).unwrap();
        let response = PaginatedResponse::<String>::page(vec![], 42, &p);
        assert_eq!((response.skip, response.limit, response.total_count), (20, 5, 42));
    }
}
