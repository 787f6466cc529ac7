//! API models for trend series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::chemistry::round2;
use crate::chemistry::trends::TrendParameter;
use crate::types::UserId;

#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TrendsQuery {
    /// Analysis column to chart, e.g. `ph`, `lsi`, `rsi`, `ls` (default `ph`)
    pub parameter: Option<String>,
    /// Size of the window in days, counted back from today
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub days: Option<i64>,
    /// Another user's series (managers and admins only)
    #[schema(value_type = Option<String>, format = "uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TrendPoint {
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    pub value: f64,
    pub parameter: TrendParameter,
    /// Short label for chart axes, e.g. `Mar 04`
    pub formatted_date: String,
    pub status: String,
}

impl TrendPoint {
    pub fn new(parameter: TrendParameter, date: NaiveDate, value: f64) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            value: round2(value),
            parameter,
            formatted_date: date.format("%b %d").to_string(),
            status: parameter.status(value).to_string(),
        }
    }
}
