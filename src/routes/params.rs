//! Query-string parameters for the employee listing.
//!
//! Every field is taken as raw text so that a malformed value never turns into
//! a request error; [`ListParams::to_query`] applies the documented defaults
//! instead.

use crate::query::{
    DEFAULT_LIMIT, DEFAULT_PAGE, EmployeeQuery, SortField, SortOrder, positive_or,
};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, rocket::form::FromForm)]
pub struct ListParams {
    /// Case-insensitive substring matched against name or email.
    pub search: Option<String>,
    /// Exact department filter.
    pub department: Option<String>,
    /// One-based page index (default 1).
    pub page: Option<String>,
    /// Rows per page (default 10).
    pub limit: Option<String>,
    /// `id`, `name`, `email`, `phone`, `department` or `salary` (default `name`).
    pub sort: Option<String>,
    /// `asc` or `desc` (default `asc`).
    pub order: Option<String>,
}

impl ListParams {
    pub fn to_query(&self, max_limit: i64) -> EmployeeQuery {
        EmployeeQuery::default()
            .search(self.search.as_deref())
            .department(self.department.as_deref())
            .page(positive_or(self.page.as_deref(), DEFAULT_PAGE))
            .limit(positive_or(self.limit.as_deref(), DEFAULT_LIMIT), max_limit)
            .sort(
                SortField::from_param(self.sort.as_deref()),
                SortOrder::from_param(self.order.as_deref()),
            )
    }
}
