//! Filter, sort and pagination over the employee table.
//!
//! [`EmployeeQuery`] is the normalized form of the list endpoint's query
//! string. It can render itself into a parameterized Postgres statement or be
//! evaluated directly over rows held in memory; both paths share the same
//! matching and ordering rules so every store backend answers identically.

use crate::models::{Employee, EmployeePage};
use rocket_db_pools::sqlx::{Postgres, QueryBuilder};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_MAX_LIMIT: i64 = 10_000;

/// Columns the listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    #[default]
    Name,
    Email,
    Phone,
    Department,
    Salary,
}

impl SortField {
    /// Unknown or empty values fall back to ordering by name.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("id") => SortField::Id,
            Some("email") => SortField::Email,
            Some("phone") => SortField::Phone,
            Some("department") => SortField::Department,
            Some("salary") => SortField::Salary,
            _ => SortField::Name,
        }
    }

    pub fn sql_column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Phone => "phone",
            SortField::Department => "department",
            SortField::Salary => "salary",
        }
    }

    fn is_text(self) -> bool {
        !matches!(self, SortField::Id | SortField::Salary)
    }

    fn text_key(self, employee: &Employee) -> &str {
        match self {
            SortField::Name => &employee.name,
            SortField::Email => &employee.email,
            SortField::Phone => &employee.phone,
            SortField::Department => &employee.department,
            SortField::Id | SortField::Salary => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `desc` (any case) selects descending order.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn sql_keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Parse a positive integer parameter, falling back to `default` when the
/// value is absent, unparseable or below one.
pub fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// A normalized listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub page: i64,
    pub limit: i64,
    pub sort: SortField,
    pub order: SortOrder,
}

impl Default for EmployeeQuery {
    fn default() -> Self {
        Self {
            search: None,
            department: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl EmployeeQuery {
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search = non_empty(term);
        self
    }

    pub fn department(mut self, department: Option<&str>) -> Self {
        self.department = non_empty(department);
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: i64, max_limit: i64) -> Self {
        self.limit = limit.clamp(1, max_limit.max(1));
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = field;
        self.order = order;
        self
    }

    /// Number of matching rows preceding the requested window.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ILIKE` pattern for the search term with wildcard characters escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|term| {
            let mut escaped = String::with_capacity(term.len() + 2);
            escaped.push('%');
            for ch in term.chars() {
                if matches!(ch, '\\' | '%' | '_') {
                    escaped.push('\\');
                }
                escaped.push(ch);
            }
            escaped.push('%');
            escaped
        })
    }

    // ===== SQL rendering =====

    /// Append the `WHERE` clause shared by the row, count and aggregate reads.
    pub fn push_filters(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE TRUE");
        if let Some(pattern) = self.search_pattern() {
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(department) = &self.department {
            builder
                .push(" AND department = ")
                .push_bind(department.clone());
        }
    }

    /// Append `ORDER BY` with the id tie-breaker and the `LIMIT`/`OFFSET` window.
    pub fn push_order_and_window(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let column = self.sort.sql_column();
        let keyword = self.order.sql_keyword();
        builder.push(" ORDER BY ");
        if self.sort.is_text() {
            builder.push(format!("lower({column}) {keyword}, {column} {keyword}, "));
        } else if self.sort != SortField::Id {
            builder.push(format!("{column} {keyword}, "));
        }
        let id_keyword = if self.sort == SortField::Id { keyword } else { "ASC" };
        builder.push(format!("id {id_keyword}"));

        builder
            .push(" LIMIT ")
            .push_bind(self.limit)
            .push(" OFFSET ")
            .push_bind(self.offset());
    }

    // ===== In-memory evaluation =====

    pub fn matches(&self, employee: &Employee) -> bool {
        let search_ok = self.search.as_ref().is_none_or(|term| {
            let needle = term.to_lowercase();
            employee.name.to_lowercase().contains(&needle)
                || employee.email.to_lowercase().contains(&needle)
        });
        let department_ok = self
            .department
            .as_ref()
            .is_none_or(|department| employee.department == *department);
        search_ok && department_ok
    }

    /// Total order matching [`EmployeeQuery::push_order_and_window`].
    pub fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
        let primary = match self.sort {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Salary => a.salary.total_cmp(&b.salary),
            field => {
                let (left, right) = (field.text_key(a), field.text_key(b));
                left.to_lowercase()
                    .cmp(&right.to_lowercase())
                    .then_with(|| left.cmp(right))
            }
        };
        let primary = self.order.apply(primary);
        if self.sort == SortField::Id {
            primary
        } else {
            primary.then_with(|| a.id.cmp(&b.id))
        }
    }

    /// Filter, order and window `rows`, and compute the aggregates over every
    /// match.
    pub fn apply<'a, I>(&self, rows: I) -> EmployeePage
    where
        I: IntoIterator<Item = &'a Employee>,
    {
        let mut matching: Vec<&Employee> = rows.into_iter().filter(|e| self.matches(e)).collect();

        let mut by_department = BTreeMap::new();
        for employee in &matching {
            *by_department.entry(employee.department.clone()).or_insert(0) += 1;
        }
        let total = matching.len() as i64;

        matching.sort_by(|a, b| self.compare(a, b));
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let employees = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        EmployeePage {
            employees,
            total,
            by_department,
        }
    }
}
