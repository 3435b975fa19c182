use super::{EmployeeStore, StoreResult};
use crate::models::{DepartmentSummary, Employee, EmployeePage, NewEmployee};
use crate::query::EmployeeQuery;
use rocket_db_pools::sqlx::{self, PgPool, Postgres, QueryBuilder};
use std::collections::BTreeMap;

const EMPLOYEE_COLUMNS: &str = "id, name, email, phone, department, salary";

/// Postgres-backed store over the `employees` table.
#[derive(Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[rocket::async_trait]
impl EmployeeStore for PgEmployeeStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, record: &NewEmployee) -> StoreResult<Employee> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"INSERT INTO employees (name, email, phone, department, salary)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {EMPLOYEE_COLUMNS}"#
        ))
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.department)
        .bind(record.salary)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn replace(&self, id: i32, record: &NewEmployee) -> StoreResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"UPDATE employees
               SET name = $1, email = $2, phone = $3, department = $4, salary = $5
               WHERE id = $6
               RETURNING {EMPLOYEE_COLUMNS}"#
        ))
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.department)
        .bind(record.salary)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(&self, query: &EmployeeQuery) -> StoreResult<EmployeePage> {
        let mut rows: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {EMPLOYEE_COLUMNS} FROM employees"));
        query.push_filters(&mut rows);
        query.push_order_and_window(&mut rows);
        let employees = rows
            .build_query_as::<Employee>()
            .fetch_all(&self.pool)
            .await?;

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM employees");
        query.push_filters(&mut count);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut grouped: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT department, COUNT(*) FROM employees");
        query.push_filters(&mut grouped);
        grouped.push(" GROUP BY department");
        let by_department: BTreeMap<String, i64> = grouped
            .build_query_as::<(String, i64)>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();

        Ok(EmployeePage {
            employees,
            total,
            by_department,
        })
    }

    async fn department_summaries(&self) -> StoreResult<Vec<DepartmentSummary>> {
        let summaries = sqlx::query_as::<_, DepartmentSummary>(
            r#"
            SELECT
                department,
                COUNT(*) AS count,
                SUM(salary) AS total_salary,
                ROUND(AVG(salary)::numeric)::double precision AS average_salary,
                MAX(salary) AS max_salary
            FROM employees
            GROUP BY department
            ORDER BY department ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }
}
