use super::{EmployeeStore, StoreError, StoreResult};
use crate::models::{DepartmentSummary, Employee, EmployeePage, NewEmployee};
use crate::query::EmployeeQuery;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, Employee>,
    last_id: i32,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|row| row.email == email && Some(row.id) != except)
    }
}

/// Process-local store used when no database is configured and by tests.
///
/// Ids are assigned from a monotonically increasing counter and never reused,
/// matching a `SERIAL` column.
#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[rocket::async_trait]
impl EmployeeStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: &NewEmployee) -> StoreResult<Employee> {
        let mut table = self.table.write();
        if table.email_taken(&record.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        table.last_id += 1;
        let employee = record.clone().with_id(table.last_id);
        table.rows.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Employee>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn replace(&self, id: i32, record: &NewEmployee) -> StoreResult<Option<Employee>> {
        let mut table = self.table.write();
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if table.email_taken(&record.email, Some(id)) {
            return Err(StoreError::DuplicateEmail);
        }
        let employee = record.clone().with_id(id);
        table.rows.insert(id, employee.clone());
        Ok(Some(employee))
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        Ok(self.table.write().rows.remove(&id).is_some())
    }

    async fn query(&self, query: &EmployeeQuery) -> StoreResult<EmployeePage> {
        let table = self.table.read();
        Ok(query.apply(table.rows.values()))
    }

    async fn department_summaries(&self) -> StoreResult<Vec<DepartmentSummary>> {
        let table = self.table.read();
        let mut grouped: BTreeMap<&str, (i64, f64, f64)> = BTreeMap::new();
        for row in table.rows.values() {
            let entry = grouped.entry(row.department.as_str()).or_insert((0, 0.0, 0.0));
            entry.0 += 1;
            entry.1 += row.salary;
            entry.2 = entry.2.max(row.salary);
        }

        Ok(grouped
            .into_iter()
            .map(|(department, (count, total, max))| DepartmentSummary {
                department: department.to_string(),
                count,
                total_salary: total,
                average_salary: (total / count as f64).round(),
                max_salary: max,
            })
            .collect())
    }
}
