use employee_directory::models::{Employee, EmployeePage, NewEmployee};
use employee_directory::query::{EmployeeQuery, SortField, SortOrder};
use employee_directory::store::{EmployeeStore, PgEmployeeStore, StoreError};
use employee_directory::test_support::{TestDatabase, TestDatabaseError, TestRocketBuilder};
use rocket::http::{ContentType, Status};
use serde_json::json;
use std::sync::Arc;

fn record(name: &str, email: &str, department: &str, salary: f64) -> NewEmployee {
    NewEmployee {
        name: name.to_string(),
        email: email.to_string(),
        phone: "5551234567".to_string(),
        department: department.to_string(),
        salary,
    }
}

macro_rules! test_database {
    ($label:literal) => {
        match TestDatabase::new_from_env().await {
            Ok(db) => db,
            Err(TestDatabaseError::MissingUrl) => {
                eprintln!(concat!("skipping ", $label, ": TEST_DATABASE_URL not set"));
                return;
            }
            Err(err) => panic!("failed to provision test database: {err:?}"),
        }
    };
}

#[tokio::test]
async fn insert_replace_and_delete_round_trip() {
    let test_db = test_database!("postgres store round trip");
    let store = PgEmployeeStore::new(test_db.pool_clone());

    let ada = store
        .insert(&record("Ada Lovelace", "ada@example.com", "IT", 100.0))
        .await
        .expect("insert succeeds");
    assert!(ada.id > 0);
    assert_eq!(store.find(ada.id).await.expect("find"), Some(ada.clone()));

    let duplicate = store
        .insert(&record("Ada Again", "ada@example.com", "HR", 1.0))
        .await;
    assert!(matches!(duplicate, Err(StoreError::DuplicateEmail)));

    let replaced = store
        .replace(ada.id, &record("Ada King", "ada@example.com", "Finance", 200.0))
        .await
        .expect("replace succeeds")
        .expect("row exists");
    assert_eq!(replaced.name, "Ada King");
    assert_eq!(replaced.department, "Finance");

    assert!(store.delete(ada.id).await.expect("delete"));
    assert!(!store.delete(ada.id).await.expect("second delete"));
    assert_eq!(store.find(ada.id).await.expect("find"), None);
    assert_eq!(
        store
            .replace(ada.id, &record("Gone", "gone@example.com", "IT", 1.0))
            .await
            .expect("replace on missing row"),
        None
    );

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn query_filters_sorts_and_counts_like_memory_store() {
    let test_db = test_database!("postgres store query");
    let store = PgEmployeeStore::new(test_db.pool_clone());

    for (name, email, department, salary) in [
        ("alice", "alice@corp.example", "IT", 300.0),
        ("Bob", "bob@corp.example", "HR", 100.0),
        ("Carol", "carol@corp.example", "IT", 200.0),
        ("Dan 100%", "dan@other.example", "Finance", 150.0),
    ] {
        store
            .insert(&record(name, email, department, salary))
            .await
            .expect("insert succeeds");
    }

    let page: EmployeePage = store
        .query(&EmployeeQuery::default())
        .await
        .expect("query succeeds");
    let names: Vec<&str> = page.employees.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "Bob", "Carol", "Dan 100%"]);
    assert_eq!(page.total, 4);
    assert_eq!(page.by_department["IT"], 2);

    let page = store
        .query(
            &EmployeeQuery::default()
                .search(Some("CORP"))
                .department(Some("IT"))
                .sort(SortField::Salary, SortOrder::Desc),
        )
        .await
        .expect("query succeeds");
    let salaries: Vec<f64> = page.employees.iter().map(|e| e.salary).collect();
    assert_eq!(salaries, vec![300.0, 200.0]);
    assert_eq!(page.total, 2);

    let page = store
        .query(&EmployeeQuery::default().search(Some("100%")))
        .await
        .expect("query succeeds");
    assert_eq!(page.total, 1);
    assert_eq!(page.employees[0].name, "Dan 100%");

    let page = store
        .query(&EmployeeQuery::default().page(2).limit(3, 100))
        .await
        .expect("query succeeds");
    assert_eq!(page.employees.len(), 1);
    assert_eq!(page.total, 4);

    let summaries = store.department_summaries().await.expect("summaries");
    let departments: Vec<&str> = summaries.iter().map(|s| s.department.as_str()).collect();
    assert_eq!(departments, vec!["Finance", "HR", "IT"]);
    let it = &summaries[2];
    assert_eq!(it.count, 2);
    assert_eq!(it.total_salary, 500.0);
    assert_eq!(it.average_salary, 250.0);
    assert_eq!(it.max_salary, 300.0);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn api_over_postgres_maps_duplicates_to_conflict() {
    let test_db = test_database!("postgres api test");
    let store = Arc::new(PgEmployeeStore::new(test_db.pool_clone()));

    let client = TestRocketBuilder::new()
        .with_store(store)
        .async_client()
        .await;

    let body = json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "5551234567",
        "department": "IT",
        "salary": 100
    })
    .to_string();

    let response = client
        .post("/employees")
        .header(ContentType::JSON)
        .body(body.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let created: Employee = response.into_json().await.expect("employee JSON");

    {
        let response = client
            .post("/employees")
            .header(ContentType::JSON)
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Conflict);
    }

    let response = client
        .get(format!("/employees/{}", created.id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    drop(response);
    drop(client);
    test_db.close().await.expect("failed to drop test database");
}
