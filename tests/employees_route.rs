use employee_directory::error::ErrorResponse;
use employee_directory::models::{Employee, EmployeePage, MessageResponse};
use employee_directory::test_support::TestRocketBuilder;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::{Value, json};

fn create(client: &Client, body: Value) -> Employee {
    let response = client
        .post("/employees")
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Created);
    response.into_json().expect("created employee")
}

fn employee_json(name: &str, email: &str, department: &str, salary: f64) -> Value {
    json!({
        "name": name,
        "email": email,
        "phone": "5551234567",
        "department": department,
        "salary": salary
    })
}

fn seed(client: &Client, count: usize) {
    for i in 0..count {
        let department = ["IT", "HR", "Finance"][i % 3];
        create(
            client,
            employee_json(
                &format!("Employee {i:02}"),
                &format!("employee{i:02}@example.com"),
                department,
                1000.0 + i as f64,
            ),
        );
    }
}

#[test]
fn create_returns_normalized_record() {
    let client = TestRocketBuilder::new().blocking_client();

    let response = client
        .post("/employees")
        .header(ContentType::JSON)
        .body(
            json!({
                "name": "  Ada Lovelace  ",
                "email": " ada@example.com",
                "phone": 5551234567u64,
                "department": "IT",
                "salary": "85000"
            })
            .to_string(),
        )
        .dispatch();

    assert_eq!(response.status(), Status::Created);
    let location = response
        .headers()
        .get_one("Location")
        .map(str::to_string)
        .expect("location header");
    let created: Employee = response.into_json().expect("employee JSON");

    assert_eq!(location, format!("/employees/{}", created.id));
    assert_eq!(created.name, "Ada Lovelace");
    assert_eq!(created.email, "ada@example.com");
    assert_eq!(created.phone, "5551234567");
    assert_eq!(created.salary, 85000.0);

    let fetched: Employee = client
        .get(format!("/employees/{}", created.id))
        .dispatch()
        .into_json()
        .expect("employee JSON");
    assert_eq!(fetched, created);
}

#[test]
fn create_reports_specific_validation_message() {
    let client = TestRocketBuilder::new().blocking_client();

    let response = client
        .post("/employees")
        .header(ContentType::JSON)
        .body(employee_json("Bob", "bob@x", "IT", 10.0).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.error, "Invalid email address");
    assert_eq!(body.code, "InvalidEmail");

    let response = client
        .post("/employees")
        .header(ContentType::JSON)
        .body(json!({ "name": "Bob" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.error, "All fields are required");
}

#[test]
fn duplicate_email_is_a_conflict() {
    let client = TestRocketBuilder::new().blocking_client();
    create(&client, employee_json("Ada Lovelace", "ada@example.com", "IT", 1.0));

    let response = client
        .post("/employees")
        .header(ContentType::JSON)
        .body(employee_json("Ada Again", "ada@example.com", "HR", 2.0).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Conflict);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.code, "DuplicateEmail");
}

#[test]
fn malformed_json_body_is_bad_request() {
    let client = TestRocketBuilder::new().blocking_client();
    let response = client
        .post("/employees")
        .header(ContentType::JSON)
        .body("{not json")
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
fn unknown_employee_is_not_found() {
    let client = TestRocketBuilder::new().blocking_client();

    let response = client.get("/employees/42").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.error, "Employee not found");

    let response = client
        .put("/employees/42")
        .header(ContentType::JSON)
        .body(json!({ "name": "Nobody" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);

    let response = client.delete("/employees/42").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn non_numeric_id_is_employee_not_found() {
    let client = TestRocketBuilder::new().blocking_client();

    let response = client.get("/employees/abc").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.error, "Employee not found");
    assert_eq!(body.code, "NotFound");

    let response = client
        .put("/employees/99999999999")
        .header(ContentType::JSON)
        .body(json!({ "name": "Nobody Here" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.error, "Employee not found");

    let response = client.delete("/employees/1.5").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.error, "Employee not found");
}

#[test]
fn partial_update_keeps_omitted_fields() {
    let client = TestRocketBuilder::new().blocking_client();
    let created = create(&client, employee_json("Grace Hopper", "grace@example.com", "IT", 100.0));

    let response = client
        .put(format!("/employees/{}", created.id))
        .header(ContentType::JSON)
        .body(json!({ "department": "Finance", "salary": "250" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let updated: Employee = response.into_json().expect("employee JSON");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Grace Hopper");
    assert_eq!(updated.email, "grace@example.com");
    assert_eq!(updated.department, "Finance");
    assert_eq!(updated.salary, 250.0);

    let response = client
        .put(format!("/employees/{}", created.id))
        .header(ContentType::JSON)
        .body(json!({ "phone": "123" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body: ErrorResponse = response.into_json().expect("error JSON");
    assert_eq!(body.code, "InvalidPhone");
}

#[test]
fn delete_removes_employee() {
    let client = TestRocketBuilder::new().blocking_client();
    let created = create(&client, employee_json("Alan Turing", "alan@example.com", "IT", 1.0));

    let response = client.delete(format!("/employees/{}", created.id)).dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: MessageResponse = response.into_json().expect("message JSON");
    assert_eq!(body.message, "Employee deleted successfully");

    let response = client.get(format!("/employees/{}", created.id)).dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn list_paginates_with_total_over_all_matches() {
    let client = TestRocketBuilder::new().blocking_client();
    seed(&client, 25);

    let first: EmployeePage = client
        .get("/employees?page=1&limit=10")
        .dispatch()
        .into_json()
        .expect("page JSON");
    let second: EmployeePage = client
        .get("/employees?page=2&limit=10")
        .dispatch()
        .into_json()
        .expect("page JSON");

    assert_eq!(second.total, 25);
    assert_eq!(second.employees.len(), 10);
    assert!(
        second
            .employees
            .iter()
            .all(|e| first.employees.iter().all(|f| f.id != e.id))
    );
    assert_eq!(second.by_department.values().sum::<i64>(), 25);

    let beyond: EmployeePage = client
        .get("/employees?page=9&limit=10")
        .dispatch()
        .into_json()
        .expect("page JSON");
    assert!(beyond.employees.is_empty());
    assert_eq!(beyond.total, 25);
}

#[test]
fn list_filters_sorts_and_tolerates_bad_parameters() {
    let client = TestRocketBuilder::new().blocking_client();
    seed(&client, 9);

    let response = client
        .get("/employees?department=HR&sort=salary&order=desc")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let page: EmployeePage = response.into_json().expect("page JSON");
    assert_eq!(page.total, 3);
    assert_eq!(page.by_department.len(), 1);
    assert_eq!(page.by_department["HR"], 3);
    let salaries: Vec<f64> = page.employees.iter().map(|e| e.salary).collect();
    assert_eq!(salaries, vec![1007.0, 1004.0, 1001.0]);

    let page: EmployeePage = client
        .get("/employees?search=EMPLOYEE0&page=abc&limit=-1&sort=nope&order=up")
        .dispatch()
        .into_json()
        .expect("page JSON");
    assert_eq!(page.total, 9);
    assert_eq!(page.employees.len(), 9);
    assert_eq!(page.employees[0].name, "Employee 00");

    let page: EmployeePage = client
        .get("/employees?search=nobody-matches")
        .dispatch()
        .into_json()
        .expect("page JSON");
    assert_eq!(page.total, 0);
    assert!(page.by_department.is_empty());
}
