#[rocket::launch]
fn rocket() -> _ {
    employee_directory::rocket()
}
