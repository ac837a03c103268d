use std::rc::Rc;

use fixtura::{fixture, mark};

use super::{super::conftest::UserData, conftest::Server};

#[fixture(name = "endpoint")]
fn users_endpoint() -> String {
    "/api/users".to_owned()
}

#[mark(api)]
pub fn test_nearer_fixture_shadows_the_suite_one(sample_data: &UserData) {
    assert_eq!("admin", sample_data["role"]);
    assert_eq!("testuser@example.com", sample_data["email"]);
}

#[mark(api, smoke)]
pub fn test_session_is_open(session: &String, server: &Rc<Server>) {
    assert_eq!("session-testuser", session.as_str());
    assert_eq!(
        Some("login testuser"),
        server.requests.borrow().last().map(String::as_str)
    );
}

#[mark(api)]
pub fn test_sessions_are_closed_after_each_test(server: &Rc<Server>, endpoint: &String) {
    let requests = server.requests.borrow();
    let count = |prefix: &str| requests.iter().filter(|r| r.starts_with(prefix)).count();

    assert_eq!("/api/users", endpoint.as_str());
    assert_eq!(count("login"), count("logout"));
}

#[mark(api, skip)]
pub fn test_not_ready_yet() {
    panic!("skipped tests never run");
}
