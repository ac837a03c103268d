//! Fixtures for the api tests: they extend the suite's ones.
use std::{cell::RefCell, rc::Rc};

use fixtura::{fixture, Finalizer};

use super::super::conftest::UserData;

/// The suite's user promoted to administrator.
#[fixture]
pub fn sample_data(sample_data: &UserData) -> UserData {
    let mut data = sample_data.clone();
    data.insert("role", "admin");
    data
}

#[derive(Debug, Default)]
pub struct Server {
    pub requests: RefCell<Vec<String>>,
}

/// Shared by every api test in the run.
#[fixture]
#[once]
pub fn server() -> Rc<Server> {
    Rc::new(Server::default())
}

/// A session opened on the server for the sample user and closed when the
/// test ends.
#[fixture]
pub fn session(
    server: &Rc<Server>,
    sample_data: &UserData,
    #[finalizer] finalizer: &mut Finalizer,
) -> String {
    let user = sample_data["username"];
    server.requests.borrow_mut().push(format!("login {user}"));
    let server = Rc::clone(server);
    finalizer.add(move || server.requests.borrow_mut().push(format!("logout {user}")));
    format!("session-{user}")
}
