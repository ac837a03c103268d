//! Fixtures shared by every test in the suite.
use std::collections::HashMap;

use fixtura::fixture;

pub type UserData = HashMap<&'static str, &'static str>;

/// A user record that many tests can reuse.
#[fixture]
pub fn sample_data() -> UserData {
    HashMap::from([
        ("username", "testuser"),
        ("email", "testuser@example.com"),
        ("role", "qa_engineer"),
    ])
}
