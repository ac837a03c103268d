//! Check that discovery, fixture injection and markers work.
use fixtura::mark;

use super::conftest::UserData;

pub fn test_fixtura_runs() {
    assert!(true);
}

pub fn test_fixture_injection(sample_data: &UserData) {
    let username = sample_data["username"];

    assert_eq!("testuser", username);
    assert_eq!("qa_engineer", sample_data["role"]);
}

#[mark(smoke)]
pub fn test_smoke_marker_works() {
    assert_eq!(2, 1 + 1);
}
