//! `fixtura` is a small fixture based test harness. A *fixture* is a named
//! producer of some test setup data: define it once and every test that
//! names it as an argument receives the produced value, without any explicit
//! wiring. Tests can be tagged with *markers* and you can run just the tests
//! that carry a given marker.
//!
//! ## How
//!
//! A test binary with `harness = false` lays out its tests in a directory:
//!
//! ```text
//! tests/
//! ├── suite.rs
//! └── suite/
//!     ├── conftest.rs        # fixtures shared by every test in suite/
//!     ├── test_setup.rs      # tests and private fixtures
//!     └── api/
//!         ├── conftest.rs    # fixtures for suite/api/ only
//!         └── test_users.rs
//! ```
//!
//! Fixtures are plain functions annotated with [`#[fixture]`](macro@fixture).
//! Their arguments are the fixtures they depend on, taken by reference:
//!
//! ```ignore
//! // tests/suite/conftest.rs
//! use fixtura::fixture;
//! use std::collections::HashMap;
//!
//! #[fixture]
//! pub fn sample_data() -> HashMap<&'static str, &'static str> {
//!     HashMap::from([("username", "testuser"), ("role", "qa_engineer")])
//! }
//! ```
//!
//! Tests are the `pub fn test_*` functions in `test_*.rs` files: they name the
//! fixtures they need in their argument list.
//!
//! ```ignore
//! // tests/suite/test_setup.rs
//! use fixtura::mark;
//! use std::collections::HashMap;
//!
//! #[mark(smoke)]
//! pub fn test_fixture_injection(sample_data: &HashMap<&'static str, &'static str>) {
//!     assert_eq!("testuser", sample_data["username"]);
//! }
//! ```
//!
//! [`discover!`] scans the directory at compile time and defines a
//! `discovered()` function that builds the whole [`Suite`]:
//!
//! ```ignore
//! // tests/suite.rs
//! fixtura::discover!("tests/suite");
//!
//! fn main() -> std::process::ExitCode {
//!     fixtura::main(discovered())
//! }
//! ```
//!
//! Now `cargo test --test suite -- -m smoke` runs just the smoke tests.
//!
//! ## Visibility
//!
//! A fixture defined in a `conftest.rs` is visible to every test in its
//! directory and in all the subdirectories; a fixture defined in a test file
//! is visible just in that file. A nearer definition shadows the farther one
//! and a fixture that requests its own name gets the shadowed value.
//!
//! ## Without macros
//!
//! Everything the macros generate is reachable by hand:
//!
//! ```
//! use fixtura::{FixtureDef, RunOptions, Suite, TestCase};
//!
//! let mut suite = Suite::new();
//! suite
//!     .register("tests", FixtureDef::value("answer", 42_u32))
//!     .add_test(
//!         TestCase::new("tests/test_answer.rs", "test_answer", |request| {
//!             assert_eq!(&42, request.get::<u32>("answer")?);
//!             Ok(())
//!         })
//!         .requires(["answer"]),
//!     );
//!
//! let report = suite.run(&RunOptions::default());
//!
//! assert!(report.is_success());
//! ```

pub mod capture;
pub mod case;
pub mod cli;
pub mod config;
pub mod error;
pub mod finalizer;
pub mod fixture;
pub mod inject;
pub mod location;
pub mod registry;
pub mod report;
pub mod runner;
pub mod select;

pub use capture::Panicked;
pub use case::{IntoTestResult, TestCase};
pub use cli::main;
pub use config::Config;
pub use error::{
    Failure, InjectError, ProducerError, RegistryError, ResolveError, SetupError,
};
pub use finalizer::{Finalizer, TearDown};
pub use fixture::{FixtureDef, Scope};
pub use inject::{Injector, Plan, Request, Resolution};
pub use location::Location;
pub use registry::{DefId, Registry};
pub use report::{Outcome, Report, Summary};
pub use runner::{RunOptions, Suite};
pub use select::{select, Selection};

pub use fixtura_macros::{discover, fixture, mark};
