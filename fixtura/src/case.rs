/// Test cases: a body, the fixtures it requests by name and its markers.
use std::{collections::BTreeSet, fmt};

use crate::{inject::Request, Failure, Location};

/// The marker that makes the runner skip a test.
pub const SKIP: &str = "skip";

type Body = Box<dyn Fn(&Request<'_>) -> Result<(), Failure>>;

pub struct TestCase {
    id: String,
    name: String,
    location: Location,
    requires: Vec<String>,
    markers: BTreeSet<String>,
    body: Body,
}

impl TestCase {
    /// A test named `name` living at `location`. The body reads the
    /// requested fixtures from the request and reports a failure by
    /// panicking or by returning an error.
    pub fn new<F>(location: impl Into<Location>, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Request<'_>) -> Result<(), Failure> + 'static,
    {
        let location = location.into();
        let name = name.into();
        let id = if location.is_root() {
            name.clone()
        } else {
            format!("{location}::{name}")
        };
        Self {
            id,
            name,
            location,
            requires: Vec::new(),
            markers: BTreeSet::new(),
            body: Box::new(body),
        }
    }

    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn marked<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.extend(markers.into_iter().map(Into::into));
        self
    }

    /// Unique id: `location::name`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn fixtures(&self) -> &[String] {
        &self.requires
    }

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    pub fn is_skipped(&self) -> bool {
        self.has_marker(SKIP)
    }

    pub(crate) fn call(&self, request: &Request<'_>) -> Result<(), Failure> {
        (self.body)(request)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("requires", &self.requires)
            .field("markers", &self.markers)
            .finish()
    }
}

/// What a test function can return.
pub trait IntoTestResult {
    fn into_test_result(self) -> Result<(), Failure>;
}

impl IntoTestResult for () {
    fn into_test_result(self) -> Result<(), Failure> {
        Ok(())
    }
}

impl<E: fmt::Debug> IntoTestResult for Result<(), E> {
    fn into_test_result(self) -> Result<(), Failure> {
        self.map_err(Failure::failed)
    }
}
