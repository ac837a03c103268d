/// Errors raised while registering, collecting and running fixtures.
use std::fmt::{Debug, Display};

use thiserror::Error;

use crate::Location;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("fixture '{name}' is already defined at '{location}'")]
    DuplicateDefinition { name: String, location: Location },
}

/// Problems found while planning a test's fixtures. They are detected before
/// any test runs and prevent just the affected test from running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("fixture '{name}' not found (requested by '{requested_by}' at '{location}')")]
    UnknownFixture {
        name: String,
        requested_by: String,
        location: Location,
    },
    #[error("recursive dependency involving fixture '{}': {}", chain.last().map(String::as_str).unwrap_or_default(), chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },
    #[error("session fixture '{fixture}' cannot depend on function fixture '{dependency}'")]
    ScopeMismatch { fixture: String, dependency: String },
    #[error("marker '{0}' is not registered")]
    UnknownMarker(String),
}

/// Errors while handing an already acquired value to a consumer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InjectError {
    #[error("fixture '{0}' was not requested")]
    NotRequested(String),
    #[error("fixture '{name}' provides `{actual}` but `{expected}` was requested")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// A producer could not build its value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProducerError {
    #[error("{0}")]
    Failed(String),
    #[error("panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Inject(#[from] InjectError),
}

impl ProducerError {
    /// Convert any displayable error returned by a fallible fixture.
    pub fn failed<E: Display>(error: E) -> Self {
        Self::Failed(error.to_string())
    }
}

/// A fixture could not be acquired while resolving a test's arguments.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("fixture '{fixture}' failed: {error}")]
pub struct SetupError {
    pub fixture: String,
    pub error: ProducerError,
}

/// Why a test body didn't pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Failure {
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Setup(#[from] InjectError),
}

impl Failure {
    pub fn failed<E: Debug>(error: E) -> Self {
        Self::Failed(format!("{error:?}"))
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_the_whole_cycle() {
        let error = ResolveError::CyclicDependency {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };

        assert_eq!(
            "recursive dependency involving fixture 'a': a -> b -> a",
            error.to_string()
        );
    }

    #[test]
    fn convert_fallible_fixture_errors_by_display() {
        let error = ProducerError::failed(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such table",
        ));

        assert_eq!(ProducerError::Failed("no such table".into()), error);
    }

    #[test]
    fn keep_failure_debug_representation() {
        assert_eq!(
            Failure::Failed(r#""boom""#.into()),
            Failure::failed("boom")
        );
    }
}
