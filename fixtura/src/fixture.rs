/// Fixture definitions: a name, the names it depends on, a scope and the
/// producer that builds the value.
use std::{
    any::{type_name, Any},
    fmt,
};

use crate::{finalizer::Finalizer, inject::Request, ProducerError};

/// How long a produced value lives.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Scope {
    /// Produced again for every test that requests it.
    #[default]
    Function,
    /// Produced at most once per run and shared read-only.
    Session,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Function => write!(f, "function"),
            Scope::Session => write!(f, "session"),
        }
    }
}

type Producer =
    Box<dyn Fn(&Request<'_>, &mut Finalizer) -> Result<Box<dyn Any>, ProducerError>>;

pub struct FixtureDef {
    name: String,
    requires: Vec<String>,
    scope: Scope,
    type_name: &'static str,
    producer: Producer,
}

impl FixtureDef {
    /// Define the fixture `name` built by `producer`. The producer reads its
    /// dependencies from the request and can push teardown code into the
    /// finalizer.
    pub fn new<T, F>(name: impl Into<String>, producer: F) -> Self
    where
        T: Any,
        F: Fn(&Request<'_>, &mut Finalizer) -> Result<T, ProducerError> + 'static,
    {
        Self {
            name: name.into(),
            requires: Vec::new(),
            scope: Scope::default(),
            type_name: type_name::<T>(),
            producer: Box::new(move |request, finalizer| {
                producer(request, finalizer).map(|v| Box::new(v) as Box<dyn Any>)
            }),
        }
    }

    /// Define a fixture that always returns a clone of `value`.
    pub fn value<T: Any + Clone>(name: impl Into<String>, value: T) -> Self {
        Self::new(name, move |_, _| Ok(value.clone()))
    }

    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.requires
    }

    pub fn get_scope(&self) -> Scope {
        self.scope
    }

    /// The name of the produced type, used in injection error messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn produce(
        &self,
        request: &Request<'_>,
        finalizer: &mut Finalizer,
    ) -> Result<Box<dyn Any>, ProducerError> {
        (self.producer)(request, finalizer)
    }
}

impl fmt::Debug for FixtureDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureDef")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("scope", &self.scope)
            .field("type_name", &self.type_name)
            .finish()
    }
}
