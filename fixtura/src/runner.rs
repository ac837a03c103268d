/// Collect and run a suite of tests.
use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::{
    capture,
    case::SKIP,
    inject::{Injector, Plan},
    report::{Outcome, Report},
    registry::{DefId, Registry},
    Failure, FixtureDef, InjectError, Location, ProducerError, ResolveError, Selection,
    SetupError, TestCase,
};

/// Every fixture and test known to a run, plus the problems found while
/// putting them together.
#[derive(Default, Debug)]
pub struct Suite {
    registry: Registry,
    tests: Vec<TestCase>,
    discovery_errors: Vec<(String, String)>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `def` at `location`. A duplicated name doesn't abort the
    /// suite: it's recorded and reported as an error of the run.
    pub fn register(&mut self, location: impl Into<Location>, def: FixtureDef) -> &mut Self {
        let location = location.into();
        if let Err(e) = self.registry.register(location.clone(), def) {
            warn!(%location, "{e}");
            self.discovery_error(location.to_string(), e.to_string());
        }
        self
    }

    pub fn add_test(&mut self, case: TestCase) -> &mut Self {
        debug!(id = case.id(), "collected");
        self.tests.push(case);
        self
    }

    /// Something at `origin` (usually a file) could not be collected.
    pub fn discovery_error(
        &mut self,
        origin: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        let (origin, message) = (origin.into(), message.into());
        warn!(%origin, "discovery error: {message}");
        self.discovery_errors.push((origin, message));
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    pub fn discovery_errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.discovery_errors
            .iter()
            .map(|(o, m)| (o.as_str(), m.as_str()))
    }

    /// Fixtures visible from `location`, as `(name, defined at)`.
    pub fn fixtures_at(&self, location: &Location) -> Vec<(&str, &Location)> {
        self.registry
            .visible_from(location)
            .into_iter()
            .map(|id: DefId| (self.registry.get(id).name(), self.registry.location(id)))
            .collect()
    }

    /// Collect and run the selected tests.
    pub fn run(&self, options: &RunOptions) -> Report {
        Runner::new(self, options).run()
    }
}

/// How to run a suite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    selection: Selection,
    strict_markers: bool,
    markers: BTreeSet<String>,
}

impl RunOptions {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            ..Default::default()
        }
    }

    /// Fail the collection of tests that use markers never registered.
    pub fn strict_markers(mut self, strict: bool) -> Self {
        self.strict_markers = strict;
        self
    }

    pub fn register_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers.extend(markers.into_iter().map(Into::into));
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    fn is_known(&self, marker: &str) -> bool {
        marker == SKIP || self.markers.contains(marker)
    }

    fn check_markers(&self, case: &TestCase) -> Result<(), ResolveError> {
        match case.markers().find(|m| !self.is_known(m)) {
            Some(unknown) if self.strict_markers => {
                Err(ResolveError::UnknownMarker(unknown.to_owned()))
            }
            Some(unknown) => {
                debug!(id = case.id(), marker = unknown, "marker is not registered");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

struct Runner<'s> {
    suite: &'s Suite,
    options: &'s RunOptions,
    injector: Injector<'s>,
}

impl<'s> Runner<'s> {
    fn new(suite: &'s Suite, options: &'s RunOptions) -> Self {
        Self {
            suite,
            options,
            injector: Injector::new(&suite.registry),
        }
    }

    fn collect(&self) -> (Vec<(&'s TestCase, Result<Plan, ResolveError>)>, usize) {
        let (suite, options) = (self.suite, self.options);
        let (selected, deselected) = options.selection.apply(&suite.tests);
        let collected = selected
            .into_iter()
            .map(|case| {
                let plan = options.check_markers(case).and_then(|_| {
                    self.injector
                        .plan(case.id(), case.location(), case.fixtures())
                });
                if let Err(e) = &plan {
                    warn!(id = case.id(), "collection error: {e}");
                }
                (case, plan)
            })
            .collect();
        (collected, deselected)
    }

    fn run(mut self) -> Report {
        let (collected, deselected) = self.collect();
        info!(tests = collected.len(), deselected, "run started");
        let mut report = Report::new(deselected);
        for (origin, message) in self.suite.discovery_errors() {
            report.push_error(origin, message);
        }
        for (case, plan) in &collected {
            let outcome = if case.is_skipped() {
                Outcome::Skipped
            } else {
                match plan {
                    Ok(plan) => self.execute(case, plan),
                    Err(e) => Outcome::CollectionError(e.clone()),
                }
            };
            debug!(id = case.id(), ?outcome, "done");
            report.push(case.id(), outcome);
        }
        for (fixture, panicked) in self.injector.finish() {
            report.push_error(
                format!("session fixture '{fixture}'"),
                format!("finalizer failed: {panicked}"),
            );
        }
        info!(summary = %report.summary(), "run finished");
        report
    }

    fn execute(&mut self, case: &TestCase, plan: &Plan) -> Outcome {
        let resolution = self.injector.resolve(plan);
        let outcome = match resolution.setup_error() {
            Some(e) => Outcome::SetupError(e.clone()),
            None => match capture::catch(|| case.call(&resolution.request())) {
                Ok(Ok(())) => Outcome::Passed,
                Ok(Err(Failure::Failed(message))) => Outcome::Failed(message),
                Ok(Err(Failure::Setup(e))) => Outcome::SetupError(SetupError {
                    fixture: match &e {
                        InjectError::NotRequested(name) | InjectError::TypeMismatch { name, .. } => {
                            name.clone()
                        }
                    },
                    error: ProducerError::Inject(e),
                }),
                Err(panicked) => Outcome::Failed(panicked.message().to_owned()),
            },
        };
        let mut failures = resolution.tear_down().into_iter();
        match (outcome, failures.next()) {
            (Outcome::Passed, Some((fixture, panicked))) => Outcome::TeardownError {
                fixture,
                message: panicked.message().to_owned(),
            },
            (outcome, first) => {
                for (fixture, panicked) in first.into_iter().chain(failures) {
                    warn!(id = case.id(), %fixture, "tear down failed: {panicked}");
                }
                outcome
            }
        }
    }
}
