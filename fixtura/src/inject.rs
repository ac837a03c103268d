/// Resolve the fixtures a test needs and hand them to it.
///
/// Resolution runs in two phases. *Planning* happens at collection time: it
/// looks every requested name up, checks for cycles and scope mismatches and
/// computes the acquisition order. *Acquisition* happens when the test runs:
/// producers are invoked in plan order, every definition at most once per
/// test (session ones at most once per run).
use std::{
    any::{type_name, Any},
    collections::{HashMap, HashSet},
    rc::Rc,
};

use tracing::{debug, warn};

use crate::{
    capture::{self, Panicked},
    finalizer::{Finalizer, TeardownStack},
    registry::{DefId, Registry},
    InjectError, Location, ProducerError, ResolveError, Scope, SetupError,
};

#[derive(Clone)]
pub(crate) struct Slot {
    value: Rc<dyn Any>,
    type_name: &'static str,
}

pub(crate) type Slots = HashMap<DefId, Slot>;
pub(crate) type Bindings = HashMap<String, DefId>;

/// Read-only view on the values acquired so far, as seen by one consumer
/// (a producer or a test body).
pub struct Request<'a> {
    requester: &'a str,
    slots: &'a Slots,
    bindings: &'a Bindings,
}

impl<'a> Request<'a> {
    pub(crate) fn new(requester: &'a str, slots: &'a Slots, bindings: &'a Bindings) -> Self {
        Self {
            requester,
            slots,
            bindings,
        }
    }

    /// Who is asking: a fixture name or a test id.
    pub fn requester(&self) -> &str {
        self.requester
    }

    /// Borrow the value of the requested fixture `name`.
    pub fn get<T: Any>(&self, name: &str) -> Result<&'a T, InjectError> {
        let slot = self
            .bindings
            .get(name)
            .and_then(|id| self.slots.get(id))
            .ok_or_else(|| InjectError::NotRequested(name.to_owned()))?;
        slot.value
            .downcast_ref::<T>()
            .ok_or_else(|| InjectError::TypeMismatch {
                name: name.to_owned(),
                expected: type_name::<T>(),
                actual: slot.type_name,
            })
    }
}

pub(crate) struct Step {
    def: DefId,
    bindings: Bindings,
}

/// The ordered list of fixtures to acquire for one consumer.
pub struct Plan {
    requester: String,
    steps: Vec<Step>,
    bindings: Bindings,
}

impl Plan {
    pub fn requester(&self) -> &str {
        &self.requester
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Definitions in acquisition order: every fixture comes after the
    /// fixtures it depends on.
    pub fn definitions(&self) -> impl Iterator<Item = DefId> + '_ {
        self.steps.iter().map(|s| s.def)
    }
}

struct Planner<'r> {
    registry: &'r Registry,
    requester: &'r str,
    location: &'r Location,
    steps: Vec<Step>,
    done: HashSet<DefId>,
    visiting: Vec<DefId>,
}

impl<'r> Planner<'r> {
    fn new(registry: &'r Registry, requester: &'r str, location: &'r Location) -> Self {
        Self {
            registry,
            requester,
            location,
            steps: Default::default(),
            done: Default::default(),
            visiting: Default::default(),
        }
    }

    fn name(&self, id: DefId) -> String {
        self.registry.get(id).name().to_owned()
    }

    fn cycle(&self, closing: &str, from: usize) -> ResolveError {
        let mut chain = self.visiting[from..]
            .iter()
            .map(|&id| self.name(id))
            .collect::<Vec<_>>();
        chain.push(closing.to_owned());
        ResolveError::CyclicDependency { chain }
    }

    /// Lookup `name` as requested by `requester` (`None` means the test
    /// itself). A fixture requesting its own name extends the definition it
    /// shadows, so the lookup starts from the parent of its location.
    fn lookup(&self, name: &str, requester: Option<DefId>) -> Result<DefId, ResolveError> {
        match requester {
            Some(id) if self.registry.get(id).name() == name => self
                .registry
                .location(id)
                .parent()
                .and_then(|parent| self.registry.lookup(name, &parent))
                .ok_or_else(|| ResolveError::CyclicDependency {
                    chain: vec![name.to_owned(), name.to_owned()],
                }),
            _ => self
                .registry
                .lookup(name, self.location)
                .ok_or_else(|| ResolveError::UnknownFixture {
                    name: name.to_owned(),
                    requested_by: requester
                        .map(|id| self.name(id))
                        .unwrap_or_else(|| self.requester.to_owned()),
                    location: self.location.clone(),
                }),
        }
    }

    fn visit(&mut self, id: DefId) -> Result<(), ResolveError> {
        if self.done.contains(&id) {
            return Ok(());
        }
        if let Some(pos) = self.visiting.iter().position(|&v| v == id) {
            return Err(self.cycle(self.registry.get(id).name(), pos));
        }
        self.visiting.push(id);
        let registry = self.registry;
        let def = registry.get(id);
        let mut bindings = Bindings::new();
        for dependency in def.dependencies() {
            let dep_id = self.lookup(dependency, Some(id))?;
            if def.get_scope() == Scope::Session
                && registry.get(dep_id).get_scope() == Scope::Function
            {
                return Err(ResolveError::ScopeMismatch {
                    fixture: def.name().to_owned(),
                    dependency: dependency.to_owned(),
                });
            }
            self.visit(dep_id)?;
            bindings.insert(dependency.to_owned(), dep_id);
        }
        self.visiting.pop();
        self.done.insert(id);
        self.steps.push(Step { def: id, bindings });
        Ok(())
    }

    fn plan(mut self, requires: &[String]) -> Result<Plan, ResolveError> {
        let mut bindings = Bindings::new();
        for name in requires {
            let id = self.lookup(name, None)?;
            self.visit(id)?;
            bindings.insert(name.to_owned(), id);
        }
        Ok(Plan {
            requester: self.requester.to_owned(),
            steps: self.steps,
            bindings,
        })
    }
}

/// Values acquired for a single consumer. Dropping it (or calling
/// [`Resolution::tear_down`]) runs the registered finalizers in reverse
/// acquisition order.
pub struct Resolution<'p> {
    plan: &'p Plan,
    slots: Slots,
    teardown: TeardownStack,
    setup_error: Option<SetupError>,
}

impl<'p> Resolution<'p> {
    /// The request to hand to the consumer the plan was built for.
    pub fn request(&self) -> Request<'_> {
        Request::new(&self.plan.requester, &self.slots, &self.plan.bindings)
    }

    /// The first producer failure, if any. After a failure nothing else was
    /// acquired.
    pub fn setup_error(&self) -> Option<&SetupError> {
        self.setup_error.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.setup_error.is_none()
    }

    pub fn tear_down(mut self) -> Vec<(String, Panicked)> {
        self.teardown.unwind()
    }
}

impl Drop for Resolution<'_> {
    fn drop(&mut self) {
        for (fixture, panicked) in self.teardown.unwind() {
            warn!(%fixture, "tear down failed: {panicked}");
        }
    }
}

#[derive(Default)]
struct SessionCache {
    values: HashMap<DefId, Result<Slot, ProducerError>>,
    teardown: TeardownStack,
}

/// Plans and acquires fixtures from a registry. It owns the session scoped
/// values: they live until [`Injector::finish`].
pub struct Injector<'r> {
    registry: &'r Registry,
    session: SessionCache,
}

impl<'r> Injector<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            session: Default::default(),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Plan the acquisition of `requires` for `requester` placed at
    /// `location`.
    pub fn plan(
        &self,
        requester: &str,
        location: &Location,
        requires: &[String],
    ) -> Result<Plan, ResolveError> {
        Planner::new(self.registry, requester, location).plan(requires)
    }

    /// Acquire every fixture in `plan`. Stops at the first producer failure
    /// and records it in the returned resolution.
    pub fn resolve<'p>(&mut self, plan: &'p Plan) -> Resolution<'p> {
        let mut resolution = Resolution {
            plan,
            slots: Slots::new(),
            teardown: TeardownStack::default(),
            setup_error: None,
        };
        let registry = self.registry;
        for step in &plan.steps {
            let def = registry.get(step.def);
            let acquired = match def.get_scope() {
                Scope::Function => {
                    let mut finalizer = Finalizer::default();
                    let produced = produce(registry, step, &resolution.slots, &mut finalizer);
                    resolution.teardown.push(def.name(), finalizer);
                    produced
                }
                Scope::Session => self.session_value(step, &resolution.slots),
            };
            match acquired {
                Ok(slot) => {
                    resolution.slots.insert(step.def, slot);
                }
                Err(error) => {
                    warn!(fixture = def.name(), requester = %plan.requester, "setup failed: {error}");
                    resolution.setup_error = Some(SetupError {
                        fixture: def.name().to_owned(),
                        error,
                    });
                    break;
                }
            }
        }
        resolution
    }

    fn session_value(&mut self, step: &Step, slots: &Slots) -> Result<Slot, ProducerError> {
        if let Some(cached) = self.session.values.get(&step.def) {
            return cached.clone();
        }
        let def = self.registry.get(step.def);
        let mut finalizer = Finalizer::default();
        let produced = produce(self.registry, step, slots, &mut finalizer);
        self.session.teardown.push(def.name(), finalizer);
        self.session.values.insert(step.def, produced.clone());
        produced
    }

    /// Tear down the session scoped fixtures.
    pub fn finish(&mut self) -> Vec<(String, Panicked)> {
        self.session.values.clear();
        self.session.teardown.unwind()
    }
}

impl Drop for Injector<'_> {
    fn drop(&mut self) {
        for (fixture, panicked) in self.finish() {
            warn!(%fixture, "session tear down failed: {panicked}");
        }
    }
}

fn produce(
    registry: &Registry,
    step: &Step,
    slots: &Slots,
    finalizer: &mut Finalizer,
) -> Result<Slot, ProducerError> {
    let def = registry.get(step.def);
    debug!(fixture = def.name(), scope = %def.get_scope(), "produce");
    let request = Request::new(def.name(), slots, &step.bindings);
    match capture::catch(|| def.produce(&request, finalizer)) {
        Ok(Ok(value)) => Ok(Slot {
            value: Rc::from(value),
            type_name: def.type_name(),
        }),
        Ok(Err(error)) => Err(error),
        Err(panicked) => Err(ProducerError::Panicked(panicked.message().to_owned())),
    }
}
