/// Teardown support: code that runs after the test body whatever its
/// outcome, in reverse order of fixture acquisition.
use tracing::debug;

use crate::capture::{self, Panicked};

pub trait TearDown {
    fn tear_down(self: Box<Self>);
}

impl<F: FnOnce()> TearDown for F {
    fn tear_down(self: Box<Self>) {
        (*self)()
    }
}

/// Collects the teardown steps registered while a fixture is produced.
#[derive(Default)]
pub struct Finalizer {
    steps: Vec<Box<dyn TearDown>>,
}

impl Finalizer {
    /// Register a teardown step. Steps registered by the same fixture run
    /// in reverse registration order.
    pub fn add(&mut self, step: impl TearDown + 'static) {
        self.steps.push(Box::new(step));
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// The teardown stack of a run or of a single test invocation.
#[derive(Default)]
pub(crate) struct TeardownStack {
    steps: Vec<(String, Box<dyn TearDown>)>,
}

impl TeardownStack {
    pub(crate) fn push(&mut self, owner: &str, finalizer: Finalizer) {
        self.steps.extend(
            finalizer
                .steps
                .into_iter()
                .map(|step| (owner.to_owned(), step)),
        );
    }

    /// Run every step, last acquired first. All steps run even if some of
    /// them panic; the failures are returned along with the owning fixture.
    pub(crate) fn unwind(&mut self) -> Vec<(String, Panicked)> {
        let mut failures = Vec::new();
        while let Some((owner, step)) = self.steps.pop() {
            debug!(fixture = %owner, "tear down");
            if let Err(panicked) = capture::catch(move || step.tear_down()) {
                failures.push((owner, panicked));
            }
        }
        failures
    }
}

#[cfg(test)]
mod should {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use pretty_assertions::assert_eq;

    fn recorder() -> Rc<RefCell<Vec<&'static str>>> {
        Default::default()
    }

    #[test]
    fn unwind_in_reverse_acquisition_order() {
        let log = recorder();
        let mut stack = TeardownStack::default();
        for name in ["first", "second", "third"] {
            let mut finalizer = Finalizer::default();
            let log = log.clone();
            finalizer.add(move || log.borrow_mut().push(name));
            stack.push(name, finalizer);
        }

        let failures = stack.unwind();

        assert!(failures.is_empty());
        assert_eq!(vec!["third", "second", "first"], *log.borrow());
    }

    #[test]
    fn keep_going_when_a_step_panics() {
        let log = recorder();
        let mut stack = TeardownStack::default();
        let mut finalizer = Finalizer::default();
        let l = log.clone();
        finalizer.add(move || l.borrow_mut().push("survivor"));
        finalizer.add(|| panic!("cannot drop table"));
        stack.push("db", finalizer);

        let failures = stack.unwind();

        assert_eq!(vec!["survivor"], *log.borrow());
        assert_eq!(1, failures.len());
        assert_eq!("db", failures[0].0);
        assert!(failures[0].1.message().contains("cannot drop table"));
    }

    #[test]
    fn accept_custom_tear_down_implementations() {
        struct Guard(Rc<RefCell<Vec<&'static str>>>);

        impl TearDown for Guard {
            fn tear_down(self: Box<Self>) {
                self.0.borrow_mut().push("guard");
            }
        }

        let log = recorder();
        let mut finalizer = Finalizer::default();
        finalizer.add(Guard(log.clone()));
        assert_eq!(1, finalizer.len());
        let mut stack = TeardownStack::default();
        stack.push("guarded", finalizer);

        stack.unwind();

        assert_eq!(vec!["guard"], *log.borrow());
    }
}
