/// Turn panics raised by producers, bodies and finalizers into values.
///
/// A process-wide panic hook is installed once: on threads that are inside
/// [`catch`] it records the panic message instead of printing it, everywhere
/// else it delegates to the hook that was installed before.
use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Once,
    },
};

thread_local! {
    static CAPTURING: Cell<usize> = const { Cell::new(0) };
    // Payload message and full message of the last panic seen by the hook.
    static LAST_PANIC: RefCell<Option<(String, String)>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();
static ECHO: AtomicBool = AtomicBool::new(false);

/// Print captured panics too, as the previous hook would do.
pub fn echo_panics(echo: bool) {
    ECHO.store(echo, Ordering::Relaxed);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panicked {
    message: String,
}

impl Panicked {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(|c| c.get()) == 0 {
                return previous(info);
            }
            if ECHO.load(Ordering::Relaxed) {
                previous(info);
            }
            let payload = payload_message(info.payload());
            let message = match info.location() {
                Some(l) => format!("panicked at {}:{}:{}:\n{payload}", l.file(), l.line(), l.column()),
                None => payload.clone(),
            };
            LAST_PANIC.with(|last| *last.borrow_mut() = Some((payload, message)));
        }));
    });
}

fn take_last_panic() -> Option<(String, String)> {
    LAST_PANIC.with(|last| last.borrow_mut().take())
}

/// Run `f` and catch its panic, if any.
pub fn catch<R>(f: impl FnOnce() -> R) -> Result<R, Panicked> {
    install_hook();
    take_last_panic();
    CAPTURING.with(|c| c.set(c.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|c| c.set(c.get() - 1));
    let last = take_last_panic();
    result.map_err(|payload| {
        let payload = payload_message(payload.as_ref());
        // `resume_unwind` skips the hook: what it recorded may belong to a
        // panic that was already caught.
        let message = match last {
            Some((recorded, message)) if recorded == payload => message,
            _ => payload,
        };
        Panicked { message }
    })
}
