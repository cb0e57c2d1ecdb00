//! Shared test helpers: a handler that records its own name into a
//! shared log, so dispatch order can be asserted by comparing the log
//! contents rather than by side-channel state.

use staged_radix_router::{Context, HandlerRef, Next};
use std::sync::{Arc, Mutex};

pub fn recorder(log: Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> HandlerRef {
    Arc::new(move |ctx: &mut Context, next: Next<'_>| {
        log.lock().unwrap().push(name);
        next.call(ctx);
    })
}

/// A handler that records its name but never calls `next`, used to
/// assert short-circuiting.
pub fn blocking_recorder(log: Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> HandlerRef {
    Arc::new(move |_ctx: &mut Context, _next: Next<'_>| {
        log.lock().unwrap().push(name);
    })
}
