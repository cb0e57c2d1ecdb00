use crate::context::Context;
use std::sync::Arc;

/// A single step of the dispatch pipeline.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: &mut Context, next: Next<'_>);
}

impl<F> Handler for F
where
    F: Fn(&mut Context, Next<'_>) + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut Context, next: Next<'_>) {
        self(ctx, next)
    }
}

/// A reference-counted, type-erased handler, as stored in the tree.
pub type HandlerRef = Arc<dyn Handler>;

/// The continuation a handler calls to proceed to the next step. Not
/// calling it short-circuits the chain.
pub struct Next<'a> {
    continuation: Box<dyn FnOnce(&mut Context) + 'a>,
}

impl<'a> Next<'a> {
    pub fn new(continuation: impl FnOnce(&mut Context) + 'a) -> Self {
        Self {
            continuation: Box::new(continuation),
        }
    }

    /// A `next` that does nothing: the chain simply ends here.
    pub fn noop() -> Self {
        Self::new(|_ctx| {})
    }

    pub fn call(self, ctx: &mut Context) {
        (self.continuation)(ctx)
    }
}

/// Composes `handlers` into a single onion chain, calling `tail` once
/// the last handler in the chain calls its own `next`.
pub fn drive<'a>(
    handlers: &'a [HandlerRef],
    ctx: &mut Context,
    tail: Box<dyn FnOnce(&mut Context) + 'a>,
) {
    match handlers.split_first() {
        Some((first, rest)) => {
            let next = Next::new(move |ctx: &mut Context| drive(rest, ctx, tail));
            first.call(ctx, next);
        }
        None => tail(ctx),
    }
}
