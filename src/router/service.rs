use crate::context::Context;
use crate::error::{RouterError, RouterResult};
use crate::handler::{HandlerRef, Next};
use crate::method::MethodKey;
use crate::pattern::{self, Segment};
use crate::radix::{NodePayload, PayloadFactory, RadixNode};
use crate::router::dispatch;
use crate::router::options::RouterOptions;
use parking_lot::RwLock;
use std::sync::Arc;

struct RouterState {
    root: RadixNode,
    options: RouterOptions,
    payload_factory: PayloadFactory,
}

/// Walks `segments` from `root`, creating literal nodes and parameter
/// branches as needed, and returns the node the full pattern resolves
/// to: the same node a dispatch for a matching path would end at.
fn resolve_target_node<'a>(
    root: &'a mut RadixNode,
    segments: &[Segment],
    factory: &PayloadFactory,
) -> &'a mut RadixNode {
    let mut current = root;
    for segment in segments {
        current = match segment {
            Segment::Literal(text) => current.find_or_create(text, factory),
            Segment::Parameter(param) => {
                let branch = current.payload.find_or_create_branch(param, factory);
                branch.subtree_root.as_mut()
            }
        };
    }
    current
}

/// The registration surface and dispatcher for one routing tree.
///
/// Cheap to share behind an `Arc` across worker threads: reads (dispatch)
/// take a shared lock and can run concurrently with each other; writes
/// (registration) are exclusive.
pub struct Router {
    inner: RwLock<RouterState>,
}

impl Router {
    pub fn new(options: RouterOptions) -> Self {
        let payload_factory: PayloadFactory = Arc::new(NodePayload::new);
        let root = RadixNode::new("", &payload_factory);
        Self {
            inner: RwLock::new(RouterState {
                root,
                options,
                payload_factory,
            }),
        }
    }

    /// Registers `handlers` as path middleware: runs every time the
    /// node is reached, never terminates a match by itself.
    #[tracing::instrument(level = "trace", skip(self, handlers), fields(pattern = pattern, stage = stage))]
    pub fn add_middleware(
        &self,
        method: MethodKey,
        pattern: &str,
        stage: i32,
        handlers: Vec<HandlerRef>,
    ) -> RouterResult<()> {
        let segments = pattern::parse(pattern)?;
        let mut state = self.inner.write();
        let factory = state.payload_factory.clone();
        let node = resolve_target_node(&mut state.root, &segments, &factory);
        node.payload.method_buckets_mut(method).middleware.append(stage, handlers);
        Ok(())
    }

    /// Registers `handlers` as terminators: the handlers that actually
    /// fulfil a matched request.
    #[tracing::instrument(level = "trace", skip(self, handlers), fields(pattern = pattern, stage = stage))]
    pub fn add_terminator(
        &self,
        method: MethodKey,
        pattern: &str,
        stage: i32,
        handlers: Vec<HandlerRef>,
    ) -> RouterResult<()> {
        let segments = pattern::parse(pattern)?;
        let mut state = self.inner.write();
        let factory = state.payload_factory.clone();
        let node = resolve_target_node(&mut state.root, &segments, &factory);
        node.payload
            .method_buckets_mut(method)
            .terminators
            .append(stage, handlers);
        Ok(())
    }

    /// Registers `handlers` for `method` at `pattern`, requiring at
    /// least one handler.
    fn register_verb(&self, method: MethodKey, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        if handlers.is_empty() {
            return Err(RouterError::EmptyHandlerList {
                pattern: pattern.to_string(),
            });
        }
        self.add_terminator(method, pattern, 0, handlers)
    }

    pub fn get(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::named("GET"), pattern, handlers)
    }

    pub fn post(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::named("POST"), pattern, handlers)
    }

    pub fn put(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::named("PUT"), pattern, handlers)
    }

    pub fn delete(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::named("DELETE"), pattern, handlers)
    }

    pub fn patch(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::named("PATCH"), pattern, handlers)
    }

    pub fn head(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::named("HEAD"), pattern, handlers)
    }

    pub fn options(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::named("OPTIONS"), pattern, handlers)
    }

    /// Registers `handlers` against the `ALL` reserved token: they
    /// participate like a method handler for any request method, with
    /// lower priority than the request's actual method.
    pub fn all(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        self.register_verb(MethodKey::All, pattern, handlers)
    }

    /// Registers immediate path middleware under the `MIDDLEWARE` token.
    pub fn use_middleware(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        if handlers.is_empty() {
            return Err(RouterError::EmptyHandlerList {
                pattern: pattern.to_string(),
            });
        }
        self.add_middleware(MethodKey::Middleware, pattern, 0, handlers)
    }

    /// Registers path terminators under the `MIDDLEWARE` token: these
    /// accumulate as ancestor nodes are visited and run as
    /// terminator-middleware at whichever node the request finally
    /// matches at.
    pub fn use_terminator(&self, pattern: &str, handlers: Vec<HandlerRef>) -> RouterResult<()> {
        if handlers.is_empty() {
            return Err(RouterError::EmptyHandlerList {
                pattern: pattern.to_string(),
            });
        }
        self.add_terminator(MethodKey::Middleware, pattern, 0, handlers)
    }

    /// Dispatches `method`/`path` against the registered tree, invoking
    /// whatever handler groups match and falling back to `outer_next` if
    /// nothing does.
    #[tracing::instrument(level = "trace", skip(self, ctx, outer_next), fields(method = method, path = path))]
    pub fn dispatch(&self, method: &str, path: &str, ctx: &mut Context, outer_next: Next<'_>) {
        let guard = self.inner.read();
        dispatch::dispatch(&guard.root, &guard.options, method, path, ctx, outer_next);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: Arc<AtomicUsize>) -> HandlerRef {
        Arc::new(move |ctx: &mut Context, next: Next<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            next.call(ctx);
        })
    }

    #[test]
    fn static_route_dispatches_to_its_terminator() {
        let router = Router::default();
        let hits = Arc::new(AtomicUsize::new(0));
        router.get("/health", vec![counting_handler(hits.clone())]).unwrap();

        let mut ctx = Context::new();
        router.dispatch("GET", "/health", &mut ctx, Next::noop());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unmatched_path_calls_outer_next() {
        let router = Router::default();
        router.get("/health", vec![counting_handler(Arc::new(AtomicUsize::new(0)))]).unwrap();

        let fallback_hits = Arc::new(AtomicUsize::new(0));
        let fallback_hits_clone = fallback_hits.clone();
        let mut ctx = Context::new();
        router.dispatch(
            "GET",
            "/missing",
            &mut ctx,
            Next::new(Box::new(move |_ctx| {
                fallback_hits_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );
        assert_eq!(fallback_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn parameter_route_binds_its_value_in_context() {
        let router = Router::default();
        let seen_id = Arc::new(std::sync::Mutex::new(None));
        let seen_id_clone = seen_id.clone();
        router
            .get(
                "/users/:id",
                vec![Arc::new(move |ctx: &mut Context, next: Next<'_>| {
                    *seen_id_clone.lock().unwrap() = ctx.params.get("id").cloned();
                    next.call(ctx);
                })],
            )
            .unwrap();

        let mut ctx = Context::new();
        router.dispatch("GET", "/users/42", &mut ctx, Next::noop());
        assert_eq!(seen_id.lock().unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn empty_handler_list_is_rejected() {
        let router = Router::default();
        let err = router.get("/health", vec![]).unwrap_err();
        assert!(matches!(err, RouterError::EmptyHandlerList { .. }));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let router = Router::default();
        let err = router.get("/users/:", vec![counting_handler(Arc::new(AtomicUsize::new(0)))]).unwrap_err();
        assert!(matches!(err, RouterError::Pattern(_)));
    }
}
