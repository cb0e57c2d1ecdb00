use crate::context::Context;
use crate::handler::{drive, HandlerRef, Next};
use crate::method::MethodKey;
use crate::radix::{NodePayload, RadixNode};
use crate::router::options::RouterOptions;
use crate::router::param_guard::ParamGuard;
use crate::staged::StagedArray;
use std::cell::Cell;

#[derive(Clone)]
pub(crate) struct DispatchState {
    pub(crate) method: MethodKey,
    pub(crate) is_head: bool,
    pub(crate) strict_slashes: bool,
}

/// Runs a full dispatch from `root` against `path`, driving whatever
/// handler groups are found and invoking `outer_next` exactly once if no
/// terminal match was ever committed.
pub(crate) fn dispatch(
    root: &RadixNode,
    options: &RouterOptions,
    method: &str,
    path: &str,
    ctx: &mut Context,
    outer_next: Next<'_>,
) {
    let state = DispatchState {
        is_head: MethodKey::named(method) == MethodKey::named("HEAD"),
        method: MethodKey::named(method),
        strict_slashes: options.strict_slashes,
    };

    let matched = Cell::new(false);
    dispatch_from(root, path, Vec::new(), state, ctx, &matched);

    if !matched.get() {
        outer_next.call(ctx);
    }
}

fn is_matchable_remaining(remaining: &str, strict_slashes: bool) -> bool {
    remaining.is_empty() || (!strict_slashes && remaining == "/")
}

fn dispatch_from<'a>(
    node: &'a RadixNode,
    remaining: &'a str,
    accumulator: Vec<&'a StagedArray<HandlerRef>>,
    state: DispatchState,
    ctx: &mut Context,
    matched: &'a Cell<bool>,
) {
    if matched.get() {
        return;
    }

    let next_hop = node.find_descend(remaining);
    let is_terminal = next_hop.is_none();
    let is_boundary = is_terminal
        || node.segment.ends_with('/')
        || next_hop
            .map(|(child, _)| child.segment.starts_with('/'))
            .unwrap_or(false);

    if !is_boundary {
        finish_node(node, remaining, next_hop, accumulator, state, ctx, matched);
        return;
    }

    if is_terminal
        && is_matchable_remaining(remaining, state.strict_slashes)
        && try_terminal_match(node, &state, ctx, &accumulator)
    {
        matched.set(true);
        return;
    }

    let mut accumulator = accumulator;
    let node_middleware = node.payload.method_buckets(&MethodKey::Middleware);
    if let Some(buckets) = node_middleware {
        if !buckets.terminators.is_empty() {
            accumulator.push(&buckets.terminators);
        }
    }
    let middleware_handlers: Vec<HandlerRef> = node_middleware
        .map(|buckets| buckets.middleware.ordered())
        .unwrap_or_default();

    if middleware_handlers.is_empty() {
        finish_node(node, remaining, next_hop, accumulator, state, ctx, matched);
    } else {
        drive(
            &middleware_handlers,
            ctx,
            Box::new(move |ctx| {
                finish_node(node, remaining, next_hop, accumulator, state, ctx, matched);
            }),
        );
    }
}

/// Parameter-branch attempts and the continuation of the static walk:
/// runs after handling the node, regardless of whether the node itself
/// was a segment boundary.
fn finish_node<'a>(
    node: &'a RadixNode,
    remaining: &'a str,
    next_hop: Option<(&'a RadixNode, &'a str)>,
    accumulator: Vec<&'a StagedArray<HandlerRef>>,
    state: DispatchState,
    ctx: &mut Context,
    matched: &'a Cell<bool>,
) {
    if matched.get() {
        return;
    }

    if !node.payload.parameter_branches.is_empty() {
        try_parameter_branches(node, remaining, &accumulator, &state, ctx, matched);
        if matched.get() {
            return;
        }
    }

    if let Some((child, rest)) = next_hop {
        dispatch_from(child, rest, accumulator, state, ctx, matched);
    }
}

fn try_parameter_branches<'a>(
    node: &'a RadixNode,
    remaining: &'a str,
    accumulator: &[&'a StagedArray<HandlerRef>],
    state: &DispatchState,
    ctx: &mut Context,
    matched: &'a Cell<bool>,
) {
    let segment_value = match remaining.find('/') {
        Some(index) => &remaining[..index],
        None => remaining,
    };

    for branch in node.payload.parameter_branches.iter_ordered() {
        let candidate_base: &str = if branch.multi { remaining } else { segment_value };

        let matched_value: &str = match &branch.regex {
            Some(regex) => match regex.find(candidate_base) {
                Some(found) => &candidate_base[..found.end()],
                None => continue,
            },
            None => candidate_base,
        };

        if matched_value.is_empty() && branch.regex.is_none() {
            continue;
        }

        let guard = ParamGuard::bind(ctx, &branch.name, matched_value.to_string());
        let inner_remaining = &remaining[matched_value.len()..];

        dispatch_from(
            &branch.subtree_root,
            inner_remaining,
            accumulator.to_vec(),
            state.clone(),
            ctx,
            matched,
        );

        guard.restore(ctx);
        return;
    }
}

/// Assembles and drives the terminal node's handler groups. Returns
/// `false` (driving nothing) when neither the resolved method nor `ALL`
/// carries any terminators, so the caller falls through to the generic
/// boundary-middleware handling.
fn try_terminal_match(
    node: &RadixNode,
    state: &DispatchState,
    ctx: &mut Context,
    accumulator: &[&StagedArray<HandlerRef>],
) -> bool {
    let payload: &NodePayload = &node.payload;

    let mut effective_method = state.method.clone();
    let mut method_data = payload.method_buckets(&effective_method);
    let mut head_method_data = None;

    if state.is_head {
        let no_head_terminators = method_data.map_or(true, |buckets| buckets.terminators.is_empty());
        if no_head_terminators {
            head_method_data = method_data;
            effective_method = MethodKey::named("GET");
            method_data = payload.method_buckets(&effective_method);
        }
    }

    let all_data = payload.method_buckets(&MethodKey::All);

    let has_terminators = method_data.map_or(false, |buckets| !buckets.terminators.is_empty())
        || all_data.map_or(false, |buckets| !buckets.terminators.is_empty());

    if !has_terminators {
        return false;
    }

    let node_middleware = payload.method_buckets(&MethodKey::Middleware);

    let mut arrays: Vec<&StagedArray<HandlerRef>> = Vec::new();
    if let Some(buckets) = node_middleware {
        arrays.push(&buckets.middleware);
    }
    arrays.extend(accumulator.iter().copied());
    if let Some(buckets) = node_middleware {
        arrays.push(&buckets.terminators);
    }
    if let Some(buckets) = head_method_data {
        arrays.push(&buckets.middleware);
    }
    if let Some(buckets) = method_data {
        arrays.push(&buckets.middleware);
    }
    if let Some(buckets) = all_data {
        arrays.push(&buckets.middleware);
    }

    let group = StagedArray::merge_sorted(&arrays);
    let method_terminators = method_data.map(|buckets| buckets.terminators.ordered()).unwrap_or_default();
    let all_terminators = all_data.map(|buckets| buckets.terminators.ordered()).unwrap_or_default();

    drive(
        &group,
        ctx,
        Box::new(move |ctx| {
            drive(
                &method_terminators,
                ctx,
                Box::new(move |ctx| {
                    drive(&all_terminators, ctx, Box::new(|_ctx| {}));
                }),
            );
        }),
    );

    true
}
