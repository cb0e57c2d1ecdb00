use crate::handler::HandlerRef;
use crate::method::MethodKey;
use crate::pattern::ParameterSegment;
use crate::radix::node::{PayloadFactory, RadixNode};
use crate::staged::StagedArray;
use hashbrown::HashMap;
use regex::Regex;
use std::sync::Arc;

/// The two `StagedArray`s a method key owns on a node.
#[derive(Default)]
pub struct MethodBuckets {
    pub middleware: StagedArray<HandlerRef>,
    pub terminators: StagedArray<HandlerRef>,
}

/// A parametric edge attached to a node: owns a disjoint radix sub-tree
/// for whatever pattern follows the parameter.
pub struct ParameterBranch {
    pub name: String,
    pub regex_source: Option<String>,
    pub regex: Option<Arc<Regex>>,
    pub multi: bool,
    pub subtree_root: Box<RadixNode>,
}

impl ParameterBranch {
    /// Two branches are the same registration target when their
    /// `(name, multi, regex source)` tuple matches, per the
    /// deduplication rule on `ParameterBranch`.
    pub fn matches(&self, name: &str, multi: bool, regex_source: Option<&str>) -> bool {
        self.name == name && self.multi == multi && self.regex_source.as_deref() == regex_source
    }
}

/// Per-node storage, created eagerly by the tree's payload factory the
/// moment a node is constructed.
#[derive(Default)]
pub struct NodePayload {
    pub methods: HashMap<MethodKey, MethodBuckets>,
    pub parameter_branches: StagedArray<ParameterBranch>,
}

impl NodePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method_buckets_mut(&mut self, key: MethodKey) -> &mut MethodBuckets {
        self.methods.entry(key).or_default()
    }

    pub fn method_buckets(&self, key: &MethodKey) -> Option<&MethodBuckets> {
        self.methods.get(key)
    }

    /// Finds the branch registered for `param` on this node, creating a
    /// fresh one (with its own disjoint radix sub-tree) if none of the
    /// existing branches share its `(name, multi, regex source)` tuple.
    pub fn find_or_create_branch(
        &mut self,
        param: &ParameterSegment,
        factory: &PayloadFactory,
    ) -> &mut ParameterBranch {
        let index = self
            .parameter_branches
            .position(|branch| branch.matches(&param.name, param.multi, param.regex_source.as_deref()))
            .unwrap_or_else(|| {
                let branch = ParameterBranch {
                    name: param.name.clone(),
                    regex_source: param.regex_source.clone(),
                    regex: param.regex.clone(),
                    multi: param.multi,
                    subtree_root: Box::new(RadixNode::new("", factory)),
                };
                self.parameter_branches.push(param.stage, branch);
                self.parameter_branches.len() - 1
            });

        self.parameter_branches
            .get_mut(index)
            .expect("branch was just found or inserted at `index`")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse;

    fn factory() -> PayloadFactory {
        Arc::new(NodePayload::new)
    }

    /// Parses `/:name...` and returns the parameter segment (the parser
    /// always yields a leading `Literal("/")` segment first).
    fn param(pattern: &str) -> ParameterSegment {
        match parse(pattern).unwrap().into_iter().nth(1).unwrap() {
            crate::pattern::Segment::Parameter(param) => param,
            crate::pattern::Segment::Literal(_) => panic!("expected a parameter segment"),
        }
    }

    #[test]
    fn identical_parameters_share_one_branch() {
        let factory = factory();
        let mut payload = NodePayload::new();
        let first = param("/:id(\\d+)");
        let second = param("/:id(\\d+)");

        payload.find_or_create_branch(&first, &factory);
        payload.find_or_create_branch(&second, &factory);

        assert_eq!(payload.parameter_branches.len(), 1);
    }

    #[test]
    fn differing_regex_source_creates_a_new_branch() {
        let factory = factory();
        let mut payload = NodePayload::new();
        let loose = param("/:id");
        let strict = param("/:id(\\d+)");

        payload.find_or_create_branch(&loose, &factory);
        payload.find_or_create_branch(&strict, &factory);

        assert_eq!(payload.parameter_branches.len(), 2);
    }
}
