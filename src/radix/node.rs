use crate::radix::payload::NodePayload;
use std::sync::Arc;
use tracing::trace;

/// Constructs a fresh [`NodePayload`] for every node the tree creates.
///
/// Kept as an injected factory (rather than a bare `Default::default`
/// call) so a tree can be created once with whatever per-node setup a
/// caller needs.
pub type PayloadFactory = Arc<dyn Fn() -> NodePayload + Send + Sync>;

/// One node of the radix tree: an edge label plus the sub-tree hanging
/// off it.
///
/// Children are kept in creation order and linearly scanned. First
/// character uniqueness bounds the scan to the sibling count, which is
/// small in practice.
pub struct RadixNode {
    pub segment: String,
    pub children: Vec<Box<RadixNode>>,
    pub payload: NodePayload,
}

impl RadixNode {
    pub fn new(segment: impl Into<String>, factory: &PayloadFactory) -> Self {
        Self {
            segment: segment.into(),
            children: Vec::new(),
            payload: factory(),
        }
    }

    /// Descends (creating nodes as needed) so that walking from `self`
    /// by `path` ends exactly at the returned node.
    ///
    /// Splits an existing child when `path` only shares a partial
    /// prefix with its label; creates a new child when no sibling
    /// shares `path`'s first character.
    pub fn find_or_create(&mut self, path: &str, factory: &PayloadFactory) -> &mut RadixNode {
        if path.is_empty() {
            return self;
        }

        if let Some(index) = self.matching_child_index(path) {
            let prefix_len = common_prefix_len(&self.children[index].segment, path);
            if prefix_len == self.children[index].segment.len() {
                let remaining = &path[prefix_len..];
                return self.children[index].find_or_create(remaining, factory);
            }

            self.split_child(index, prefix_len, factory);
            let remaining = &path[prefix_len..];
            return self.children[index].find_or_create(remaining, factory);
        }

        trace!(segment = path, "creating new radix child");
        self.children.push(Box::new(RadixNode::new(path, factory)));
        let last = self.children.len() - 1;
        self.children[last].find_or_create("", factory)
    }

    /// Like [`Self::find_or_create`] but never mutates the tree.
    pub fn find_exact(&self, path: &str) -> Option<&RadixNode> {
        if path.is_empty() {
            return Some(self);
        }
        let index = self.matching_child_index(path)?;
        let child = &self.children[index];
        let prefix_len = common_prefix_len(&child.segment, path);
        if prefix_len != child.segment.len() {
            return None;
        }
        child.find_exact(&path[prefix_len..])
    }

    /// Finds the unique child, if any, whose label fully consumes a
    /// prefix of `remaining` (i.e. the walk's next static hop). Returns
    /// `None` both when no child shares `remaining`'s first character
    /// and when the best-matching child's label only partially
    /// overlaps `remaining` (no route was ever registered down that
    /// path, so the walk cannot continue).
    pub fn find_descend(&self, remaining: &str) -> Option<(&RadixNode, &str)> {
        let index = self.matching_child_index(remaining)?;
        let child = &self.children[index];
        let prefix_len = common_prefix_len(&child.segment, remaining);
        if prefix_len == child.segment.len() {
            Some((child, &remaining[prefix_len..]))
        } else {
            None
        }
    }

    /// Walks `path` from `self`, yielding `(node, remaining)` for the
    /// starting node (with the full `path`) and then for every node
    /// reached by a successful static descent.
    ///
    /// The returned cursor supports mid-iteration rewriting: a caller may
    /// call [`Walk::rewrite`] after receiving an item to substitute a new
    /// remaining path before the next static hop is computed from it.
    /// Parameter dispatch does not need this today, since it recurses into
    /// a fresh walk of the branch's sub-tree instead.
    pub fn walk<'a>(&'a self, path: &'a str) -> Walk<'a> {
        Walk {
            pending: (self, path),
            first: true,
            exhausted: false,
        }
    }

    fn matching_child_index(&self, path: &str) -> Option<usize> {
        let first = path.chars().next()?;
        self.children
            .iter()
            .position(|child| child.segment.chars().next() == Some(first))
    }

    fn split_child(&mut self, index: usize, prefix_len: usize, factory: &PayloadFactory) {
        let mut old_child = self.children.remove(index);
        let common_prefix = old_child.segment[..prefix_len].to_string();
        let suffix = old_child.segment[prefix_len..].to_string();
        old_child.segment = suffix;

        let mut intermediate = Box::new(RadixNode::new(common_prefix, factory));
        intermediate.children.push(old_child);
        self.children.insert(index, intermediate);
    }
}

/// Cursor produced by [`RadixNode::walk`].
pub struct Walk<'a> {
    pending: (&'a RadixNode, &'a str),
    first: bool,
    exhausted: bool,
}

impl<'a> Walk<'a> {
    /// Substitutes `new_remaining` for the remaining path attributed to
    /// the most recently yielded node, so the next [`Iterator::next`]
    /// call computes its static descent from `new_remaining` instead of
    /// the path that was originally yielded.
    pub fn rewrite(&mut self, new_remaining: &'a str) {
        self.pending.1 = new_remaining;
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a RadixNode, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if self.first {
            self.first = false;
            return Some(self.pending);
        }

        let (node, remaining) = self.pending;
        match node.find_descend(remaining) {
            Some(step) => {
                self.pending = step;
                Some(self.pending)
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = 0;
    let mut a_chars = a.char_indices();
    let mut b_chars = b.char_indices();
    loop {
        match (a_chars.next(), b_chars.next()) {
            (Some((_, ca)), Some((_, cb))) if ca == cb => len += ca.len_utf8(),
            _ => break,
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> PayloadFactory {
        Arc::new(NodePayload::new)
    }

    #[test]
    fn find_or_create_builds_exact_paths() {
        let factory = factory();
        let mut root = RadixNode::new("", &factory);
        root.find_or_create("/about/us", &factory);
        assert!(root.find_exact("/about/us").is_some());
        assert!(root.find_exact("/about").is_none());
    }

    #[test]
    fn find_or_create_splits_shared_prefix() {
        let factory = factory();
        let mut root = RadixNode::new("", &factory);
        root.find_or_create("/aa", &factory);
        root.find_or_create("/ab", &factory);

        assert!(root.find_exact("/aa").is_some());
        assert!(root.find_exact("/ab").is_some());
        assert!(root.find_exact("/a").is_some());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].segment, "/a");
        assert_eq!(root.children[0].children.len(), 2);
    }

    #[test]
    fn no_two_children_share_a_first_character() {
        let factory = factory();
        let mut root = RadixNode::new("", &factory);
        root.find_or_create("/aa", &factory);
        root.find_or_create("/bb", &factory);
        root.find_or_create("/ac", &factory);

        let mut seen = std::collections::HashSet::new();
        for child in &root.children {
            let first = child.segment.chars().next().unwrap();
            assert!(seen.insert(first), "duplicate first character {first}");
        }
    }

    #[test]
    fn walk_yields_root_first_then_each_descended_child() {
        let factory = factory();
        let mut root = RadixNode::new("", &factory);
        root.find_or_create("/about/us", &factory);

        let labels: Vec<&str> = root.walk("/about/us").map(|(node, _)| node.segment.as_str()).collect();
        assert_eq!(labels, vec!["", "/about/us"]);
    }

    #[test]
    fn walk_rewrite_changes_the_next_descent() {
        let factory = factory();
        let mut root = RadixNode::new("", &factory);
        root.find_or_create("/about/us", &factory);
        root.find_or_create("/shop", &factory);

        let mut walker = root.walk("/about/us");
        let (_root_node, _remaining) = walker.next().unwrap();
        walker.rewrite("/shop");
        let (node, remaining) = walker.next().unwrap();
        assert_eq!(node.segment, "/shop");
        assert_eq!(remaining, "");
    }

    #[test]
    fn find_descend_requires_full_child_label_match() {
        let factory = factory();
        let mut root = RadixNode::new("", &factory);
        root.find_or_create("/about/us", &factory);

        let (node, remaining) = root.find_descend("/about/us/extra").unwrap();
        assert_eq!(node.segment, "/about/us");
        assert_eq!(remaining, "/extra");

        assert!(root.find_descend("/abo").is_none());
    }
}
