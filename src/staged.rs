/// A list of items tagged with an integer stage, preserving insertion
/// order for ties.
///
/// `append` keeps insertion order; `ordered` and `merge_sorted` use a
/// stable sort so ties resolve to insertion order (within one array) or
/// to "earlier array wins" (across merged arrays).
#[derive(Clone, Debug, Default)]
pub struct StagedArray<T> {
    items: Vec<(i32, T)>,
}

impl<T> StagedArray<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends `items` at `stage`, in the order given.
    pub fn append(&mut self, stage: i32, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.items.push((stage, item));
        }
    }

    pub fn push(&mut self, stage: i32, item: T) {
        self.items.push((stage, item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Canonical (stage-ascending, insertion-order-for-ties) order, without
    /// requiring `T: Clone`.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &T> {
        let mut indices: Vec<usize> = (0..self.items.len()).collect();
        indices.sort_by_key(|&index| self.items[index].0);
        indices.into_iter().map(move |index| &self.items[index].1)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index).map(|(_, item)| item)
    }

    /// Index of the first item (in insertion order) matching `predicate`.
    pub fn position(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(|(_, item)| predicate(item))
    }
}

impl<T: Clone> StagedArray<T> {
    /// Returns this array's items in canonical (stage-ascending,
    /// insertion-order-for-ties) order.
    pub fn ordered(&self) -> Vec<T> {
        self.iter_ordered().cloned().collect()
    }

    /// Merges several `StagedArray`s by stage. Ties across arrays are
    /// broken by array position (earlier array wins); ties within one
    /// array keep insertion order. Mirrors a stable merge because the
    /// concatenation already places every item of an earlier array
    /// before every item of a later one, and a stable sort over the
    /// stage key alone cannot reorder past that.
    pub fn merge_sorted(arrays: &[&StagedArray<T>]) -> Vec<T> {
        let mut concatenated: Vec<(i32, T)> = Vec::new();
        for array in arrays {
            concatenated.extend(array.items.iter().cloned());
        }
        concatenated.sort_by_key(|(stage, _)| *stage);
        concatenated.into_iter().map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_keeps_insertion_order_for_equal_stages() {
        let mut array = StagedArray::new();
        array.push(0, "a");
        array.push(0, "b");
        array.push(-1, "c");
        assert_eq!(array.ordered(), vec!["c", "a", "b"]);
    }

    #[test]
    fn merge_sorted_breaks_ties_in_favour_of_earlier_array() {
        let mut a = StagedArray::new();
        a.push(0, "a0");
        a.push(5, "a5");
        let mut b = StagedArray::new();
        b.push(0, "b0");
        b.push(-1, "b-1");

        let merged = StagedArray::merge_sorted(&[&a, &b]);
        assert_eq!(merged, vec!["b-1", "a0", "b0", "a5"]);
    }

    #[test]
    fn merge_sorted_of_empty_inputs_is_empty() {
        let merged: Vec<&str> = StagedArray::merge_sorted(&[]);
        assert!(merged.is_empty());
    }

    #[test]
    fn stage_merge_scenario_matches_spec_ordering() {
        // MIDDLEWARE.middleware {0:m0,10:m10,-5:m-5,5:m5};
        // GET.middleware {-2:g}; ALL.middleware {-3:a}.
        let mut middleware = StagedArray::new();
        middleware.push(0, "m0");
        middleware.push(10, "m10");
        middleware.push(-5, "m-5");
        middleware.push(5, "m5");
        let mut get = StagedArray::new();
        get.push(-2, "g");
        let mut all = StagedArray::new();
        all.push(-3, "a");

        let merged = StagedArray::merge_sorted(&[&middleware, &get, &all]);
        assert_eq!(merged, vec!["m-5", "a", "g", "m0", "m5", "m10"]);
    }

    #[test]
    fn iter_ordered_works_for_non_clone_items() {
        struct NotClone(&'static str);
        let mut array = StagedArray::new();
        array.push(5, NotClone("b"));
        array.push(-1, NotClone("a"));
        let names: Vec<&str> = array.iter_ordered().map(|item| item.0).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn position_finds_first_match_in_insertion_order() {
        let mut array = StagedArray::new();
        array.push(0, "a");
        array.push(0, "b");
        assert_eq!(array.position(|item| *item == "b"), Some(1));
        assert_eq!(array.position(|item| *item == "missing"), None);
    }
}
