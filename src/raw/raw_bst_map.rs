use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use super::size::Size;

/// The core binary search tree backing `BstMap`.
///
/// Nodes are owned by the arena; the tree structure is expressed purely through
/// `left`/`right` handles, and each handle appears in at most one link.
#[derive(Clone)]
pub(crate) struct RawBstMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

/// One step of a downward walk: the node visited and the link taken out of it.
struct PathElement {
    node: Handle,
    side: Side,
}

/// The nodes above the current position of a walk, root first.
type Path = SmallVec<[PathElement; 32]>;

impl<K, V> RawBstMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of key-value pairs, read from the root's count.
    pub(crate) fn len(&self) -> usize {
        self.size_of(self.root)
    }

    /// Returns true if the tree contains no elements.
    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        let dropped = self.len();
        self.nodes.clear();
        self.root = None;
        tracing::trace!(dropped, "cleared tree");
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Subtree size behind a link; an empty link holds zero nodes.
    fn size_of(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |handle| self.nodes.get(handle).size().to_usize())
    }

    /// Recomputes the stored count of `handle` from its children.
    fn update_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = Size::with_children(self.size_of(node.left()), self.size_of(node.right()));
        self.nodes.get_mut(handle).set_size(size);
    }

    /// Unwinds `path` bottom-up. Each element receives the new root of the
    /// subtree below it in the link it was left through, then recounts itself
    /// and becomes the subtree handed to its parent. Returns the new root of
    /// the walked tree.
    fn relink(&mut self, path: &mut Path, mut subtree: Option<Handle>) -> Option<Handle> {
        while let Some(PathElement { node, side }) = path.pop() {
            self.nodes.get_mut(node).set_child(side, subtree);
            self.update_size(node);
            subtree = Some(node);
        }
        subtree
    }

    /// Follows links on one side until they run out.
    fn extreme(&self, from: Handle, side: Side) -> Handle {
        let mut current = from;
        while let Some(next) = self.nodes.get(current).child(side) {
            current = next;
        }
        current
    }

    /// Unlinks the outermost node on `side` of the subtree rooted at `subtree`,
    /// splicing its opposite child into its place.
    ///
    /// Returns the detached node and the new root of the subtree.
    fn detach_extreme(&mut self, subtree: Handle, side: Side) -> (Handle, Option<Handle>) {
        let mut path = Path::new();
        let mut current = subtree;
        while let Some(next) = self.nodes.get(current).child(side) {
            path.push(PathElement { node: current, side });
            current = next;
        }

        let orphan = match side {
            Side::Left => self.nodes.get(current).right(),
            Side::Right => self.nodes.get(current).left(),
        };
        let root = self.relink(&mut path, orphan);
        (current, root)
    }

    /// Returns the smallest key.
    pub(crate) fn min(&self) -> Option<&K> {
        let root = self.root?;
        Some(self.nodes.get(self.extreme(root, Side::Left)).key())
    }

    /// Returns the largest key.
    pub(crate) fn max(&self) -> Option<&K> {
        let root = self.root?;
        Some(self.nodes.get(self.extreme(root, Side::Right)).key())
    }

    /// Removes and returns the entry with the smallest key.
    pub(crate) fn delete_min(&mut self) -> Option<(K, V)> {
        self.delete_extreme(Side::Left)
    }

    /// Removes and returns the entry with the largest key.
    pub(crate) fn delete_max(&mut self) -> Option<(K, V)> {
        self.delete_extreme(Side::Right)
    }

    fn delete_extreme(&mut self, side: Side) -> Option<(K, V)> {
        let root = self.root?;
        let (removed, root) = self.detach_extreme(root, side);
        self.root = root;
        let remaining = self.len();
        tracing::trace!(?side, remaining, "deleted extreme entry");
        Some(self.nodes.take(removed).into_key_value())
    }

    /// Returns the entry at zero-based position `rank` in key order.
    fn select(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }

        let mut rank = rank;
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            let left = self.size_of(node.left());
            match rank.cmp(&left) {
                Ordering::Less => link = node.left(),
                Ordering::Equal => return Some(current),
                Ordering::Greater => {
                    rank -= left + 1;
                    link = node.right();
                }
            }
        }
        None
    }

    pub(crate) fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        let handle = self.select(rank)?;
        Some(self.nodes.get(handle).key_value())
    }

    pub(crate) fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let handle = self.select(rank)?;
        Some(self.nodes.get_mut(handle).key_value_mut())
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        if let Some(root) = self.root {
            pending.push((root, 1));
        }

        while let Some((handle, depth)) = pending.pop() {
            height = height.max(depth);
            let node = self.nodes.get(handle);
            for child in [node.left(), node.right()].into_iter().flatten() {
                pending.push((child, depth + 1));
            }
        }
        height
    }

    /// Moves every entry out in ascending key order and leaves the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> alloc::vec::Vec<(K, V)> {
        let mut result = alloc::vec::Vec::with_capacity(self.len());
        let mut pending: SmallVec<[Handle; 32]> = SmallVec::new();
        let mut link = self.root.take();

        loop {
            while let Some(handle) = link {
                pending.push(handle);
                link = self.nodes.get(handle).left();
            }
            let Some(handle) = pending.pop() else {
                break;
            };
            let node = self.nodes.take(handle);
            link = node.right();
            result.push(node.into_key_value());
        }

        self.nodes.clear();
        result
    }
}

impl<K: Ord, V> RawBstMap<K, V> {
    /// Walks from the root towards `key`, recording every step in `path`.
    ///
    /// Returns the node holding `key`, or `None` once the walk falls off the
    /// tree; in that case `path` ends at the node whose empty link `key`
    /// belongs in.
    fn descend<Q>(&self, key: &Q, path: &mut Path) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            let side = match key.cmp(node.key().borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(current),
            };
            path.push(PathElement { node: current, side });
            link = node.child(side);
        }
        None
    }

    /// Finds the node holding `key` without recording a path.
    fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            link = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(current),
            };
        }
        None
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get(handle).value())
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut())
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get(handle).key_value())
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present; the stored key
    /// and the shape of the tree are left untouched in that case.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut path = Path::new();
        if let Some(existing) = self.descend(&key, &mut path) {
            return Some(mem::replace(self.nodes.get_mut(existing).value_mut(), value));
        }

        let leaf = self.nodes.alloc(Node::new(key, value));
        self.root = self.relink(&mut path, Some(leaf));
        debug_assert_eq!(self.len(), self.nodes.len(), "root count disagrees with live nodes");
        None
    }

    /// Removes `key` and returns its entry. A missing key leaves the tree
    /// untouched.
    ///
    /// A node with two children is replaced by its in-order successor, which
    /// is always taken from the right subtree. Repeated removals therefore
    /// skew the tree to the left over time.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let target = self.descend(key, &mut path)?;

        let node = self.nodes.get(target);
        let (left, right) = (node.left(), node.right());
        let replacement = match right {
            None => left,
            Some(right) => {
                let (successor, rest) = self.detach_extreme(right, Side::Left);
                let spliced = self.nodes.get_mut(successor);
                spliced.set_left(left);
                spliced.set_right(rest);
                self.update_size(successor);
                tracing::trace!(
                    left_size = self.size_of(left),
                    right_size = self.size_of(rest),
                    "spliced in-order successor"
                );
                Some(successor)
            }
        };

        self.root = self.relink(&mut path, replacement);
        let entry = self.nodes.take(target).into_key_value();
        debug_assert_eq!(self.len(), self.nodes.len(), "root count disagrees with live nodes");
        Some(entry)
    }

    /// Returns the largest key less than or equal to `key`.
    pub(crate) fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut candidate = None;
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(node.key()),
                Ordering::Less => link = node.left(),
                Ordering::Greater => {
                    candidate = Some(node.key());
                    link = node.right();
                }
            }
        }
        candidate
    }

    /// Returns the smallest key greater than or equal to `key`.
    pub(crate) fn ceiling<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut candidate = None;
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(node.key()),
                Ordering::Greater => link = node.right(),
                Ordering::Less => {
                    candidate = Some(node.key());
                    link = node.left();
                }
            }
        }
        candidate
    }

    /// Counts the keys strictly less than `key`.
    pub(crate) fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut rank = 0;
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => link = node.left(),
                Ordering::Greater => {
                    rank += 1 + self.size_of(node.left());
                    link = node.right();
                }
                Ordering::Equal => return rank + self.size_of(node.left()),
            }
        }
        rank
    }

    /// Returns the rank of `key` only if it is present.
    pub(crate) fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut rank = 0;
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => link = node.left(),
                Ordering::Greater => {
                    rank += 1 + self.size_of(node.left());
                    link = node.right();
                }
                Ordering::Equal => return Some(rank + self.size_of(node.left())),
            }
        }
        None
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::raw::RawIter;
    use alloc::collections::{BTreeMap, BTreeSet};
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K: Ord + Clone + core::fmt::Debug, V> RawBstMap<K, V> {
        /// Asserts ordering, count consistency, uniqueness and exclusive
        /// ownership of every handle.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();
            let mut seen: BTreeSet<usize> = BTreeSet::new();

            let counted = self.validate_node(self.root, None, None, &mut seen, &mut errors);

            if counted != self.len() {
                errors.push(alloc::format!("len mismatch: root count={}, actual={counted}", self.len()));
            }
            if self.nodes.len() != counted {
                errors.push(alloc::format!("arena holds {} nodes but {counted} are reachable", self.nodes.len()));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns the number of nodes actually reachable below `link`.
        fn validate_node(
            &self,
            link: Option<Handle>,
            lower: Option<&K>,
            upper: Option<&K>,
            seen: &mut BTreeSet<usize>,
            errors: &mut Vec<String>,
        ) -> usize {
            let Some(handle) = link else {
                return 0;
            };
            if !seen.insert(handle.to_index()) {
                errors.push(alloc::format!("handle {handle:?} is linked twice"));
                return 0;
            }

            let node = self.nodes.get(handle);
            let key = node.key();
            if lower.is_some_and(|lower| key <= lower) || upper.is_some_and(|upper| key >= upper) {
                errors.push(alloc::format!("key {key:?} outside ({lower:?}, {upper:?})"));
            }

            let left = self.validate_node(node.left(), lower, Some(key), seen, errors);
            let right = self.validate_node(node.right(), Some(key), upper, seen, errors);
            let actual = left + right + 1;
            if node.size().to_usize() != actual {
                errors.push(alloc::format!(
                    "count mismatch at {key:?}: stored={}, actual={actual}",
                    node.size().to_usize()
                ));
            }
            actual
        }

        fn keys_in_order(&self) -> Vec<K> {
            RawIter::new(self).map(|(key, _)| key.clone()).collect()
        }
    }

    fn scenario() -> RawBstMap<i32, String> {
        let mut tree = RawBstMap::new();
        for key in [5, 3, 8, 1, 4, 7, 9] {
            tree.insert(key, alloc::format!("{key}"));
        }
        tree
    }

    #[test]
    fn scenario_order_statistics() {
        let tree = scenario();
        tree.validate_invariants();

        assert_eq!(tree.len(), 7);
        assert_eq!(tree.keys_in_order(), [1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(tree.rank(&7), 4);
        assert_eq!(tree.floor(&6), Some(&5));
        assert_eq!(tree.ceiling(&6), Some(&7));
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn two_child_removal_promotes_successor() {
        let mut tree = scenario();

        assert_eq!(tree.remove(&5), Some((5, String::from("5"))));
        tree.validate_invariants();

        let root = tree.node(tree.root().expect("tree is not empty"));
        assert_eq!(*root.key(), 7);
        assert_eq!(root.left().map(|left| *tree.node(left).key()), Some(3));
        let right = tree.node(root.right().expect("8 keeps its place"));
        assert_eq!(*right.key(), 8);
        assert_eq!(right.left(), None);
        assert_eq!(root.size().to_usize(), 6);

        assert_eq!(tree.keys_in_order(), [1, 3, 4, 7, 8, 9]);
        assert_eq!(tree.delete_min(), Some((1, String::from("1"))));
        tree.validate_invariants();
        assert_eq!(tree.keys_in_order(), [3, 4, 7, 8, 9]);
    }

    #[test]
    fn successor_deep_in_right_subtree() {
        let mut tree = RawBstMap::new();
        for key in [10, 5, 20, 15, 25, 12, 17, 13] {
            tree.insert(key, key);
        }

        tree.remove(&10);
        tree.validate_invariants();

        let root = tree.node(tree.root().expect("tree is not empty"));
        assert_eq!(*root.key(), 12);
        // 12's right child 13 moved up into the slot 12 left behind.
        let fifteen = tree.node(tree.node(root.right().expect("right subtree")).left().expect("15"));
        assert_eq!(*fifteen.key(), 15);
        assert_eq!(fifteen.left().map(|h| *tree.node(h).key()), Some(13));
    }

    #[test]
    fn removal_without_right_child_lifts_left_subtree() {
        let mut tree = RawBstMap::new();
        for key in [4, 2, 1, 3] {
            tree.insert(key, ());
        }

        tree.remove(&4);
        tree.validate_invariants();
        assert_eq!(tree.node(tree.root().expect("tree is not empty")).key(), &2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn missing_key_removal_is_noop() {
        let mut tree = scenario();
        let before_root = tree.root();

        assert_eq!(tree.remove(&6), None);
        tree.validate_invariants();
        assert_eq!(tree.root(), before_root);
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn empty_tree_edges() {
        let mut tree: RawBstMap<i32, i32> = RawBstMap::new();
        tree.validate_invariants();

        assert_eq!(tree.len(), 0);
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert_eq!(tree.delete_min(), None);
        assert_eq!(tree.delete_max(), None);
        assert_eq!(tree.floor(&0), None);
        assert_eq!(tree.rank(&0), 0);
        assert_eq!(tree.get_by_rank(0), None);
        assert_eq!(tree.height(), 0);
        assert!(tree.drain_to_vec().is_empty());
    }

    #[test]
    fn overwrite_keeps_shape_and_counts() {
        let mut tree = scenario();
        let root = tree.root();

        assert_eq!(tree.insert(4, String::from("four")), Some(String::from("4")));
        tree.validate_invariants();
        assert_eq!(tree.root(), root);
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.get(&4).map(String::as_str), Some("four"));
    }

    #[test]
    fn sorted_inserts_degrade_to_a_path() {
        let mut tree = RawBstMap::new();
        for key in 0..2_000 {
            tree.insert(key, key);
        }
        tree.validate_invariants();

        assert_eq!(tree.height(), 2_000);
        assert_eq!(tree.rank(&1_500), 1_500);
        assert_eq!(tree.get_by_rank(1_999), Some((&1_999, &1_999)));
        assert_eq!(tree.remove(&0), Some((0, 0)));
        assert_eq!(tree.delete_max(), Some((1_999, 1_999)));
        assert_eq!(tree.len(), 1_998);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        DeleteMin,
        DeleteMax,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..1000).prop_map(Op::Insert),
            3 => (0i32..1000).prop_map(Op::Remove),
            1 => Just(Op::DeleteMin),
            1 => Just(Op::DeleteMax),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawBstMap<i32, i32> = RawBstMap::new();
            let mut model: BTreeMap<i32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        prop_assert_eq!(tree.insert(key, key * 2), model.insert(key, key * 2));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove(&key), model.remove_entry(&key));
                    }
                    Op::DeleteMin => {
                        prop_assert_eq!(tree.delete_min(), model.pop_first());
                    }
                    Op::DeleteMax => {
                        prop_assert_eq!(tree.delete_max(), model.pop_last());
                    }
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(tree.min(), model.keys().next());
                prop_assert_eq!(tree.max(), model.keys().next_back());
            }
        }

        #[test]
        fn order_statistics_match_model(
            keys in prop::collection::btree_set(0i32..500, 0..200),
            probes in prop::collection::vec(-10i32..510, 1..50),
        ) {
            let mut tree: RawBstMap<i32, i32> = RawBstMap::new();
            for &key in &keys {
                tree.insert(key, -key);
            }
            let sorted: Vec<i32> = keys.iter().copied().collect();

            for probe in probes {
                let below = sorted.partition_point(|&key| key < probe);
                prop_assert_eq!(tree.rank(&probe), below);
                prop_assert_eq!(tree.rank_of(&probe), keys.contains(&probe).then_some(below));
                prop_assert_eq!(tree.floor(&probe), keys.range(..=probe).next_back());
                prop_assert_eq!(tree.ceiling(&probe), keys.range(probe..).next());
            }

            for (rank, key) in sorted.iter().enumerate() {
                prop_assert_eq!(tree.get_by_rank(rank), Some((key, &-key)));
            }
            prop_assert_eq!(tree.get_by_rank(sorted.len()), None);
        }

        #[test]
        fn drain_yields_sorted_entries(keys in prop::collection::vec(0i32..1000, 0..300)) {
            let mut tree: RawBstMap<i32, ()> = RawBstMap::new();
            let mut model = BTreeSet::new();
            for key in keys {
                tree.insert(key, ());
                model.insert(key);
            }

            let drained: Vec<i32> = tree.drain_to_vec().into_iter().map(|(key, ())| key).collect();
            prop_assert_eq!(drained, model.into_iter().collect::<Vec<_>>());
            prop_assert!(tree.is_empty());
            tree.validate_invariants();
        }
    }

    #[test]
    fn get_by_rank_mut_modifies_value() {
        let mut tree: RawBstMap<i32, i32> = RawBstMap::new();
        for key in [50, 20, 80, 10, 30] {
            tree.insert(key, key * 2);
        }

        {
            let (key, value) = tree.get_by_rank_mut(2).expect("should have rank 2");
            assert_eq!(*key, 30);
            *value = 999;
        }

        tree.validate_invariants();
        assert_eq!(tree.get(&30), Some(&999));
        assert_eq!(tree.get(&20), Some(&40));
    }
}
