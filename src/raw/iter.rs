use smallvec::SmallVec;

use super::handle::Handle;
use super::raw_bst_map::RawBstMap;

/// Nodes whose left (front) or right (back) side has been visited but whose own
/// entry has not been yielded yet.
type Spine = SmallVec<[Handle; 32]>;

/// In-order walk over a borrowed tree, usable from both ends.
///
/// Each walk starts from the root, so constructing a new one always restarts
/// the sequence. `remaining` stops the two ends before they cross.
pub(crate) struct RawIter<'a, K, V> {
    tree: &'a RawBstMap<K, V>,
    front: Spine,
    back: Spine,
    remaining: usize,
}

impl<'a, K, V> RawIter<'a, K, V> {
    pub(crate) fn new(tree: &'a RawBstMap<K, V>) -> Self {
        let mut iter = Self {
            tree,
            front: Spine::new(),
            back: Spine::new(),
            remaining: tree.len(),
        };
        iter.descend_left(tree.root());
        iter.descend_right(tree.root());
        iter
    }

    fn descend_left(&mut self, mut link: Option<Handle>) {
        while let Some(handle) = link {
            self.front.push(handle);
            link = self.tree.node(handle).left();
        }
    }

    fn descend_right(&mut self, mut link: Option<Handle>) {
        while let Some(handle) = link {
            self.back.push(handle);
            link = self.tree.node(handle).right();
        }
    }
}

impl<K, V> Clone for RawIter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for RawIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front.pop()?;
        let node = self.tree.node(handle);
        self.descend_left(node.right());
        self.remaining -= 1;
        Some(node.key_value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for RawIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back.pop()?;
        let node = self.tree.node(handle);
        self.descend_right(node.left());
        self.remaining -= 1;
        Some(node.key_value())
    }
}

impl<K, V> ExactSizeIterator for RawIter<'_, K, V> {}
