use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use crate::error::EmptyTreeError;
use crate::raw::{RawBstMap, RawIter};

mod capacity;
mod order_statistic;

pub use crate::Rank;

/// An ordered map based on an unbalanced [binary search tree] whose nodes
/// carry subtree sizes.
///
/// Given a key type with a [total order], the map stores its entries in key
/// order. Keys must implement [`Ord`]; values are never inspected. Each key is
/// stored once: inserting an existing key replaces its value and leaves the
/// tree shape alone.
///
/// Besides the usual map operations the stored subtree sizes answer
/// order-statistic queries ([`rank`], [`select`], [`floor`], [`ceiling`]) in
/// O(h), where h is the height of the tree.
///
/// Iterators obtained from [`BstMap::iter`], [`BstMap::keys`] or
/// [`BstMap::values`] are lazy and produce items in ascending key order. Every
/// call starts a fresh walk from the root.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key changes while it is in the map.
///
/// # Height
///
/// The tree does not rebalance, so h ranges from log<sub>2</sub>n for random
/// insertion orders up to n for sorted ones. Removing a key with two children
/// always promotes the smallest key of its right subtree, which tends to make
/// the tree lean left over long insert/remove workloads. No operation
/// recurses, so a degenerate tree is slow but never overflows the stack.
///
/// # Examples
///
/// ```
/// use rank_bst::BstMap;
///
/// let mut scores = BstMap::new();
/// scores.insert("carol", 92);
/// scores.insert("alice", 100);
/// scores.insert("bob", 85);
///
/// assert_eq!(scores.get("bob"), Some(&85));
/// assert_eq!(scores.rank("bob"), 1);
/// assert_eq!(scores.min(), Ok(&"alice"));
///
/// scores.remove("alice");
/// for (name, score) in &scores {
///     println!("{name}: {score}");
/// }
/// ```
///
/// A `BstMap` with a known list of items can be initialized from an array:
///
/// ```
/// use rank_bst::BstMap;
///
/// let solar_distance = BstMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(solar_distance.floor("N"), Some(&"Mercury"));
/// ```
///
/// [binary search tree]: https://en.wikipedia.org/wiki/Binary_search_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
/// [`rank`]: BstMap::rank
/// [`select`]: BstMap::select
/// [`floor`]: BstMap::floor
/// [`ceiling`]: BstMap::ceiling
pub struct BstMap<K, V> {
    raw: RawBstMap<K, V>,
}

/// An iterator over the entries of a `BstMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BstMap`].
///
/// # Examples
///
/// ```
/// use rank_bst::BstMap;
///
/// let map = BstMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: BstMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    inner: RawIter<'a, K, V>,
}

/// An iterator over the keys of a `BstMap`, in ascending order.
///
/// This `struct` is created by the [`keys`] method on [`BstMap`].
///
/// [`keys`]: BstMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `BstMap`, in key order.
///
/// This `struct` is created by the [`values`] method on [`BstMap`].
///
/// [`values`]: BstMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An owning iterator over the entries of a `BstMap`, in ascending key order.
///
/// This `struct` is created by the [`into_iter`] method on [`BstMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

impl<K, V> BstMap<K, V> {
    /// Makes a new, empty `BstMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> BstMap<K, V> {
        BstMap { raw: RawBstMap::new() }
    }

    /// Clears the map, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut a = BstMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of elements in the map.
    ///
    /// This is the count stored at the root, so it never walks the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut a = BstMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut a = BstMap::new();
    /// assert!(a.is_empty());
    /// a.insert(1, "a");
    /// assert!(!a.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the smallest key in the map.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyTreeError`] if the map is empty.
    ///
    /// # Complexity
    ///
    /// O(h)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::{BstMap, EmptyTreeError};
    ///
    /// let mut map = BstMap::new();
    /// assert_eq!(map.min(), Err(EmptyTreeError));
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// assert_eq!(map.min(), Ok(&1));
    /// ```
    pub fn min(&self) -> Result<&K, EmptyTreeError> {
        self.raw.min().ok_or(EmptyTreeError)
    }

    /// Returns the largest key in the map.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyTreeError`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.max(), Ok(&2));
    /// ```
    pub fn max(&self) -> Result<&K, EmptyTreeError> {
        self.raw.max().ok_or(EmptyTreeError)
    }

    /// Removes the entry with the smallest key and returns it.
    ///
    /// The removed node is replaced by its right subtree and the counts on the
    /// path back to the root are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyTreeError`] if the map is empty; the map is not touched.
    ///
    /// # Complexity
    ///
    /// O(h)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.delete_min(), Ok((1, "a")));
    /// assert_eq!(map.delete_min(), Ok((2, "b")));
    /// assert!(map.delete_min().is_err());
    /// ```
    pub fn delete_min(&mut self) -> Result<(K, V), EmptyTreeError> {
        self.raw.delete_min().ok_or(EmptyTreeError)
    }

    /// Removes the entry with the largest key and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyTreeError`] if the map is empty; the map is not touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.delete_max(), Ok((2, "b")));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn delete_max(&mut self) -> Result<(K, V), EmptyTreeError> {
        self.raw.delete_max().ok_or(EmptyTreeError)
    }

    /// Returns the number of nodes on the longest path from the root to a
    /// leaf, or 0 for an empty map.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// // Sorted input degrades the tree into a path.
    /// let sorted: BstMap<i32, ()> = (0..10).map(|k| (k, ())).collect();
    /// assert_eq!(sorted.height(), 10);
    ///
    /// let mixed = BstMap::from([(2, ()), (1, ()), (3, ())]);
    /// assert_eq!(mixed.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: RawIter::new(&self.raw),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// The walk is lazy and starts over from the root on every call, so an
    /// unchanged map always yields the same sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(2, "b"), (1, "a")]);
    /// let keys: Vec<_> = map.keys().copied().collect();
    /// assert_eq!(keys, [1, 2]);
    /// assert!(map.keys().eq(keys.iter()));
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(1, "hello"), (2, "goodbye")]);
    /// let values: Vec<&str> = map.values().copied().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> BstMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(h)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns the stored key and its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(String::from("a"), 1)]);
    /// assert_eq!(map.get_key_value("a"), Some((&String::from("a"), &1)));
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::from([(1, "a")]);
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(1, "a")]);
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, a new leaf is attached where
    /// the search fell off the tree, every count on the way back to the root
    /// grows by one, and `None` is returned.
    ///
    /// If the map did have this key present, only the value is updated and the
    /// old value is returned. The stored key, the tree shape and every count
    /// stay as they were.
    ///
    /// # Complexity
    ///
    /// O(h)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map. Removing an absent key changes nothing.
    ///
    /// A node with at most one child is replaced by that child. A node with two
    /// children is replaced by its in-order successor (the smallest key of its
    /// right subtree), which is first unlinked from that subtree.
    ///
    /// # Complexity
    ///
    /// O(h)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::from([(1, "a")]);
    /// assert_eq!(map.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Returns the largest key less than or equal to `key`, or `None` if every
    /// key is larger.
    ///
    /// # Complexity
    ///
    /// O(h)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.floor(&25), Some(&20));
    /// assert_eq!(map.floor(&20), Some(&20));
    /// assert_eq!(map.floor(&5), None);
    /// ```
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.floor(key)
    }

    /// Returns the smallest key greater than or equal to `key`, or `None` if
    /// every key is smaller.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.ceiling(&25), Some(&30));
    /// assert_eq!(map.ceiling(&35), None);
    /// ```
    pub fn ceiling<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.ceiling(key)
    }
}

impl<K: Clone, V: Clone> Clone for BstMap<K, V> {
    fn clone(&self) -> Self {
        BstMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash> Hash for BstMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BstMap<K, V> {
    fn eq(&self, other: &BstMap<K, V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for BstMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for BstMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for BstMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BstMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for BstMap<K, V> {
    fn default() -> Self {
        BstMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BstMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = BstMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for BstMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for BstMap<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BstMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, Q, V> Index<&Q> for BstMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a BstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for BstMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map = BstMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}
