use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use super::BstMap;
use crate::Rank;

impl<K, V> BstMap<K, V> {
    /// Returns the key at zero-based position `rank` in sorted order, or
    /// `None` if `rank` is out of bounds.
    ///
    /// The walk compares `rank` with the size of each left subtree, so it
    /// never visits more than one node per level.
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
    /// let map = BstMap::from([(30, "c"), (10, "a"), (20, "b")]);
    /// assert_eq!(map.select(0), Some(&10));
    /// assert_eq!(map.select(2), Some(&30));
    /// assert_eq!(map.select(3), None);
    /// ```
    #[must_use]
    pub fn select(&self, rank: usize) -> Option<&K> {
        self.raw.get_by_rank(rank).map(|(key, _)| key)
    }

    /// Returns the key-value pair at position `rank` in sorted order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert("a", 10);
    /// map.insert("c", 30);
    /// map.insert("b", 20);
    ///
    /// assert_eq!(map.get_by_rank(1), Some((&"b", &20)));
    /// assert!(map.get_by_rank(3).is_none());
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.raw.get_by_rank(rank)
    }

    /// Returns the key and a mutable reference to the value at position
    /// `rank` in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert(10, "a");
    /// map.insert(5, "b");
    ///
    /// if let Some((key, value)) = map.get_by_rank_mut(0) {
    ///     assert_eq!(*key, 5);
    ///     *value = "updated";
    /// }
    ///
    /// assert_eq!(map.get(&5), Some(&"updated"));
    /// ```
    #[must_use]
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        self.raw.get_by_rank_mut(rank)
    }
}

impl<K: Ord, V> BstMap<K, V> {
    /// Returns the number of keys strictly less than `key`. The key itself
    /// does not have to be in the map.
    ///
    /// Every time the walk turns right it adds the current node and the size
    /// of its left subtree; an exact match adds only its left subtree.
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
    /// let map = BstMap::from([(10, "a"), (20, "b"), (30, "c")]);
    /// assert_eq!(map.rank(&5), 0);
    /// assert_eq!(map.rank(&20), 1);
    /// assert_eq!(map.rank(&25), 2);
    /// assert_eq!(map.rank(&99), 3);
    /// ```
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank(key)
    }

    /// Returns the zero-based rank of `key` in sorted order, or `None` if the
    /// key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert(10, "a");
    /// map.insert(20, "b");
    ///
    /// assert_eq!(map.rank_of(&20), Some(1));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank_of(key)
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use rank_bst::{BstMap, Rank};
///
/// let map = BstMap::from([("b", 2), ("a", 1)]);
/// assert_eq!(map[Rank(0)], 1);
/// ```
impl<K, V> Index<Rank> for BstMap<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_by_rank(rank.0).map(|(_, v)| v).expect("rank out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use rank_bst::{BstMap, Rank};
///
/// let mut map = BstMap::from([("a", 1), ("b", 2)]);
/// map[Rank(1)] = 5;
///
/// assert_eq!(map.get(&"b"), Some(&5));
/// ```
impl<K, V> IndexMut<Rank> for BstMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.get_by_rank_mut(rank.0).map(|(_, v)| v).expect("rank out of bounds")
    }
}
