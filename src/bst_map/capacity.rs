use super::BstMap;
use crate::raw::RawBstMap;

impl<K, V> BstMap<K, V> {
    /// Creates an empty map with node storage for at least `capacity`
    /// elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_bst::BstMap;
    ///
    /// let map: BstMap<i32, i32> = BstMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        BstMap {
            raw: RawBstMap::with_capacity(capacity),
        }
    }

    /// Returns how many nodes the map can hold before its storage grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
