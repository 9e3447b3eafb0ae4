/// A zero-based position in the ascending key order of a [`BstMap`](crate::BstMap).
///
/// # Examples
///
/// ```
/// use rank_bst::{BstMap, Rank};
///
/// let mut map = BstMap::new();
/// map.insert("b", 20);
/// map.insert("a", 10);
///
/// assert_eq!(map[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
