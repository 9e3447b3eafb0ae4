use thiserror::Error;

/// Returned by operations that need at least one entry, such as
/// [`BstMap::min`](crate::BstMap::min) or
/// [`BstMap::delete_min`](crate::BstMap::delete_min), when the map is empty.
///
/// A missing key is never reported through this type; lookups and removals
/// of absent keys return `None` instead.
///
/// # Examples
///
/// ```
/// use rank_bst::{BstMap, EmptyTreeError};
///
/// let mut map: BstMap<i32, &str> = BstMap::new();
/// assert_eq!(map.min(), Err(EmptyTreeError));
/// assert_eq!(map.delete_min(), Err(EmptyTreeError));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
#[error("operation requires a non-empty tree")]
pub struct EmptyTreeError;
