//! An ordered map on a size-augmented binary search tree.
//!
//! [`BstMap`] is a plain (unbalanced) binary search tree in which every node
//! also records how many nodes its subtree holds. Those counts make the
//! order-statistic queries run in time proportional to the height of the tree
//! instead of requiring a scan:
//!
//! - [`rank`](BstMap::rank) - How many keys are smaller than a given key
//! - [`select`](BstMap::select) - The entry at a given sorted position
//! - [`floor`](BstMap::floor) / [`ceiling`](BstMap::ceiling) - Nearest key at or below / above
//! - Indexing by [`Rank`] - e.g., `map[Rank(0)]` for the first entry
//!
//! # Example
//!
//! ```
//! use rank_bst::{BstMap, Rank};
//!
//! let mut map = BstMap::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     map.insert(key, key.to_string());
//! }
//!
//! assert_eq!(map.len(), 7);
//! assert_eq!(map.rank(&7), 4);
//! assert_eq!(map.floor(&6), Some(&5));
//! assert_eq!(map[Rank(0)], "1");
//!
//! // 5 has two children, so its in-order successor 7 takes its place.
//! map.remove(&5);
//! assert!(map.keys().copied().eq([1, 3, 4, 7, 8, 9]));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **No recursion** - Every walk uses an explicit stack, so sorted input that
//!   degrades the tree into a path cannot overflow the call stack
//! - **Arena storage** - Nodes live in one vector and are linked by index
//!
//! # Limitations
//!
//! The tree never rebalances. Inserting keys in sorted order produces a tree
//! whose height equals its length, and every operation becomes linear. Removing
//! a node with two children always promotes its in-order successor (Hibbard
//! deletion), which skews the tree further under long insert/remove workloads.
//! [`BstMap::height`] reports the current height.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod bst_map;

pub use bst_map::BstMap;
pub use error::EmptyTreeError;
pub use order_statistic::Rank;
