mod arena;
mod handle;
mod iter;
mod node;
mod raw_bst_map;
mod size;

pub(crate) use iter::RawIter;
pub(crate) use raw_bst_map::RawBstMap;
