use super::handle::Handle;

/// Number of nodes in a subtree. Shares the `Handle` niche, so it can never
/// exceed the number of slots the arena can address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Size(Handle);

impl Size {
    pub(crate) const MAX: usize = Handle::MAX;
    pub(crate) const ONE: Self = Self::from_usize(1);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size <= Self::MAX, "`Size::from_usize()` - `size` > `Size::MAX`!");
        Self(Handle::from_index(size))
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0.to_index()
    }

    /// The count of a node whose subtrees hold `left` and `right` nodes.
    #[inline]
    pub(crate) const fn with_children(left: usize, right: usize) -> Self {
        Self::from_usize(left + right + 1)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Size, Option<Size>);
    assert_eq_size!(Size, Handle);

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` > `Size::MAX`!")]
    fn size_past_max_panics() {
        let _ = Size::from_usize(Size::MAX + 1);
    }

    #[test]
    fn leaf_counts_itself() {
        assert_eq!(Size::with_children(0, 0), Size::ONE);
        assert_eq!(Size::from_usize(0).to_usize(), 0);
    }

    proptest! {
        #[test]
        fn count_is_children_plus_one(left in 0..1000usize, right in 0..1000usize) {
            prop_assert_eq!(Size::with_children(left, right).to_usize(), left + right + 1);
        }
    }
}
