use alloc::vec::Vec;

/// Cumulative top offsets for every item in a list.
///
/// `offsets[i]` is the distance from the top of the list to the top of item `i`, including the
/// gap after every preceding item. `total` is the extent of the content: the bottom of the last
/// item, without a trailing gap.
///
/// The table is rebuilt in full whenever anything it depends on changes; it is never patched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetTable {
    offsets: Vec<u64>,
    total: u64,
}

impl OffsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table for `count` items in `O(count)`.
    ///
    /// `size_of(i)` returns the height of item `i` (measured if known, otherwise estimated).
    pub fn build(count: usize, mut size_of: impl FnMut(usize) -> u32, gap: u32) -> Self {
        let mut offsets = Vec::with_capacity(count);
        let gap = gap as u64;
        let mut offset = 0u64;
        for i in 0..count {
            offsets.push(offset);
            offset = offset
                .saturating_add(size_of(i) as u64)
                .saturating_add(gap);
        }
        if count > 0 {
            offset = offset.saturating_sub(gap);
        }
        lwtrace!(count, total = offset, "OffsetTable::build");
        Self {
            offsets,
            total: offset,
        }
    }

    /// Same as [`Self::build`] but takes the sizes directly.
    pub fn from_sizes(sizes: &[u32], gap: u32) -> Self {
        Self::build(sizes.len(), |i| sizes[i], gap)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn offset(&self, index: usize) -> Option<u64> {
        self.offsets.get(index).copied()
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Returns the greatest index whose offset is `<= target`.
    ///
    /// An item starting exactly at `target` is the one returned. Targets before the first item,
    /// and empty tables, yield `0`.
    pub fn index_at(&self, target: u64) -> usize {
        // Offsets are non-decreasing, so `partition_point` finds the first offset > target.
        self.offsets
            .partition_point(|&off| off <= target)
            .saturating_sub(1)
    }
}
