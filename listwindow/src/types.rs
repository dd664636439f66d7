use core::ops::Range;

/// A half-open range of item indexes, `[start, end)`.
///
/// Every query in this crate returns windows with `0 <= start <= end <= count`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    pub start: usize,
    pub end: usize, // exclusive
}

impl VisibleWindow {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "window start past end ({start} > {end})");
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    pub fn indexes(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<VisibleWindow> for Range<usize> {
    fn from(w: VisibleWindow) -> Self {
        w.indexes()
    }
}

/// Window of a uniform-height list together with the filler heights around it.
///
/// `top_spacer` and `bottom_spacer` let the caller size the scroll content to the full list
/// while only rendering `[start, end)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedWindow {
    pub start: usize,
    pub end: usize, // exclusive
    pub top_spacer: u64,
    pub bottom_spacer: u64,
}

impl FixedWindow {
    pub fn new(window: VisibleWindow, row_height: u32, count: usize) -> Self {
        let h = row_height as u64;
        Self {
            start: window.start,
            end: window.end,
            top_spacer: (window.start as u64).saturating_mul(h),
            bottom_spacer: (count.saturating_sub(window.end) as u64).saturating_mul(h),
        }
    }

    pub fn window(&self) -> VisibleWindow {
        VisibleWindow {
            start: self.start,
            end: self.end,
        }
    }
}
