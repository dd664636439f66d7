use alloc::rc::Rc;
use core::cell::Cell;

/// A snapshot of the scroll geometry a list is rendered in.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    /// Scroll position of the scroll container.
    pub scroll_top: u64,
    /// Visible height of the scroll container.
    pub viewport_height: u32,
    /// Top of the list inside the scroll container's content.
    pub list_top: u64,
    /// Top of the scroll container relative to the host viewport (`0` for page scrolling).
    pub scroll_container_top: i64,
    /// Time of the last observed scroll event, in host milliseconds.
    pub last_scroll_at: Option<u64>,
    /// `false` until layout has been read from a host that can measure.
    pub ready: bool,
}

impl ScrollMetrics {
    /// Scroll position relative to the top of the list, never negative.
    pub fn viewport_top_in_list(&self) -> u64 {
        self.scroll_top.saturating_sub(self.list_top)
    }

    /// Whether a scroll event was observed less than `grace_ms` before `now_ms`.
    pub fn scrolled_within(&self, now_ms: u64, grace_ms: u64) -> bool {
        match self.last_scroll_at {
            Some(at) => now_ms.saturating_sub(at) < grace_ms,
            None => false,
        }
    }
}

/// The writable side of a shared [`ScrollMetrics`] read model.
///
/// Exactly one tracker owns the model and updates it; any number of consumers anchored to the
/// same scroll container observe it through [`ScrollMetricsReader`] handles.
#[derive(Debug, Default)]
pub struct ScrollModel {
    cell: Rc<Cell<ScrollMetrics>>,
}

impl ScrollModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ScrollMetrics {
        self.cell.get()
    }

    pub fn set(&self, metrics: ScrollMetrics) {
        self.cell.set(metrics);
    }

    pub fn update(&self, f: impl FnOnce(&mut ScrollMetrics)) {
        let mut m = self.cell.get();
        f(&mut m);
        self.cell.set(m);
    }

    pub fn reader(&self) -> ScrollMetricsReader {
        ScrollMetricsReader {
            cell: Rc::clone(&self.cell),
        }
    }
}

/// A read-only handle onto a [`ScrollModel`].
#[derive(Clone, Debug)]
pub struct ScrollMetricsReader {
    cell: Rc<Cell<ScrollMetrics>>,
}

impl ScrollMetricsReader {
    pub fn get(&self) -> ScrollMetrics {
        self.cell.get()
    }

    pub fn scroll_top(&self) -> u64 {
        self.cell.get().scroll_top
    }

    pub fn viewport_height(&self) -> u32 {
        self.cell.get().viewport_height
    }

    pub fn scroll_container_top(&self) -> i64 {
        self.cell.get().scroll_container_top
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().ready
    }
}
