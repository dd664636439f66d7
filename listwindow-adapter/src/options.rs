use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use listwindow::SizePolicy;

use crate::host::ScrollContainer;
use crate::tracker::ScrollParentResolver;

/// Returns the stable identity of an item, or `None` if it has none.
///
/// Unkeyed items are always laid out from their estimate; their measurements are not kept.
pub type KeyFn<T, K> = Arc<dyn Fn(&T, usize) -> Option<K>>;

/// Height used for items that have not been measured yet.
pub enum Estimate<T> {
    Fixed(u32),
    PerItem(Arc<dyn Fn(&T, usize) -> u32>),
}

impl<T> Estimate<T> {
    pub fn per_item(f: impl Fn(&T, usize) -> u32 + 'static) -> Self {
        Self::PerItem(Arc::new(f))
    }

    pub fn size_of(&self, item: &T, index: usize) -> u32 {
        match self {
            Self::Fixed(px) => *px,
            Self::PerItem(f) => f(item, index),
        }
    }
}

impl<T> Clone for Estimate<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(px) => Self::Fixed(*px),
            Self::PerItem(f) => Self::PerItem(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Estimate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(px) => f.debug_tuple("Fixed").field(px).finish(),
            Self::PerItem(_) => f.write_str("PerItem(..)"),
        }
    }
}

/// Configuration for [`crate::VariableList`].
///
/// Closures are stored in `Arc`s so options stay cheap to clone.
pub struct VariableListOptions<T, K, N> {
    pub get_key: KeyFn<T, K>,
    pub estimate: Estimate<T>,
    /// Space between consecutive items.
    pub gap: u32,
    /// Items rendered beyond each edge of the viewport.
    pub overscan: usize,
    /// Overrides scroll container detection.
    pub scroll_parent: Option<ScrollParentResolver<N>>,
    pub size_policy: SizePolicy,
}

impl<T, K, N> VariableListOptions<T, K, N> {
    pub fn new(
        get_key: impl Fn(&T, usize) -> Option<K> + 'static,
        estimate: Estimate<T>,
    ) -> Self {
        Self {
            get_key: Arc::new(get_key),
            estimate,
            gap: 0,
            overscan: 0,
            scroll_parent: None,
            size_policy: SizePolicy::default(),
        }
    }

    /// Defaults for lists of tall, card-like groups: 140px estimate, 16px gap, overscan 3.
    pub fn grouped(get_key: impl Fn(&T, usize) -> Option<K> + 'static) -> Self {
        Self::new(get_key, Estimate::Fixed(140))
            .with_gap(16)
            .with_overscan(3)
    }

    pub fn with_estimate(mut self, estimate: Estimate<T>) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_scroll_parent(mut self, f: impl Fn(N) -> ScrollContainer<N> + 'static) -> Self {
        self.scroll_parent = Some(Arc::new(f));
        self
    }

    pub fn with_size_policy(mut self, size_policy: SizePolicy) -> Self {
        self.size_policy = size_policy;
        self
    }
}

impl<T, K, N> Clone for VariableListOptions<T, K, N> {
    fn clone(&self) -> Self {
        Self {
            get_key: Arc::clone(&self.get_key),
            estimate: self.estimate.clone(),
            gap: self.gap,
            overscan: self.overscan,
            scroll_parent: self.scroll_parent.clone(),
            size_policy: self.size_policy,
        }
    }
}

impl<T, K, N> fmt::Debug for VariableListOptions<T, K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableListOptions")
            .field("estimate", &self.estimate)
            .field("gap", &self.gap)
            .field("overscan", &self.overscan)
            .field("scroll_parent", &self.scroll_parent.is_some())
            .field("size_policy", &self.size_policy)
            .finish_non_exhaustive()
    }
}

/// Configuration for [`crate::FixedList`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedListOptions {
    /// When disabled, the window is always empty.
    pub enabled: bool,
    pub overscan: usize,
    /// Row height used until a row has been sampled.
    pub estimate_size: u32,
    /// Selector handed to [`crate::Host::query_row`] to find a row to sample.
    pub row_selector: Option<String>,
}

impl FixedListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_estimate_size(mut self, estimate_size: u32) -> Self {
        self.estimate_size = estimate_size;
        self
    }

    pub fn with_row_selector(mut self, selector: impl Into<String>) -> Self {
        self.row_selector = Some(selector.into());
        self
    }
}

impl Default for FixedListOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            overscan: 0,
            estimate_size: 1,
            row_selector: None,
        }
    }
}
