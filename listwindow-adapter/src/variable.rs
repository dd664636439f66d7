use alloc::vec::Vec;
use core::fmt;

use listwindow::{
    ItemKey, KeyMap, LayoutTick, OffsetTable, ScrollMetricsReader, SizeChange, SizeReport,
    SizeTracker, VisibleWindow, compensation_delta, measured_px, window_for_offsets,
};

use crate::host::{FrameHandle, Host, ObserverHandle, ScrollContainer};
use crate::options::{Estimate, VariableListOptions};
use crate::tracker::ScrollTracker;

/// Identity of a rendered entry: the item's key, or its index for unkeyed items.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryKey<K> {
    Keyed(K),
    Index(usize),
}

/// One row to render.
#[derive(Debug, PartialEq, Eq)]
pub struct Entry<'a, T, K> {
    pub item: &'a T,
    pub index: usize,
    pub key: EntryKey<K>,
    /// Distance from the top of the list to the top of the row.
    pub top: u64,
}

#[derive(Debug)]
struct ItemBinding<K, N> {
    node: N,
    key: Option<K>,
    observer: Option<ObserverHandle>,
}

/// A windowed list whose rows have individual, measured heights.
///
/// The caller owns rendering. It binds the list element and every rendered row element, and
/// forwards host events; the list answers which rows to render and where.
///
/// Recomputation is explicit: offsets are rebuilt when items or sizes changed, and the window
/// is re-queried after every event that may move it. Within a single `on_frame`, staged sizes
/// are flushed before the one offset rebuild of that frame.
pub struct VariableList<T, K, N> {
    options: VariableListOptions<T, K, N>,
    items: Vec<T>,
    keys: Vec<Option<K>>,
    index_by_key: KeyMap<K, usize>,

    scroll: ScrollTracker<N>,
    sizes: SizeTracker<K>,
    offsets: OffsetTable,
    offsets_dirty: bool,
    rebuilds: u64,
    window: VisibleWindow,

    bindings: Vec<ItemBinding<K, N>>,
    flush_queued: bool,
    flush_frame: Option<FrameHandle>,
    torn_down: bool,
}

impl<T, K, N> VariableList<T, K, N>
where
    K: ItemKey + Clone,
    N: Copy + Eq + fmt::Debug,
{
    pub fn new(options: VariableListOptions<T, K, N>, layout: &LayoutTick) -> Self {
        let scroll = ScrollTracker::new(layout, options.scroll_parent.clone());
        let sizes = SizeTracker::new(options.size_policy);
        Self {
            options,
            items: Vec::new(),
            keys: Vec::new(),
            index_by_key: KeyMap::new(),
            scroll,
            sizes,
            offsets: OffsetTable::new(),
            offsets_dirty: false,
            rebuilds: 0,
            window: VisibleWindow::EMPTY,
            bindings: Vec::new(),
            flush_queued: false,
            flush_frame: None,
            torn_down: false,
        }
    }

    pub fn options(&self) -> &VariableListOptions<T, K, N> {
        &self.options
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Replaces the item sequence.
    ///
    /// Size records of keys that are no longer present are dropped.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.reindex();
        self.recompute();
    }

    /// Edits the item sequence in place, then reindexes as [`Self::set_items`] does.
    pub fn update_items(&mut self, f: impl FnOnce(&mut Vec<T>)) {
        f(&mut self.items);
        self.reindex();
        self.recompute();
    }

    pub fn set_estimate(&mut self, estimate: Estimate<T>) {
        self.options.estimate = estimate;
        self.offsets_dirty = true;
        self.recompute();
    }

    pub fn set_gap(&mut self, gap: u32) {
        if self.options.gap == gap {
            return;
        }
        self.options.gap = gap;
        self.offsets_dirty = true;
        self.recompute();
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
        self.recompute();
    }

    pub fn set_size_policy(&mut self, policy: listwindow::SizePolicy) {
        self.options.size_policy = policy;
        self.sizes.set_policy(policy);
    }

    /// Binds the element that contains the rendered rows.
    pub fn bind_list<H: Host<Node = N>>(&mut self, host: &mut H, node: N) {
        self.scroll.bind_list(host, node);
        self.recompute();
    }

    pub fn release_list<H: Host<Node = N>>(&mut self, host: &mut H, node: N) -> bool {
        let released = self.scroll.release_list(host, node);
        if released {
            self.recompute();
        }
        released
    }

    /// Binds a rendered row element and measures it.
    ///
    /// Rows without a key are never measured.
    pub fn bind_item<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: N,
        key: Option<K>,
        now_ms: u64,
    ) {
        if self.torn_down {
            return;
        }
        if let Some(pos) = self.binding_pos(node) {
            self.bindings[pos].key = key;
        } else {
            let observer = host.observe_size(node);
            self.bindings.push(ItemBinding {
                node,
                key,
                observer,
            });
        }
        self.measure_item(host, node, now_ms);
        self.recompute();
    }

    /// Changes the key of a bound row element and re-measures it.
    pub fn update_item_key<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        node: N,
        key: Option<K>,
        now_ms: u64,
    ) -> bool {
        let Some(pos) = self.binding_pos(node) else {
            lwwarn!(?node, "update_item_key for unbound node");
            return false;
        };
        self.bindings[pos].key = key;
        self.measure_item(host, node, now_ms);
        self.recompute();
        true
    }

    /// Stops measuring a row element.
    pub fn release_item<H: Host<Node = N>>(&mut self, host: &mut H, node: N) -> bool {
        let Some(pos) = self.binding_pos(node) else {
            return false;
        };
        let binding = self.bindings.swap_remove(pos);
        if let Some(handle) = binding.observer {
            host.unobserve(handle);
        }
        true
    }

    pub fn bound_items(&self) -> usize {
        self.bindings.len()
    }

    /// Handles a scroll event of the list's scroll container.
    pub fn on_scroll<H: Host<Node = N>>(&mut self, host: &mut H, now_ms: u64) {
        if self.scroll.on_scroll(host, now_ms) {
            self.recompute();
        }
    }

    /// Handles a size change reported for `node` (list, scroll container, or a bound row).
    pub fn on_resize<H: Host<Node = N>>(&mut self, host: &mut H, node: N, now_ms: u64) {
        if self.torn_down {
            return;
        }
        let mut changed = self.scroll.on_resize(host, node);
        if self.binding_pos(node).is_some() {
            self.measure_item(host, node, now_ms);
            changed = true;
        }
        if changed {
            self.recompute();
        }
    }

    /// Re-reads layout after the shared layout tick moved.
    pub fn sync_layout<H: Host<Node = N>>(&mut self, host: &mut H) {
        if self.scroll.sync_layout(host) {
            self.recompute();
        }
    }

    /// Frame callback: runs the pending scroll update and size flush, then recomputes once.
    pub fn on_frame<H: Host<Node = N>>(&mut self, host: &mut H, now_ms: u64) {
        if self.torn_down {
            return;
        }
        let mut changed = self.scroll.sync_layout(host);
        changed |= self.scroll.on_frame(host);
        if self.flush_frame.take().is_some() {
            changed |= self.flush_sizes(host, now_ms);
        }
        if changed {
            self.recompute();
        }
    }

    /// Microtask callback: applies staged sizes.
    pub fn run_microtasks<H: Host<Node = N>>(&mut self, host: &mut H, now_ms: u64) {
        if self.torn_down || !self.flush_queued {
            return;
        }
        self.flush_queued = false;
        if self.flush_sizes(host, now_ms) {
            self.recompute();
        }
    }

    /// Records a measured height for `key`.
    ///
    /// Row bindings call this automatically; use it directly when sizes come from elsewhere.
    pub fn report_size<H: Host<Node = N>>(&mut self, host: &mut H, key: K, px: u32, now_ms: u64) {
        if self.torn_down {
            return;
        }
        if self.apply_report(host, key, px, now_ms) {
            self.recompute();
        }
    }

    /// Rebuilds offsets if needed and re-queries the window.
    pub fn recompute(&mut self) {
        if self.offsets_dirty {
            self.rebuild_offsets();
        }
        let metrics = self.scroll.metrics();
        self.window = if self.torn_down || !metrics.ready {
            VisibleWindow::EMPTY
        } else {
            window_for_offsets(
                &self.offsets,
                metrics.viewport_top_in_list(),
                self.scroll.effective_viewport_height(),
                self.options.overscan,
            )
        };
        lwtrace!(
            start = self.window.start,
            end = self.window.end,
            "window recomputed"
        );
    }

    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    /// Rows to render for the current window, in order.
    pub fn entries(&self) -> Vec<Entry<'_, T, K>> {
        let mut out = Vec::with_capacity(self.window.len());
        self.for_each_entry(|e| out.push(e));
        out
    }

    pub fn for_each_entry<'a>(&'a self, mut f: impl FnMut(Entry<'a, T, K>)) {
        let end = self.window.end.min(self.items.len());
        for index in self.window.start..end {
            let key = match &self.keys[index] {
                Some(k) => EntryKey::Keyed(k.clone()),
                None => EntryKey::Index(index),
            };
            f(Entry {
                item: &self.items[index],
                index,
                key,
                top: self.offsets.offset(index).unwrap_or(0),
            });
        }
    }

    /// Height of the whole list content, for sizing a scroll spacer.
    pub fn total_height(&self) -> u64 {
        self.offsets.total()
    }

    pub fn offset_of(&self, index: usize) -> Option<u64> {
        self.offsets.offset(index)
    }

    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    /// Number of offset rebuilds so far.
    pub fn offset_rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn sizes(&self) -> &SizeTracker<K> {
        &self.sizes
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll.metrics().scroll_top
    }

    pub fn viewport_height(&self) -> u32 {
        self.scroll.metrics().viewport_height
    }

    pub fn scroll_container_top(&self) -> i64 {
        self.scroll.metrics().scroll_container_top
    }

    pub fn scroll_container(&self) -> ScrollContainer<N> {
        self.scroll.container()
    }

    /// A read-only handle on this list's scroll metrics, for nested consumers.
    pub fn metrics(&self) -> ScrollMetricsReader {
        self.scroll.reader()
    }

    pub fn scroll_tracker(&self) -> &ScrollTracker<N> {
        &self.scroll
    }

    /// Releases every binding and cancels pending work. Later events are ignored.
    pub fn teardown<H: Host<Node = N>>(&mut self, host: &mut H) {
        if self.torn_down {
            return;
        }
        for binding in self.bindings.drain(..) {
            if let Some(handle) = binding.observer {
                host.unobserve(handle);
            }
        }
        if let Some(frame) = self.flush_frame.take() {
            host.cancel_frame(frame);
        }
        self.flush_queued = false;
        self.sizes.cancel_flush();
        self.scroll.teardown(host);
        self.torn_down = true;
        self.window = VisibleWindow::EMPTY;
        lwdebug!("variable list torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn binding_pos(&self, node: N) -> Option<usize> {
        self.bindings.iter().position(|b| b.node == node)
    }

    fn reindex(&mut self) {
        let get_key = &self.options.get_key;
        self.keys.clear();
        self.keys
            .extend(self.items.iter().enumerate().map(|(i, item)| get_key(item, i)));

        self.index_by_key.clear();
        for (i, key) in self.keys.iter().enumerate() {
            if let Some(k) = key {
                self.index_by_key.insert(k.clone(), i);
            }
        }
        let index_by_key = &self.index_by_key;
        self.sizes.retain_keys(|k| index_by_key.contains_key(k));
        self.offsets_dirty = true;
    }

    fn rebuild_offsets(&mut self) {
        let items = &self.items;
        let keys = &self.keys;
        let sizes = &self.sizes;
        let estimate = &self.options.estimate;
        self.offsets = OffsetTable::build(
            items.len(),
            |i| match keys[i].as_ref().and_then(|k| sizes.get(k)) {
                Some(px) => px,
                None => estimate.size_of(&items[i], i),
            },
            self.options.gap,
        );
        self.offsets_dirty = false;
        self.rebuilds = self.rebuilds.wrapping_add(1);
        lwdebug!(
            count = self.items.len(),
            total = self.offsets.total(),
            "offsets rebuilt"
        );
    }

    fn measure_item<H: Host<Node = N>>(&mut self, host: &mut H, node: N, now_ms: u64) {
        let Some(pos) = self.binding_pos(node) else {
            return;
        };
        let Some(key) = self.bindings[pos].key.clone() else {
            return;
        };
        let Some(px) = host.measure(node).and_then(measured_px) else {
            return;
        };
        self.apply_report(host, key, px, now_ms);
    }

    /// Returns whether offsets became dirty.
    fn apply_report<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        key: K,
        px: u32,
        now_ms: u64,
    ) -> bool {
        match self.sizes.report(key, px) {
            SizeReport::Ignored => false,
            SizeReport::Staged { schedule_flush } => {
                if schedule_flush {
                    return self.schedule_flush(host, now_ms);
                }
                false
            }
            SizeReport::Applied(change) => {
                self.compensate(host, core::slice::from_ref(&change), now_ms);
                self.offsets_dirty = true;
                true
            }
        }
    }

    /// Returns whether the flush ran synchronously and changed sizes.
    fn schedule_flush<H: Host<Node = N>>(&mut self, host: &mut H, now_ms: u64) -> bool {
        if host.queue_microtask() {
            self.flush_queued = true;
            return false;
        }
        if let Some(frame) = host.request_frame() {
            self.flush_frame = Some(frame);
            return false;
        }
        self.flush_sizes(host, now_ms)
    }

    fn flush_sizes<H: Host<Node = N>>(&mut self, host: &mut H, now_ms: u64) -> bool {
        let mut changes = self.sizes.flush();
        if changes.is_empty() {
            return false;
        }
        let index_by_key = &self.index_by_key;
        changes.sort_by_key(|c| index_by_key.get(&c.key).copied().unwrap_or(usize::MAX));
        self.compensate(host, &changes, now_ms);
        self.offsets_dirty = true;
        true
    }

    /// Shifts the scroll position by the summed deltas of `changes` lying above the viewport.
    ///
    /// Every change is judged against the offsets and scroll top from before any of them was
    /// applied; the scroll moves once.
    fn compensate<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        changes: &[SizeChange<K>],
        now_ms: u64,
    ) {
        if self.scroll.container().is_page() || self.offsets.is_empty() {
            return;
        }
        let metrics = self.scroll.metrics();
        let grace = self.options.size_policy.compensation_grace_ms;
        if metrics.scrolled_within(now_ms, grace) {
            lwtrace!(now_ms, "compensation suppressed after user scroll");
            return;
        }
        let viewport_top = metrics.viewport_top_in_list();
        let delta: i64 = changes
            .iter()
            .filter_map(|change| {
                let index = *self.index_by_key.get(&change.key)?;
                let item_top = self.offsets.offset(index)?;
                Some(compensation_delta(item_top, change, viewport_top))
            })
            .sum();
        if delta != 0 {
            lwdebug!(changes = changes.len(), delta, "scroll compensation");
            self.scroll.apply_scroll_delta(host, delta);
        }
    }
}

impl<T, K, N: fmt::Debug> fmt::Debug for VariableList<T, K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableList")
            .field("count", &self.items.len())
            .field("window", &self.window)
            .field("total_height", &self.offsets.total())
            .field("rebuilds", &self.rebuilds)
            .field("scroll", &self.scroll)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}
