use alloc::sync::Arc;
use core::fmt;

use listwindow::{LayoutTick, ScrollMetrics, ScrollMetricsReader, ScrollModel};

use crate::host::{FrameHandle, Host, ObserverHandle, ScrollContainer, find_scroll_parent};

/// Overrides scroll container detection for a list element.
pub type ScrollParentResolver<N> = Arc<dyn Fn(N) -> ScrollContainer<N>>;

/// Tracks the scroll geometry a list element lives in.
///
/// Binding a list element resolves its scroll container (the nearest scrolling ancestor, or
/// the page) and keeps a [`ScrollModel`] up to date from host events:
/// - `on_scroll`: coalesced to one update per frame when the host has frame callbacks
/// - `on_resize` of the list or the container: immediate layout update
/// - `sync_layout`: re-reads layout after the shared [`LayoutTick`] moved
///
/// Other consumers read the same metrics through [`Self::reader`].
pub struct ScrollTracker<N> {
    resolver: Option<ScrollParentResolver<N>>,
    model: ScrollModel,
    layout: LayoutTick,
    seen_tick: u64,

    list: Option<N>,
    container: ScrollContainer<N>,
    watching: bool,
    list_observer: Option<ObserverHandle>,
    container_observer: Option<ObserverHandle>,
    frame: Option<FrameHandle>,
    fallback_viewport_height: u32,
    torn_down: bool,
}

impl<N: Copy + Eq + fmt::Debug> ScrollTracker<N> {
    pub fn new(layout: &LayoutTick, resolver: Option<ScrollParentResolver<N>>) -> Self {
        Self {
            resolver,
            model: ScrollModel::new(),
            layout: layout.clone(),
            seen_tick: layout.tick(),
            list: None,
            container: ScrollContainer::Page,
            watching: false,
            list_observer: None,
            container_observer: None,
            frame: None,
            fallback_viewport_height: 0,
            torn_down: false,
        }
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.model.get()
    }

    pub fn reader(&self) -> ScrollMetricsReader {
        self.model.reader()
    }

    pub fn container(&self) -> ScrollContainer<N> {
        self.container
    }

    pub fn list(&self) -> Option<N> {
        self.list
    }

    pub fn is_frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    /// Viewport height for window queries: the container's height, or the host viewport's when
    /// the container reports none.
    pub fn effective_viewport_height(&self) -> u32 {
        match self.model.get().viewport_height {
            0 => self.fallback_viewport_height,
            h => h,
        }
    }

    /// Binds the list element and starts tracking its scroll container.
    pub fn bind_list<H: Host<Node = N>>(&mut self, host: &mut H, node: N) {
        if self.torn_down {
            lwwarn!(?node, "bind_list after teardown");
            return;
        }
        if let Some(prev) = self.list {
            if prev != node {
                self.release_list(host, prev);
            }
        }
        self.list = Some(node);

        if let Some(handle) = self.list_observer.take() {
            host.unobserve(handle);
        }
        self.list_observer = host.observe_size(node);

        let next = match &self.resolver {
            Some(resolve) => resolve(node),
            None => find_scroll_parent(host, node),
        };
        if !self.watching || self.container != next {
            if self.watching {
                host.unwatch_scroll(self.container);
            }
            self.container = next;
            host.watch_scroll(next);
            self.watching = true;
            self.observe_container(host);
            lwdebug!(?node, container = ?next, "scroll container resolved");
        }

        self.update_layout(host);
        self.schedule_scroll_update(host);
    }

    /// Releases the list element. Returns `false` if `node` was not the bound list.
    ///
    /// Once released, no host event is attributed to `node` anymore.
    pub fn release_list<H: Host<Node = N>>(&mut self, host: &mut H, node: N) -> bool {
        if self.list != Some(node) {
            return false;
        }
        self.list = None;
        if self.watching {
            host.unwatch_scroll(self.container);
            self.watching = false;
        }
        if let Some(handle) = self.list_observer.take() {
            host.unobserve(handle);
        }
        if let Some(handle) = self.container_observer.take() {
            host.unobserve(handle);
        }
        lwdebug!(?node, "list released");
        true
    }

    /// Handles a scroll event of the tracked container.
    ///
    /// Returns `true` if the metrics were updated synchronously (the host has no frames).
    pub fn on_scroll<H: Host<Node = N>>(&mut self, host: &mut H, now_ms: u64) -> bool {
        if self.torn_down || !self.watching {
            return false;
        }
        self.model.update(|m| m.last_scroll_at = Some(now_ms));
        self.schedule_scroll_update(host)
    }

    /// Runs the pending scroll update, if any. Returns whether metrics were refreshed.
    pub fn on_frame<H: Host<Node = N>>(&mut self, host: &mut H) -> bool {
        if self.torn_down || self.frame.take().is_none() {
            return false;
        }
        self.update_scroll_position(host);
        true
    }

    /// Handles a size change of `node`. Returns `true` if `node` is the list or its container.
    pub fn on_resize<H: Host<Node = N>>(&mut self, host: &mut H, node: N) -> bool {
        if self.torn_down {
            return false;
        }
        let ours = self.list == Some(node) || self.container == ScrollContainer::Element(node);
        if ours && self.list.is_some() {
            self.update_layout(host);
        }
        ours
    }

    /// Re-reads layout if the [`LayoutTick`] moved since the last check.
    pub fn sync_layout<H: Host<Node = N>>(&mut self, host: &mut H) -> bool {
        if self.torn_down || !self.layout.changed_since(self.seen_tick) {
            return false;
        }
        self.seen_tick = self.layout.tick();
        self.update_layout(host);
        true
    }

    /// Re-reads scroll position and list placement right away.
    pub fn refresh<H: Host<Node = N>>(&mut self, host: &mut H) {
        if !self.torn_down {
            self.update_layout(host);
        }
    }

    /// Scrolls the container by `delta` pixels.
    ///
    /// The cached scroll top is updated immediately so window queries in the same tick see the
    /// corrected position before the host reports the scroll.
    pub fn apply_scroll_delta<H: Host<Node = N>>(&mut self, host: &mut H, delta: i64) {
        if delta == 0 || self.torn_down {
            return;
        }
        let top = self.model.get().scroll_top.saturating_add_signed(delta);
        host.scroll_to(self.container, top);
        self.model.update(|m| m.scroll_top = top);
        lwtrace!(delta, top, "apply_scroll_delta");
        self.schedule_scroll_update(host);
    }

    /// Stops tracking and releases every host resource. Later events are ignored.
    pub fn teardown<H: Host<Node = N>>(&mut self, host: &mut H) {
        if self.torn_down {
            return;
        }
        if let Some(node) = self.list {
            self.release_list(host, node);
        }
        if self.watching {
            host.unwatch_scroll(self.container);
            self.watching = false;
        }
        if let Some(handle) = self.container_observer.take() {
            host.unobserve(handle);
        }
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn observe_container<H: Host<Node = N>>(&mut self, host: &mut H) {
        if let Some(handle) = self.container_observer.take() {
            host.unobserve(handle);
        }
        if let ScrollContainer::Element(n) = self.container {
            self.container_observer = host.observe_size(n);
        }
    }

    fn schedule_scroll_update<H: Host<Node = N>>(&mut self, host: &mut H) -> bool {
        if self.frame.is_some() {
            return false;
        }
        match host.request_frame() {
            Some(frame) => {
                self.frame = Some(frame);
                false
            }
            None => {
                self.update_scroll_position(host);
                true
            }
        }
    }

    fn update_scroll_position<H: Host<Node = N>>(&mut self, host: &H) {
        let scroll_top = host.scroll_top_of(self.container);
        let viewport_height = host.viewport_height_of(self.container);
        self.fallback_viewport_height = host.page_viewport_height();
        self.model.update(|m| {
            m.scroll_top = scroll_top;
            m.viewport_height = viewport_height;
        });
    }

    fn update_layout<H: Host<Node = N>>(&mut self, host: &H) {
        let Some(list) = self.list else {
            return;
        };
        self.update_scroll_position(host);
        let Some(list_rect_top) = host.rect_top(list) else {
            // No layout capability: leave the metrics not-ready so windows stay empty.
            return;
        };
        let container_top = match self.container {
            ScrollContainer::Page => Some(0),
            ScrollContainer::Element(n) => host.rect_top(n),
        };
        let Some(container_top) = container_top else {
            return;
        };
        self.model.update(|m| {
            let list_top = list_rect_top - container_top + m.scroll_top as i64;
            m.list_top = list_top.max(0) as u64;
            m.scroll_container_top = container_top;
            m.ready = true;
        });
        lwtrace!(metrics = ?self.model.get(), "layout updated");
    }
}

impl<N: fmt::Debug> fmt::Debug for ScrollTracker<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTracker")
            .field("metrics", &self.model.get())
            .field("list", &self.list)
            .field("container", &self.container)
            .field("watching", &self.watching)
            .field("frame", &self.frame)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}
