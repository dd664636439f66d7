use core::fmt;

use listwindow::{
    FixedWindow, LayoutTick, ScrollMetrics, ScrollMetricsReader, VisibleWindow, measured_px,
    window_for_fixed,
};

use crate::host::{FrameHandle, Host, ObserverHandle};
use crate::options::FixedListOptions;

/// A windowed list whose rows all have the same height.
///
/// Used for long uniform tables where building an offset table would be wasted work. The row
/// height starts at [`FixedListOptions::estimate_size`] and is refined by sampling a single
/// rendered row (see [`FixedListOptions::row_selector`]).
///
/// The list does not track scrolling itself: it reads the metrics of the enclosing scroll
/// tracker through a [`ScrollMetricsReader`], e.g. [`crate::VariableList::metrics`].
pub struct FixedList<N> {
    options: FixedListOptions,
    total: usize,
    metrics: ScrollMetricsReader,
    layout: LayoutTick,

    container: Option<N>,
    observer: Option<ObserverHandle>,
    row_height: u32,
    window: VisibleWindow,
    inputs: Option<(ScrollMetrics, u64)>,
    update_frame: Option<FrameHandle>,
    measure_frame: Option<FrameHandle>,
    torn_down: bool,
}

impl<N: Copy + Eq + fmt::Debug> FixedList<N> {
    pub fn new(
        options: FixedListOptions,
        total: usize,
        metrics: ScrollMetricsReader,
        layout: &LayoutTick,
    ) -> Self {
        let row_height = options.estimate_size;
        Self {
            options,
            total,
            metrics,
            layout: layout.clone(),
            container: None,
            observer: None,
            row_height,
            window: VisibleWindow::EMPTY,
            inputs: None,
            update_frame: None,
            measure_frame: None,
            torn_down: false,
        }
    }

    pub fn options(&self) -> &FixedListOptions {
        &self.options
    }

    pub fn start(&self) -> usize {
        self.window.start
    }

    pub fn end(&self) -> usize {
        self.window.end
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn top_spacer(&self) -> u64 {
        self.fixed_window().top_spacer
    }

    pub fn bottom_spacer(&self) -> u64 {
        self.fixed_window().bottom_spacer
    }

    pub fn fixed_window(&self) -> FixedWindow {
        FixedWindow::new(self.window, self.row_height, self.total)
    }

    /// Binds the element containing the rows.
    pub fn bind<H: Host<Node = N>>(&mut self, host: &mut H, node: N) {
        if self.torn_down {
            return;
        }
        if let Some(handle) = self.observer.take() {
            host.unobserve(handle);
        }
        self.container = Some(node);
        self.observer = host.observe_size(node);
        self.update_window(host);
        self.measure_row(host);
        self.request_update(host);
        self.request_measure(host);
    }

    pub fn release<H: Host<Node = N>>(&mut self, host: &mut H, node: N) -> bool {
        if self.container != Some(node) {
            return false;
        }
        self.container = None;
        if let Some(handle) = self.observer.take() {
            host.unobserve(handle);
        }
        self.window = VisibleWindow::EMPTY;
        self.inputs = None;
        true
    }

    pub fn set_total<H: Host<Node = N>>(&mut self, host: &mut H, total: usize) {
        self.total = total;
        self.update_window(host);
    }

    pub fn set_enabled<H: Host<Node = N>>(&mut self, host: &mut H, enabled: bool) {
        self.options.enabled = enabled;
        self.update_window(host);
    }

    pub fn set_overscan<H: Host<Node = N>>(&mut self, host: &mut H, overscan: usize) {
        self.options.overscan = overscan;
        self.update_window(host);
    }

    /// Handles a size change of `node`; only the bound container is of interest.
    pub fn on_resize<H: Host<Node = N>>(&mut self, host: &mut H, node: N) {
        if self.torn_down || self.container != Some(node) {
            return;
        }
        if !self.request_update(host) {
            self.update_window(host);
        }
        if !self.request_measure(host) {
            self.measure_row(host);
        }
    }

    /// Frame callback: runs pending work, then [`Self::sync`].
    pub fn on_frame<H: Host<Node = N>>(&mut self, host: &mut H) {
        if self.torn_down {
            return;
        }
        if self.measure_frame.take().is_some() {
            self.measure_row(host);
        }
        if self.update_frame.take().is_some() {
            self.update_window(host);
        }
        self.sync(host);
    }

    /// Recomputes the window if the scroll metrics or the layout tick moved since the last
    /// computation. Returns whether it recomputed.
    pub fn sync<H: Host<Node = N>>(&mut self, host: &mut H) -> bool {
        if self.torn_down {
            return false;
        }
        let inputs = (self.metrics.get(), self.layout.tick());
        if self.inputs == Some(inputs) {
            return false;
        }
        self.update_window(host);
        true
    }

    /// Recomputes the window right away.
    pub fn update_window<H: Host<Node = N>>(&mut self, host: &mut H) {
        let metrics = self.metrics.get();
        self.inputs = Some((metrics, self.layout.tick()));
        self.window = self.compute_window(host, metrics);
        lwtrace!(
            start = self.window.start,
            end = self.window.end,
            row_height = self.row_height,
            "fixed window recomputed"
        );
    }

    pub fn teardown<H: Host<Node = N>>(&mut self, host: &mut H) {
        if self.torn_down {
            return;
        }
        if let Some(frame) = self.update_frame.take() {
            host.cancel_frame(frame);
        }
        if let Some(frame) = self.measure_frame.take() {
            host.cancel_frame(frame);
        }
        if let Some(handle) = self.observer.take() {
            host.unobserve(handle);
        }
        self.container = None;
        self.window = VisibleWindow::EMPTY;
        self.torn_down = true;
    }

    fn compute_window<H: Host<Node = N>>(&self, host: &H, m: ScrollMetrics) -> VisibleWindow {
        if self.torn_down || !self.options.enabled || self.total == 0 {
            return VisibleWindow::EMPTY;
        }
        let Some(container) = self.container else {
            return VisibleWindow::EMPTY;
        };
        let Some(rect_top) = host.rect_top(container) else {
            return VisibleWindow::EMPTY;
        };
        let scroll_top = m.scroll_top as i64;
        let list_top = rect_top - m.scroll_container_top + scroll_top;
        let viewport_top = scroll_top - list_top;
        let viewport_height = match m.viewport_height {
            0 => host.page_viewport_height(),
            h => h,
        };
        window_for_fixed(
            self.row_height,
            self.total,
            viewport_top,
            viewport_height,
            self.options.overscan,
        )
    }

    fn measure_row<H: Host<Node = N>>(&mut self, host: &mut H) {
        let (Some(container), Some(selector)) = (self.container, &self.options.row_selector)
        else {
            return;
        };
        let Some(row) = host.query_row(container, selector) else {
            return;
        };
        let Some(px) = host.measure(row).and_then(measured_px) else {
            return;
        };
        if px != self.row_height {
            lwdebug!(from = self.row_height, to = px, "row height refined");
            self.row_height = px;
            self.update_window(host);
        }
    }

    /// Returns `false` if the host has no frames and the caller must update synchronously.
    fn request_update<H: Host<Node = N>>(&mut self, host: &mut H) -> bool {
        if self.update_frame.is_some() {
            return true;
        }
        self.update_frame = host.request_frame();
        self.update_frame.is_some()
    }

    fn request_measure<H: Host<Node = N>>(&mut self, host: &mut H) -> bool {
        if self.measure_frame.is_some() {
            return true;
        }
        self.measure_frame = host.request_frame();
        self.measure_frame.is_some()
    }
}

impl<N: fmt::Debug> fmt::Debug for FixedList<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedList")
            .field("options", &self.options)
            .field("total", &self.total)
            .field("row_height", &self.row_height)
            .field("window", &self.window)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
