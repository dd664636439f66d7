use crate::*;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use listwindow::{LayoutTick, SizePolicy, VisibleWindow};

#[derive(Clone, Debug, Default)]
struct SimNode {
    parent: Option<usize>,
    document_root: bool,
    overflow_y: Overflow,
    overflow: Overflow,
    /// Top inside the parent's content box.
    offset: i64,
    height: f64,
    scroll_height: u32,
    client_height: u32,
    scroll_top: u64,
}

/// Scripted host: a small node tree with geometry, plus bookkeeping of every capability call.
#[derive(Debug)]
struct SimHost {
    nodes: Vec<SimNode>,
    page_scroll_top: u64,
    page_viewport_height: u32,
    layout: bool,
    frames: bool,
    microtasks: bool,
    observers: bool,
    next_handle: u64,
    observed: Vec<(ObserverHandle, usize)>,
    watched: Vec<ScrollContainer<usize>>,
    frame_requests: usize,
    cancelled_frames: Vec<FrameHandle>,
    microtask_requests: usize,
    row: Option<usize>,
}

const HTML: usize = 0;
const BODY: usize = 1;

impl SimHost {
    fn new() -> Self {
        let html = SimNode {
            document_root: true,
            ..SimNode::default()
        };
        let body = SimNode {
            parent: Some(HTML),
            document_root: true,
            ..SimNode::default()
        };
        Self {
            nodes: alloc::vec![html, body],
            page_scroll_top: 0,
            page_viewport_height: 800,
            layout: true,
            frames: false,
            microtasks: false,
            observers: true,
            next_handle: 1,
            observed: Vec::new(),
            watched: Vec::new(),
            frame_requests: 0,
            cancelled_frames: Vec::new(),
            microtask_requests: 0,
            row: None,
        }
    }

    fn add(&mut self, parent: usize, node: SimNode) -> usize {
        self.nodes.push(SimNode {
            parent: Some(parent),
            ..node
        });
        self.nodes.len() - 1
    }

    fn add_container(&mut self, parent: usize, offset: i64, client_height: u32) -> usize {
        self.add(
            parent,
            SimNode {
                overflow_y: Overflow::Auto,
                offset,
                client_height,
                scroll_height: 1_000_000,
                ..SimNode::default()
            },
        )
    }

    fn add_block(&mut self, parent: usize, offset: i64, height: f64) -> usize {
        self.add(
            parent,
            SimNode {
                offset,
                height,
                ..SimNode::default()
            },
        )
    }

    fn set_height(&mut self, node: usize, height: f64) {
        self.nodes[node].height = height;
    }

    fn scroll_element(&mut self, node: usize, top: u64) {
        self.set_element_scroll_top(node, top);
    }

    fn is_observed(&self, node: usize) -> bool {
        self.observed.iter().any(|(_, n)| *n == node)
    }

    fn handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }
}

impl Host for SimHost {
    type Node = usize;

    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }

    fn is_document_root(&self, node: usize) -> bool {
        self.nodes[node].document_root
    }

    fn overflow_y(&self, node: usize) -> Overflow {
        self.nodes[node].overflow_y
    }

    fn overflow(&self, node: usize) -> Overflow {
        self.nodes[node].overflow
    }

    fn scroll_height(&self, node: usize) -> u32 {
        self.nodes[node].scroll_height
    }

    fn client_height(&self, node: usize) -> u32 {
        self.nodes[node].client_height
    }

    fn rect_top(&self, node: usize) -> Option<i64> {
        if !self.layout {
            return None;
        }
        let n = &self.nodes[node];
        match n.parent {
            Some(p) => {
                let parent_top = self.rect_top(p)?;
                Some(parent_top + n.offset - self.nodes[p].scroll_top as i64)
            }
            None => Some(n.offset - self.page_scroll_top as i64),
        }
    }

    fn measure(&self, node: usize) -> Option<f64> {
        self.layout.then(|| self.nodes[node].height)
    }

    fn page_scroll_top(&self) -> u64 {
        self.page_scroll_top
    }

    fn page_viewport_height(&self) -> u32 {
        self.page_viewport_height
    }

    fn element_scroll_top(&self, node: usize) -> u64 {
        self.nodes[node].scroll_top
    }

    fn set_page_scroll_top(&mut self, top: u64) {
        self.page_scroll_top = top;
    }

    fn set_element_scroll_top(&mut self, node: usize, top: u64) {
        let n = &mut self.nodes[node];
        let max = n.scroll_height.saturating_sub(n.client_height) as u64;
        n.scroll_top = top.min(max);
    }

    fn observe_size(&mut self, node: usize) -> Option<ObserverHandle> {
        if !self.observers {
            return None;
        }
        let handle = ObserverHandle(self.handle());
        self.observed.push((handle, node));
        Some(handle)
    }

    fn unobserve(&mut self, handle: ObserverHandle) {
        self.observed.retain(|(h, _)| *h != handle);
    }

    fn watch_scroll(&mut self, target: ScrollContainer<usize>) {
        self.watched.push(target);
    }

    fn unwatch_scroll(&mut self, target: ScrollContainer<usize>) {
        if let Some(pos) = self.watched.iter().position(|t| *t == target) {
            self.watched.remove(pos);
        }
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        if !self.frames {
            return None;
        }
        self.frame_requests += 1;
        Some(FrameHandle(self.handle()))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled_frames.push(handle);
    }

    fn queue_microtask(&mut self) -> bool {
        if self.microtasks {
            self.microtask_requests += 1;
        }
        self.microtasks
    }

    fn query_row(&self, _container: usize, _selector: &str) -> Option<usize> {
        self.row
    }
}

type Rows = VariableList<String, String, usize>;

fn row_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("row-{i}")).collect()
}

fn keyed_options(estimate: u32) -> VariableListOptions<String, String, usize> {
    VariableListOptions::new(|s: &String, _| Some(s.clone()), Estimate::Fixed(estimate))
}

/// html > body > container (top 100, 400px tall, auto overflow) > list.
fn nested_fixture(client_height: u32) -> (SimHost, usize, usize) {
    let mut host = SimHost::new();
    let container = host.add_container(BODY, 100, client_height);
    let list = host.add_block(container, 0, 0.0);
    (host, container, list)
}

#[test]
fn finds_nearest_scrolling_ancestor() {
    let mut host = SimHost::new();
    let outer = host.add_container(BODY, 0, 600);
    let clipped = host.add(
        outer,
        SimNode {
            overflow_y: Overflow::Hidden,
            scroll_height: 5000,
            client_height: 100,
            ..SimNode::default()
        },
    );
    let short = host.add(
        clipped,
        SimNode {
            overflow_y: Overflow::Scroll,
            scroll_height: 100,
            client_height: 100,
            ..SimNode::default()
        },
    );
    let list = host.add_block(short, 0, 0.0);

    // `short` scrolls but has nothing to scroll, `clipped` overflows but cannot scroll.
    assert_eq!(find_scroll_parent(&host, list), ScrollContainer::Element(outer));

    host.nodes[clipped].overflow = Overflow::Overlay;
    assert_eq!(
        find_scroll_parent(&host, list),
        ScrollContainer::Element(clipped)
    );
}

#[test]
fn document_roots_fall_back_to_page() {
    let mut host = SimHost::new();
    host.nodes[BODY].overflow_y = Overflow::Auto;
    host.nodes[BODY].scroll_height = 10_000;
    host.nodes[BODY].client_height = 800;
    let list = host.add_block(BODY, 0, 0.0);
    assert_eq!(find_scroll_parent(&host, list), ScrollContainer::Page);
    assert!(is_scrollable(&host, BODY));
}

#[test]
fn tracker_reads_nested_container_geometry() {
    let (mut host, container, _) = nested_fixture(400);
    let list = host.add_block(container, 50, 0.0);
    let layout = LayoutTick::new();
    let mut tracker = ScrollTracker::new(&layout, None);

    tracker.bind_list(&mut host, list);
    let m = tracker.metrics();
    assert!(m.ready);
    assert_eq!(tracker.container(), ScrollContainer::Element(container));
    assert_eq!(m.viewport_height, 400);
    assert_eq!(m.scroll_container_top, 100);
    assert_eq!(m.list_top, 50);
    assert_eq!(host.watched, [ScrollContainer::Element(container)]);
    assert!(host.is_observed(list) && host.is_observed(container));

    // Scrolling the container keeps the list's position inside the content.
    host.scroll_element(container, 300);
    assert!(tracker.on_scroll(&mut host, 10));
    let m = tracker.metrics();
    assert_eq!(m.scroll_top, 300);
    assert_eq!(m.last_scroll_at, Some(10));
    tracker.refresh(&mut host);
    assert_eq!(tracker.metrics().list_top, 50);
    assert_eq!(tracker.metrics().viewport_top_in_list(), 250);
}

#[test]
fn tracker_uses_page_when_nothing_scrolls() {
    let mut host = SimHost::new();
    host.add_block(BODY, 0, 64.0);
    let list = host.add_block(BODY, 64, 0.0);
    host.page_scroll_top = 200;

    let layout = LayoutTick::new();
    let mut tracker = ScrollTracker::new(&layout, None);
    tracker.bind_list(&mut host, list);

    let m = tracker.metrics();
    assert_eq!(tracker.container(), ScrollContainer::Page);
    assert_eq!(m.scroll_container_top, 0);
    assert_eq!(m.scroll_top, 200);
    assert_eq!(m.viewport_height, 800);
    assert_eq!(m.list_top, 64);
}

#[test]
fn custom_resolver_overrides_detection() {
    let (mut host, _, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let resolver: ScrollParentResolver<usize> =
        alloc::sync::Arc::new(|_: usize| ScrollContainer::Page);
    let mut tracker = ScrollTracker::new(&layout, Some(resolver));
    tracker.bind_list(&mut host, list);
    assert!(tracker.container().is_page());
}

#[test]
fn scroll_events_coalesce_into_one_frame() {
    let (mut host, container, list) = nested_fixture(400);
    host.frames = true;
    let layout = LayoutTick::new();
    let mut tracker = ScrollTracker::new(&layout, None);
    tracker.bind_list(&mut host, list);
    assert_eq!(host.frame_requests, 1);
    assert!(tracker.on_frame(&mut host));

    host.scroll_element(container, 120);
    assert!(!tracker.on_scroll(&mut host, 1));
    host.scroll_element(container, 180);
    tracker.on_scroll(&mut host, 2);
    host.scroll_element(container, 240);
    tracker.on_scroll(&mut host, 3);

    assert_eq!(host.frame_requests, 2);
    assert_eq!(tracker.metrics().scroll_top, 0, "not applied before the frame");
    assert!(tracker.on_frame(&mut host));
    assert_eq!(tracker.metrics().scroll_top, 240);
    assert!(!tracker.on_frame(&mut host));
}

#[test]
fn apply_scroll_delta_is_visible_immediately() {
    let (mut host, container, list) = nested_fixture(400);
    host.frames = true;
    let layout = LayoutTick::new();
    let mut tracker = ScrollTracker::new(&layout, None);
    tracker.bind_list(&mut host, list);
    tracker.on_frame(&mut host);

    host.scroll_element(container, 1000);
    tracker.on_scroll(&mut host, 0);
    tracker.on_frame(&mut host);

    tracker.apply_scroll_delta(&mut host, 75);
    assert_eq!(host.nodes[container].scroll_top, 1075);
    assert_eq!(tracker.metrics().scroll_top, 1075);
    assert!(tracker.is_frame_pending());

    tracker.apply_scroll_delta(&mut host, -2000);
    assert_eq!(tracker.metrics().scroll_top, 0);
    assert_eq!(host.nodes[container].scroll_top, 0);
}

#[test]
fn release_list_stops_tracking() {
    let (mut host, container, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let mut tracker = ScrollTracker::new(&layout, None);
    tracker.bind_list(&mut host, list);

    assert!(!tracker.release_list(&mut host, container));
    assert!(tracker.release_list(&mut host, list));
    assert!(host.watched.is_empty());
    assert!(host.observed.is_empty());

    host.scroll_element(container, 500);
    assert!(!tracker.on_scroll(&mut host, 0));
    assert!(!tracker.on_resize(&mut host, list));
    assert_eq!(tracker.metrics().scroll_top, 0);
}

#[test]
fn layout_tick_triggers_relayout() {
    let (mut host, container, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(100));
    rows.bind_list(&mut host, list);
    assert_eq!(rows.scroll_container_top(), 100);

    host.nodes[container].offset = 150;
    rows.on_frame(&mut host, 0);
    assert_eq!(rows.scroll_container_top(), 100, "no layout change published yet");

    assert!(layout.request_bump());
    assert!(layout.on_frame());
    rows.on_frame(&mut host, 0);
    assert_eq!(rows.scroll_container_top(), 150);
}

#[test]
fn variable_list_windows_the_viewport() {
    let (mut host, container, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50).with_gap(8).with_overscan(2), &layout);
    rows.set_items(row_names(1000));
    rows.bind_list(&mut host, list);

    assert_eq!(rows.total_height(), 57_992);
    assert_eq!(rows.window(), VisibleWindow { start: 0, end: 9 });

    host.scroll_element(container, 500);
    rows.on_scroll(&mut host, 0);
    assert_eq!(rows.scroll_top(), 500);
    assert_eq!(rows.viewport_height(), 400);
    assert_eq!(rows.window(), VisibleWindow { start: 6, end: 18 });

    let entries = rows.entries();
    assert_eq!(entries.len(), 12);
    assert_eq!(entries[0].index, 6);
    assert_eq!(entries[0].top, 6 * 58);
    assert_eq!(entries[0].key, EntryKey::Keyed(String::from("row-6")));
    assert_eq!(entries[0].item, "row-6");
    assert!(entries.windows(2).all(|w| w[1].index == w[0].index + 1));

    // Same inputs, same window.
    rows.recompute();
    assert_eq!(rows.window(), VisibleWindow { start: 6, end: 18 });
}

#[test]
fn headless_host_yields_empty_window() {
    let (mut host, _, list) = nested_fixture(400);
    host.layout = false;
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(10));
    rows.bind_list(&mut host, list);

    assert!(!rows.metrics().is_ready());
    assert!(rows.window().is_empty());
    assert!(rows.entries().is_empty());
    assert_eq!(rows.total_height(), 500);
}

#[test]
fn zero_height_container_uses_page_viewport() {
    let (mut host, container, list) = nested_fixture(0);
    host.page_viewport_height = 200;
    let layout = LayoutTick::new();
    let options = keyed_options(50).with_scroll_parent(move |_| ScrollContainer::Element(container));
    let mut rows: Rows = VariableList::new(options, &layout);
    rows.set_items(row_names(100));
    rows.bind_list(&mut host, list);

    assert_eq!(rows.viewport_height(), 0);
    assert_eq!(rows.window(), VisibleWindow { start: 0, end: 5 });
}

/// Binds one row element per item in `indexes`, each `height` px tall.
fn bind_rows(
    host: &mut SimHost,
    rows: &mut Rows,
    list: usize,
    indexes: &[usize],
    height: f64,
) -> Vec<usize> {
    let mut nodes = Vec::new();
    for &i in indexes {
        let node = host.add_block(list, 0, height);
        rows.bind_item(host, node, Some(format!("row-{i}")), 0);
        nodes.push(node);
    }
    nodes
}

#[test]
fn measured_sizes_replace_estimates() {
    let (mut host, _, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(20));
    rows.bind_list(&mut host, list);

    let nodes = bind_rows(&mut host, &mut rows, list, &[0, 1], 30.5);
    assert_eq!(rows.sizes().get(&String::from("row-0")), Some(31));
    assert_eq!(rows.offset_of(1), Some(31));
    assert_eq!(rows.offset_of(2), Some(62));
    assert_eq!(rows.total_height(), 62 + 18 * 50);
    assert_eq!(rows.bound_items(), 2);

    // Zero-height measurement keeps the previous value.
    host.set_height(nodes[0], 0.0);
    rows.on_resize(&mut host, nodes[0], 5);
    assert_eq!(rows.sizes().get(&String::from("row-0")), Some(31));
}

#[test]
fn small_changes_flush_once_per_microtask() {
    let (mut host, _, list) = nested_fixture(400);
    host.microtasks = true;
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(20));
    rows.bind_list(&mut host, list);
    let base = rows.offset_rebuilds();

    let node = bind_rows(&mut host, &mut rows, list, &[0], 40.0)[0];
    for h in [41.0, 43.0, 44.0] {
        host.set_height(node, h);
        rows.on_resize(&mut host, node, 0);
    }
    assert_eq!(host.microtask_requests, 1);
    assert_eq!(rows.offset_rebuilds(), base);
    assert_eq!(rows.offset_of(1), Some(50));

    rows.run_microtasks(&mut host, 0);
    assert_eq!(rows.offset_rebuilds(), base + 1);
    assert_eq!(rows.offset_of(1), Some(44));
    assert_eq!(rows.sizes().pending_len(), 0);

    // Nothing left to do.
    rows.run_microtasks(&mut host, 0);
    assert_eq!(rows.offset_rebuilds(), base + 1);
}

#[test]
fn staged_sizes_flush_on_frame_without_microtasks() {
    let (mut host, _, list) = nested_fixture(400);
    host.frames = true;
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(20));
    rows.bind_list(&mut host, list);
    rows.on_frame(&mut host, 0);
    let base = rows.offset_rebuilds();

    bind_rows(&mut host, &mut rows, list, &[0, 1, 2], 45.0);
    assert_eq!(rows.offset_rebuilds(), base);
    rows.on_frame(&mut host, 0);
    assert_eq!(rows.offset_rebuilds(), base + 1);
    assert_eq!(rows.offset_of(3), Some(135));
}

#[test]
fn large_change_applies_immediately() {
    let (mut host, _, list) = nested_fixture(400);
    host.microtasks = true;
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(20));
    rows.bind_list(&mut host, list);

    let node = bind_rows(&mut host, &mut rows, list, &[0], 40.0)[0];
    rows.run_microtasks(&mut host, 0);
    host.set_height(node, 42.0);
    rows.on_resize(&mut host, node, 0);
    assert_eq!(rows.sizes().pending(&String::from("row-0")), Some(42));

    host.set_height(node, 260.0);
    rows.on_resize(&mut host, node, 0);
    assert_eq!(rows.sizes().pending(&String::from("row-0")), None);
    assert_eq!(rows.offset_of(1), Some(260));
}

/// A 100-row list whose container was scrolled to `top` at time 0.
fn scrolled_rows(host: &mut SimHost, container: usize, list: usize, top: u64) -> Rows {
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(100));
    rows.bind_list(host, list);
    host.scroll_element(container, top);
    rows.on_scroll(host, 0);
    rows
}

#[test]
fn resize_above_viewport_compensates_scroll() {
    let (mut host, container, list) = nested_fixture(400);
    let mut rows = scrolled_rows(&mut host, container, list, 0);
    let node = bind_rows(&mut host, &mut rows, list, &[0], 40.0)[0];

    host.scroll_element(container, 1000);
    rows.on_scroll(&mut host, 0);
    let before = rows.offset_of(30).unwrap() as i64 - rows.scroll_top() as i64;

    host.set_height(node, 240.0);
    rows.on_resize(&mut host, node, 1_000);

    assert_eq!(rows.scroll_top(), 1200);
    assert_eq!(host.nodes[container].scroll_top, 1200);
    let after = rows.offset_of(30).unwrap() as i64 - rows.scroll_top() as i64;
    assert_eq!(before, after, "rows below the viewport top must not move");
}

#[test]
fn coalesced_resize_above_viewport_compensates_scroll() {
    let (mut host, container, list) = nested_fixture(400);
    let mut rows = scrolled_rows(&mut host, container, list, 0);
    let node = bind_rows(&mut host, &mut rows, list, &[2], 40.0)[0];

    host.scroll_element(container, 800);
    rows.on_scroll(&mut host, 0);

    host.set_height(node, 60.0);
    rows.on_resize(&mut host, node, 500);
    assert_eq!(rows.scroll_top(), 820);
}

#[test]
fn compensation_waits_out_user_scrolling() {
    let (mut host, container, list) = nested_fixture(400);
    let mut rows = scrolled_rows(&mut host, container, list, 0);
    let node = bind_rows(&mut host, &mut rows, list, &[0], 40.0)[0];

    host.scroll_element(container, 1000);
    rows.on_scroll(&mut host, 1_000);

    host.set_height(node, 240.0);
    rows.on_resize(&mut host, node, 1_050);
    assert_eq!(rows.scroll_top(), 1000);
    assert_eq!(rows.offset_of(1), Some(240));

    // A shorter grace window lets the same change through.
    let policy = SizePolicy::default().with_compensation_grace_ms(10);
    rows.set_size_policy(policy);
    host.set_height(node, 40.0);
    rows.on_resize(&mut host, node, 1_060);
    assert_eq!(rows.scroll_top(), 800);
}

#[test]
fn one_flush_compensates_only_rows_above_viewport() {
    // Enough fresh lists that any dependence on map iteration order would show up.
    for _ in 0..16 {
        let (mut host, container, list) = nested_fixture(400);
        let mut rows = scrolled_rows(&mut host, container, list, 0);
        let nodes = bind_rows(&mut host, &mut rows, list, &[0, 21], 40.0);
        assert_eq!(rows.offset_of(21), Some(1040));

        host.scroll_element(container, 1000);
        rows.on_scroll(&mut host, 0);
        let straddling = rows.offset_of(20).unwrap() as i64 - rows.scroll_top() as i64;

        host.microtasks = true;
        for &node in &nodes {
            host.set_height(node, 100.0);
            rows.on_resize(&mut host, node, 10_000);
        }
        assert_eq!(rows.sizes().pending_len(), 2);
        rows.run_microtasks(&mut host, 10_000);

        assert_eq!(rows.scroll_top(), 1060);
        assert_eq!(host.nodes[container].scroll_top, 1060);
        let after = rows.offset_of(20).unwrap() as i64 - rows.scroll_top() as i64;
        assert_eq!(straddling, after);
    }
}

#[test]
fn straddling_row_grows_without_compensation() {
    let (mut host, container, list) = nested_fixture(400);
    let mut rows = scrolled_rows(&mut host, container, list, 0);
    let node = bind_rows(&mut host, &mut rows, list, &[20], 40.0)[0];

    // Row 20 spans 1000..1040.
    host.scroll_element(container, 1020);
    rows.on_scroll(&mut host, 0);
    host.set_height(node, 240.0);
    rows.on_resize(&mut host, node, 1_000);
    assert_eq!(rows.scroll_top(), 1020);
    assert_eq!(rows.offset_of(21), Some(1240));
}

#[test]
fn rows_below_viewport_top_do_not_compensate() {
    let (mut host, container, list) = nested_fixture(400);
    let mut rows = scrolled_rows(&mut host, container, list, 0);
    let node = bind_rows(&mut host, &mut rows, list, &[30], 40.0)[0];

    host.scroll_element(container, 100);
    rows.on_scroll(&mut host, 0);
    host.set_height(node, 240.0);
    rows.on_resize(&mut host, node, 1_000);
    assert_eq!(rows.scroll_top(), 100);
}

#[test]
fn page_scrolling_never_compensates() {
    let mut host = SimHost::new();
    let list = host.add_block(BODY, 0, 0.0);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(100));
    rows.bind_list(&mut host, list);
    assert!(rows.scroll_container().is_page());

    let node = bind_rows(&mut host, &mut rows, list, &[0], 40.0)[0];
    host.page_scroll_top = 1000;
    rows.on_scroll(&mut host, 0);
    host.set_height(node, 240.0);
    rows.on_resize(&mut host, node, 1_000);
    assert_eq!(rows.scroll_top(), 1000);
    assert_eq!(host.page_scroll_top, 1000);
}

#[test]
fn replacing_items_collects_stale_sizes() {
    let (mut host, _, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(5));
    rows.bind_list(&mut host, list);
    bind_rows(&mut host, &mut rows, list, &[0, 3], 20.0);
    assert_eq!(rows.sizes().len(), 2);

    rows.update_items(|items| {
        items.remove(3);
    });
    assert_eq!(rows.sizes().len(), 1);
    assert_eq!(rows.offsets().len(), 4);
    assert_eq!(rows.total_height(), 20 + 3 * 50);
}

#[test]
fn unkeyed_items_use_estimates_and_index_keys() {
    let (mut host, _, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let options: VariableListOptions<String, String, usize> = VariableListOptions::new(
        |s: &String, i| (i % 2 == 0).then(|| s.clone()),
        Estimate::per_item(|_, i| if i % 2 == 0 { 10 } else { 20 }),
    );
    let mut rows: Rows = VariableList::new(options, &layout);
    rows.set_items(row_names(4));
    rows.bind_list(&mut host, list);
    assert_eq!(rows.total_height(), 60);

    let node = host.add_block(list, 0, 99.0);
    rows.bind_item(&mut host, node, None, 0);
    assert!(rows.sizes().is_empty());

    let entries = rows.entries();
    assert_eq!(entries[1].key, EntryKey::Index(1));
    assert_eq!(entries[2].key, EntryKey::Keyed(String::from("row-2")));
}

#[test]
fn released_rows_stop_reporting() {
    let (mut host, _, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(5));
    rows.bind_list(&mut host, list);
    let node = bind_rows(&mut host, &mut rows, list, &[1], 20.0)[0];
    assert!(host.is_observed(node));

    assert!(rows.release_item(&mut host, node));
    assert!(!host.is_observed(node));
    assert!(!rows.release_item(&mut host, node));

    host.set_height(node, 70.0);
    rows.on_resize(&mut host, node, 0);
    assert_eq!(rows.sizes().get(&String::from("row-1")), Some(20));
}

#[test]
fn rebinding_a_row_with_a_new_key_measures_it() {
    let (mut host, _, list) = nested_fixture(400);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(5));
    rows.bind_list(&mut host, list);
    let node = bind_rows(&mut host, &mut rows, list, &[1], 20.0)[0];

    assert!(rows.update_item_key(&mut host, node, Some(String::from("row-4")), 0));
    assert_eq!(rows.sizes().get(&String::from("row-4")), Some(20));
    assert!(!rows.update_item_key(&mut host, 999, None, 0));
}

#[test]
fn grouped_preset_defaults() {
    let options: VariableListOptions<String, String, usize> =
        VariableListOptions::grouped(|s: &String, _| Some(s.clone()));
    assert_eq!(options.gap, 16);
    assert_eq!(options.overscan, 3);
    assert_eq!(options.estimate.size_of(&String::new(), 0), 140);
}

#[test]
fn teardown_cancels_pending_work() {
    let (mut host, container, list) = nested_fixture(400);
    host.frames = true;
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(50));
    rows.bind_list(&mut host, list);
    bind_rows(&mut host, &mut rows, list, &[0], 20.0);
    assert!(rows.scroll_tracker().is_frame_pending());

    rows.teardown(&mut host);
    assert_eq!(host.cancelled_frames.len(), 2);
    assert!(host.observed.is_empty());
    assert!(host.watched.is_empty());
    assert!(rows.window().is_empty());

    let rebuilds = rows.offset_rebuilds();
    host.scroll_element(container, 600);
    rows.on_scroll(&mut host, 0);
    rows.on_frame(&mut host, 0);
    rows.run_microtasks(&mut host, 0);
    assert_eq!(rows.scroll_top(), 0);
    assert_eq!(rows.offset_rebuilds(), rebuilds);
}

/// A fixed table nested in a variable list's scroll container.
fn fixed_fixture(client_height: u32) -> (SimHost, usize, Rows, usize, LayoutTick) {
    let (mut host, container, list) = nested_fixture(client_height);
    let layout = LayoutTick::new();
    let mut rows: Rows = VariableList::new(keyed_options(50), &layout);
    rows.set_items(row_names(1));
    rows.bind_list(&mut host, list);
    let table = host.add_block(list, 0, 0.0);
    (host, container, rows, table, layout)
}

#[test]
fn fixed_list_windows_uniform_rows() {
    let (mut host, container, mut rows, table, layout) = fixed_fixture(600);
    let options = FixedListOptions::new()
        .with_overscan(5)
        .with_estimate_size(24);
    let mut fixed = FixedList::new(options, 10_000, rows.metrics(), &layout);
    fixed.bind(&mut host, table);

    assert_eq!((fixed.start(), fixed.end()), (0, 30));
    assert_eq!(fixed.top_spacer(), 0);
    assert_eq!(fixed.bottom_spacer(), (10_000 - 30) * 24);

    host.scroll_element(container, 2400);
    rows.on_scroll(&mut host, 0);
    assert!(fixed.sync(&mut host));
    assert_eq!((fixed.start(), fixed.end()), (95, 130));
    assert_eq!(fixed.top_spacer(), 95 * 24);
    assert!(!fixed.sync(&mut host));
}

#[test]
fn fixed_list_samples_row_height() {
    let (mut host, _, rows, table, layout) = fixed_fixture(600);
    let row = host.add_block(table, 0, 30.2);
    host.row = Some(row);
    let options = FixedListOptions::new()
        .with_overscan(5)
        .with_estimate_size(24)
        .with_row_selector("tr");
    let mut fixed = FixedList::new(options, 10_000, rows.metrics(), &layout);
    fixed.bind(&mut host, table);

    assert_eq!(fixed.row_height(), 31);
    assert_eq!((fixed.start(), fixed.end()), (0, 25));

    host.set_height(row, 40.0);
    fixed.on_resize(&mut host, table);
    assert_eq!(fixed.row_height(), 40);
    assert_eq!(fixed.end(), 20);
}

#[test]
fn fixed_list_disabled_or_empty() {
    let (mut host, _, rows, table, layout) = fixed_fixture(600);
    let mut fixed = FixedList::new(
        FixedListOptions::new().with_estimate_size(24),
        100,
        rows.metrics(),
        &layout,
    );
    assert_eq!((fixed.start(), fixed.end()), (0, 0));
    fixed.bind(&mut host, table);
    assert_eq!(fixed.end(), 25);

    fixed.set_enabled(&mut host, false);
    assert_eq!((fixed.start(), fixed.end()), (0, 0));
    fixed.set_enabled(&mut host, true);
    fixed.set_total(&mut host, 0);
    assert_eq!((fixed.start(), fixed.end()), (0, 0));
    assert_eq!(fixed.bottom_spacer(), 0);

    fixed.set_total(&mut host, 100);
    assert!(fixed.release(&mut host, table));
    assert_eq!(fixed.end(), 0);
}

#[test]
fn fixed_list_defers_to_frames_and_tears_down() {
    let (mut host, _, rows, table, layout) = fixed_fixture(600);
    host.frames = true;
    let mut fixed = FixedList::new(
        FixedListOptions::new().with_estimate_size(24),
        100,
        rows.metrics(),
        &layout,
    );
    fixed.bind(&mut host, table);
    let requested = host.frame_requests;
    fixed.on_resize(&mut host, table);
    assert_eq!(host.frame_requests, requested, "frames already pending");

    fixed.teardown(&mut host);
    assert_eq!(host.cancelled_frames.len(), 2);
    assert!(!host.is_observed(table));
    fixed.on_frame(&mut host);
    assert_eq!(fixed.end(), 0);
}
