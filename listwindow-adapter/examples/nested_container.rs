use listwindow::LayoutTick;
use listwindow_adapter::{
    Estimate, FixedList, FixedListOptions, Host, Overflow, VariableList, VariableListOptions,
};

// A tiny host: node 0 is the document root, node 1 a 400px scroll container at y=100, node 2
// the list inside it, node 3 a fixed-row table nested in the list. Nodes >= 10 are rows.
#[derive(Default)]
struct Page {
    scroll_top: u64,
    row_heights: Vec<f64>,
}

impl Host for Page {
    type Node = usize;

    fn parent(&self, node: usize) -> Option<usize> {
        match node {
            0 => None,
            1 => Some(0),
            2 => Some(1),
            _ => Some(2),
        }
    }

    fn is_document_root(&self, node: usize) -> bool {
        node == 0
    }

    fn overflow_y(&self, node: usize) -> Overflow {
        if node == 1 { Overflow::Auto } else { Overflow::Visible }
    }

    fn scroll_height(&self, node: usize) -> u32 {
        if node == 1 { 100_000 } else { 0 }
    }

    fn client_height(&self, node: usize) -> u32 {
        if node == 1 { 400 } else { 0 }
    }

    fn rect_top(&self, node: usize) -> Option<i64> {
        match node {
            0 => Some(0),
            1 => Some(100),
            _ => Some(100 - self.scroll_top as i64),
        }
    }

    fn measure(&self, node: usize) -> Option<f64> {
        self.row_heights.get(node.checked_sub(10)?).copied()
    }

    fn page_scroll_top(&self) -> u64 {
        0
    }

    fn page_viewport_height(&self) -> u32 {
        800
    }

    fn element_scroll_top(&self, _node: usize) -> u64 {
        self.scroll_top
    }

    fn set_page_scroll_top(&mut self, _top: u64) {}

    fn set_element_scroll_top(&mut self, _node: usize, top: u64) {
        self.scroll_top = top;
    }
}

fn main() {
    let mut host = Page::default();
    let layout = LayoutTick::new();

    let items: Vec<u32> = (0..1000).collect();
    let options = VariableListOptions::new(|id: &u32, _| Some(*id), Estimate::Fixed(50))
        .with_gap(8)
        .with_overscan(2);
    let mut list = VariableList::new(options, &layout);
    list.set_items(items);
    list.bind_list(&mut host, 2);
    println!(
        "container={:?} total={} window={:?}",
        list.scroll_container(),
        list.total_height(),
        list.window()
    );

    host.scroll_top = 500;
    list.on_scroll(&mut host, 0);
    println!("after scroll: window={:?}", list.window());

    // Render the first rows and report their real heights.
    host.row_heights = vec![80.5, 120.0, 64.0];
    for (i, key) in [0u32, 1, 2].into_iter().enumerate() {
        list.bind_item(&mut host, 10 + i, Some(key), 1_000);
    }
    println!(
        "measured: scroll_top={} row6_top={:?}",
        list.scroll_top(),
        list.offset_of(6)
    );

    let mut table = FixedList::new(
        FixedListOptions::new().with_estimate_size(24).with_overscan(5),
        10_000,
        list.metrics(),
        &layout,
    );
    table.bind(&mut host, 3);
    println!(
        "table rows [{}, {}) spacers {} / {}",
        table.start(),
        table.end(),
        table.top_spacer(),
        table.bottom_spacer()
    );

    list.teardown(&mut host);
    table.teardown(&mut host);
}
