// Example: offset table + window queries for variable and fixed row heights.
use listwindow::{OffsetTable, window};

fn main() {
    // 1000 rows estimated at 50px with an 8px gap.
    let table = OffsetTable::build(1000, |_| 50, 8);
    println!("total_height={}", table.total());

    let w = window::window_for_offsets(&table, 500, 400, 2);
    println!("visible={:?} first_top={:?}", w, table.offset(w.start));

    // Uniform rows need no table at all.
    let fixed = window::window_for_fixed(24, 10_000, 2400, 600, 5);
    let spacers = listwindow::FixedWindow::new(fixed, 24, 10_000);
    println!(
        "fixed={:?} top_spacer={} bottom_spacer={}",
        fixed, spacers.top_spacer, spacers.bottom_spacer
    );

    // A list that starts below the viewport top.
    let below = window::window_for_fixed(24, 10_000, -300, 600, 0);
    println!("list below viewport top: {below:?}");
}
