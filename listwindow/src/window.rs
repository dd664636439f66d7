//! Offset → index window queries.
//!
//! Two flavors are provided: a binary search over an [`OffsetTable`] for lists whose rows have
//! different heights, and closed-form arithmetic for lists where every row has the same height
//! and materializing offsets would be wasted work.
use crate::{OffsetTable, VisibleWindow};

/// Returns the smallest window covering `[viewport_top, viewport_top + viewport_height]`,
/// extended by `overscan` items on both sides and clamped to the table.
///
/// `viewport_top` is relative to the top of the list content. Runs in `O(log n)`.
pub fn window_for_offsets(
    table: &OffsetTable,
    viewport_top: u64,
    viewport_height: u32,
    overscan: usize,
) -> VisibleWindow {
    let count = table.len();
    if count == 0 {
        return VisibleWindow::EMPTY;
    }
    let first = table.index_at(viewport_top);
    let last = table.index_at(viewport_top.saturating_add(viewport_height as u64));

    let start = first.saturating_sub(overscan).min(count);
    let end = last
        .saturating_add(overscan)
        .saturating_add(1)
        .clamp(start, count);
    lwtrace!(viewport_top, viewport_height, start, end, "window_for_offsets");
    VisibleWindow { start, end }
}

/// Window query for a list where every row is `row_height` pixels tall.
///
/// `viewport_top` may be negative when the list starts below the top of the viewport.
pub fn window_for_fixed(
    row_height: u32,
    count: usize,
    viewport_top: i64,
    viewport_height: u32,
    overscan: usize,
) -> VisibleWindow {
    if count == 0 || row_height == 0 {
        return VisibleWindow::EMPTY;
    }
    let h = row_height as i64;
    let bottom = viewport_top.saturating_add(viewport_height as i64);
    let overscan = i64::try_from(overscan).unwrap_or(i64::MAX);
    let n = i64::try_from(count).unwrap_or(i64::MAX);

    let start = viewport_top
        .div_euclid(h)
        .saturating_sub(overscan)
        .clamp(0, n);
    let end = div_ceil(bottom, h).saturating_add(overscan).clamp(start, n);

    VisibleWindow {
        start: start as usize,
        end: end as usize,
    }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    let q = a.div_euclid(b);
    if a.rem_euclid(b) == 0 { q } else { q + 1 }
}
