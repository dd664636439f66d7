// Example: coalescing measurements and keeping rows under the viewport still.
use listwindow::{OffsetTable, SizePolicy, SizeReport, SizeTracker, compensation_delta};

fn main() {
    let mut sizes: SizeTracker<&'static str> = SizeTracker::new(SizePolicy::default());
    let keys = ["a", "b", "c", "d"];

    // Small changes are staged; only the first report asks for a flush.
    for (key, px) in [("a", 40), ("b", 44), ("a", 42)] {
        if let SizeReport::Staged { schedule_flush } = sizes.report(key, px) {
            println!("staged {key}={px} schedule_flush={schedule_flush}");
        }
    }
    let changes = sizes.flush();
    println!("flushed {} changes, a={:?}", changes.len(), sizes.get(&"a"));

    let layout = |sizes: &SizeTracker<&'static str>| {
        OffsetTable::build(keys.len(), |i| sizes.get(&keys[i]).unwrap_or(50), 0)
    };
    let before = layout(&sizes);

    // A large change is applied at once; scroll by its delta if the row sits above the
    // viewport top.
    let viewport_top = 100;
    if let SizeReport::Applied(change) = sizes.report("a", 300) {
        let item_top = before.offset(0).unwrap_or(0);
        let delta = compensation_delta(item_top, &change, viewport_top);
        println!("a grew by {}: scroll by {delta}", change.delta());
    }
    let after = layout(&sizes);
    println!(
        "offsets before={:?} after={:?}",
        before.offsets(),
        after.offsets()
    );
}
