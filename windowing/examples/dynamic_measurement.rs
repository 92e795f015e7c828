// Example: measurements replace estimates, and a scroll-to follows them until the target and
// the rows rendered before it are measured.
use windowing::{Align, ScrollTarget, VirtualWindow, WindowOptions};

fn main() {
    let mut w = VirtualWindow::new(WindowOptions::new(100, |_| 30));
    w.set_viewport_size(300);

    let coarse = w.scroll_to(ScrollTarget::Index(50), Align::Start, 0);
    println!(
        "coarse offset={coarse:?} pending={:?}",
        w.pending_scroll()
    );

    // Rows above the target turn out taller than estimated.
    w.measure_many([(10, 80), (11, 45)]);
    println!(
        "after measuring rows above: offset={} total={}",
        w.scroll_offset(),
        w.total_size()
    );

    // The overscan row and the target settle the scroll.
    w.measure(49, 30);
    w.measure_px(50, 41.6);
    println!(
        "target measured: offset={} pending={}",
        w.scroll_offset(),
        w.pending_scroll().is_some()
    );

    // `resize_item` keeps the view steady when an item above the viewport changes.
    let applied = w.resize_item(0, 60);
    println!("resize_item(0): applied={applied} offset={}", w.scroll_offset());

    // Host floats are sanitized: NaN is ignored, negatives clamp to zero.
    w.measure_px(1, f32::NAN);
    w.set_viewport_px(-20.0);
    println!(
        "measured(1)={} viewport={} visible={:?}",
        w.is_measured(1),
        w.viewport_size(),
        w.visible_range()
    );
}
