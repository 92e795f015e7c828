// Example: resolve the first screen of a uniform list and scroll to an item.
use windowing::{Align, ScrollTarget, VirtualWindow, WindowOptions};

fn main() {
    let mut w = VirtualWindow::new(WindowOptions::new(100, |_| 30).with_overscan(2));
    w.set_viewport_size(300);

    let visible = w.visible_range();
    println!(
        "total_size={} visible={visible:?} last={:?} virtual={:?}",
        w.total_size(),
        visible.last(),
        w.virtual_range()
    );

    for align in [Align::Start, Align::Center, Align::End] {
        let off = w.scroll_to_offset(&ScrollTarget::Index(50), align, 0);
        println!("scroll_to(50, {align:?}) = {off:?}");
    }

    w.scroll_to(ScrollTarget::Index(50), Align::Start, 0);
    let mut items = Vec::new();
    w.collect_virtual_items(&mut items);
    println!(
        "offset={} first_item={:?} edges={:?}",
        w.scroll_offset(),
        items.first(),
        w.scroll_edges()
    );
}
