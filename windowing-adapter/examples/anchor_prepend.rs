// Example: keep the viewport still while older messages are prepended to a chat log.
use windowing::{VirtualWindow, WindowOptions};
use windowing_adapter::Controller;

fn main() {
    let window = VirtualWindow::new(WindowOptions::new_with_key(100, |_| 24, |i| 1_000 + i as u64));
    let mut c = Controller::from_window(window);
    c.on_viewport_size(240);
    c.window_mut().set_scroll_offset_clamped(1_212);

    // 1) capture before the data changes
    let anchor = c
        .capture_first_visible_anchor()
        .expect("visible range must not be empty");
    println!(
        "before: offset={} anchor={anchor:?}",
        c.window().scroll_offset()
    );

    // 2) prepend 20 older messages
    let keys: Vec<u64> = (2_000..2_020).chain(1_000..1_100).collect();
    c.window_mut().set_dataset(keys);

    // 3) restore; the anchored message keeps its place on screen
    let ok = c.apply_anchor(&anchor);
    println!("after: ok={ok} offset={}", c.window().scroll_offset());
}
