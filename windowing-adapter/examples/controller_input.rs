// Example: wheel input with edge hand-off, then a touch flick decaying over frames.
use windowing::WindowOptions;
use windowing_adapter::{Controller, ScrollDelta, ScrollOutcome};

fn main() {
    let mut c = Controller::new(WindowOptions::new(1_000, |_| 32));
    c.on_viewport_size(480);

    // At the top, scrolling further back goes to the parent scroller.
    match c.on_wheel(ScrollDelta::new(0.0, -120.0), 0) {
        ScrollOutcome::PassThrough { delta } => println!("hand off to parent: {delta:?}"),
        other => println!("unexpected: {other:?}"),
    }
    println!("wheel: {:?}", c.on_wheel(ScrollDelta::new(0.0, 120.0), 8));

    c.on_touch_start(200.0, 600.0);
    c.on_touch_move(200.0, 560.0, 16);
    c.on_touch_move(201.0, 500.0, 32);
    c.on_touch_end();

    let mut frame = 0u64;
    while c.has_momentum() {
        frame += 1;
        if let Some(off) = c.tick_frame(frame, 32 + frame * 16) {
            if frame % 10 == 0 {
                println!("frame={frame} offset={off} visible={:?}", c.window().visible_range());
            }
        }
    }
    println!(
        "settled after {frame} frames at offset={} edges={:?}",
        c.window().scroll_offset(),
        c.scroll_edges()
    );
}
