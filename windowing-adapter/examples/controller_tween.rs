// Example: animate a programmatic scroll and read back the offset each frame.
use windowing::{Align, ScrollTarget, WindowOptions};
use windowing_adapter::{Controller, Easing};

fn main() {
    let mut c = Controller::new(WindowOptions::new(10_000, |_| 1));
    c.on_viewport_size(20);

    let target = c
        .start_tween_to(&ScrollTarget::Index(2_000), Align::Center, 0, 240, Easing::EaseOutCubic)
        .expect("list is not empty");
    println!("target_offset={target}");

    let mut frame = 0u64;
    while c.is_animating() {
        frame += 1;
        let now_ms = frame * 16;
        if let Some(off) = c.tick_frame(frame, now_ms) {
            if now_ms % 80 == 0 {
                println!("t={now_ms} off={off} visible={:?}", c.window().visible_range());
            }
        }
    }

    println!(
        "done: off={} range={:?}",
        c.window().scroll_offset(),
        c.window().virtual_range()
    );
}
