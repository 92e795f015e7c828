// Example: sticky section headers through a range extractor.
use std::sync::Arc;

use windowing::{ExtractRange, IndexEmitter, VirtualWindow, WindowOptions};

fn main() {
    let headers: Arc<[usize]> = Arc::from([0usize, 25, 50, 75]);

    let opts = WindowOptions::new(100, |_| 20)
        .with_overscan(1)
        .with_range_extractor(Some({
            let headers = Arc::clone(&headers);
            move |r: ExtractRange, emit: &mut dyn FnMut(usize)| {
                let mut e = IndexEmitter::new(r, emit);
                // The active header goes first; the span skips it if they overlap.
                if let Some(&h) = headers.iter().rev().find(|&&h| h <= r.start_index) {
                    e.emit(h);
                }
                e.emit_overscanned();
            }
        }));

    let mut w = VirtualWindow::new(opts);
    w.set_viewport_and_scroll_clamped(100, 640);

    let mut indexes = Vec::new();
    w.collect_virtual_indexes(&mut indexes);
    println!("visible={:?} rendered={indexes:?}", w.visible_range());
}
