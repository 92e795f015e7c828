// Example: measurements follow string keys across dataset changes and are pruned when their key
// disappears.
use windowing::{VirtualWindow, WindowOptions};

fn main() {
    let mut w: VirtualWindow<String> =
        VirtualWindow::new(WindowOptions::new_with_key(0, |_| 20, |i| format!("row-{i}")));

    w.set_dataset(vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]);
    w.measure(0, 64);
    w.measure(2, 48);
    println!(
        "before: sizes={:?} cached={}",
        (0..w.count()).map(|i| w.item_size(i)).collect::<Vec<_>>(),
        w.measurement_cache_len()
    );

    // "alice" leaves, "carol" moves to the front, "dave" arrives.
    w.set_dataset(vec!["carol".to_string(), "bob".to_string(), "dave".to_string()]);
    println!(
        "after: sizes={:?} measured={:?} cached={}",
        (0..w.count()).map(|i| w.item_size(i)).collect::<Vec<_>>(),
        (0..w.count()).map(|i| w.is_measured(i)).collect::<Vec<_>>(),
        w.measurement_cache_len()
    );
}
