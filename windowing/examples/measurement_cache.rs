// Example: carry measurements across screens with export/import.
use windowing::{VirtualWindow, WindowOptions};

fn main() {
    let mut first = VirtualWindow::new(WindowOptions::new(10, |_| 1));
    first.measure(2, 10);
    first.measure(5, 42);

    let snapshot = first.export_measurement_cache();
    println!("exported={snapshot:?}");

    let mut second = VirtualWindow::new(WindowOptions::new(10, |_| 1));
    second.import_measurement_cache(snapshot);
    println!(
        "imported: cached={} size2={:?} size5={:?} total={}",
        second.measurement_cache_len(),
        second.item_size(2),
        second.item_size(5),
        second.total_size()
    );
}
