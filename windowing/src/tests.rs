use crate::*;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic PRNG so property tests stay reproducible without extra dev-dependencies.
#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        start + (self.next_u64() >> 11) % (end_exclusive - start)
    }

    fn range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.range_u64(start as u64, end_exclusive as u64) as u32
    }
}

fn naive_start_in_list(sizes: &[u32], gap: u32, padding_start: u32, index: usize) -> u64 {
    let mut off = padding_start as u64;
    for (i, &size) in sizes.iter().enumerate().take(index) {
        off += size as u64;
        if i + 1 < sizes.len() {
            off += gap as u64;
        }
    }
    off
}

fn naive_total(sizes: &[u32], gap: u32, padding_start: u32, padding_end: u32) -> u64 {
    naive_start_in_list(sizes, gap, padding_start, sizes.len()) + padding_end as u64
}

/// Linear-scan reference for the Fenwick descent: the last item whose start is `<= offset`,
/// skipping zero-sized items.
fn naive_index_at(sizes: &[u32], gap: u32, padding_start: u32, offset_in_list: u64) -> Option<usize> {
    if sizes.is_empty() {
        return None;
    }
    let target = offset_in_list.saturating_sub(padding_start as u64);
    let mut consumed = 0usize;
    let mut prefix = 0u64;
    for (i, &size) in sizes.iter().enumerate() {
        let mut seg = size as u64;
        if i + 1 < sizes.len() {
            seg += gap as u64;
        }
        if prefix + seg > target {
            break;
        }
        prefix += seg;
        consumed += 1;
    }
    Some(consumed.min(sizes.len() - 1))
}

fn uniform(count: usize, size: u32) -> VirtualWindow {
    VirtualWindow::new(WindowOptions::new(count, move |_| size))
}

#[test]
fn uniform_list_resolves_first_screen() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);

    let range = w.resolve(w.viewport(), 0);
    assert_eq!(range.start_index, 0);
    assert_eq!(range.last(), Some(9));

    let range = w.resolve(w.viewport(), 3);
    assert_eq!(range.start_index, 0);
    assert_eq!(range.last(), Some(12));
}

#[test]
fn uniform_list_scroll_to_start_and_end() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);

    assert_eq!(
        w.scroll_to_offset(&ScrollTarget::Index(50), Align::Start, 0),
        Some(1500)
    );
    assert_eq!(
        w.scroll_to_offset(&ScrollTarget::Index(50), Align::End, 0),
        Some(1500 + 30 - 300)
    );
}

#[test]
fn mixed_sizes_only_shift_offsets_after_the_changed_item() {
    let keys: Vec<String> = ["key0", "key1", "key2", "key3"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut w = VirtualWindow::new(WindowOptions::new_with_key(4, |_| 30, {
        let keys = keys.clone();
        move |i: usize| keys[i].clone()
    }));
    w.measure_keyed(0, "key0".to_string(), 20);
    w.measure_keyed(1, "key1".to_string(), 40);
    assert!(!w.is_measured(2));
    assert_eq!(w.offset_of(2), 60);

    w.measure_keyed(2, "key2".to_string(), 50);
    assert_eq!(w.offset_of(0), 0);
    assert_eq!(w.offset_of(1), 20);
    assert_eq!(w.offset_of(3), 110);
}

#[test]
fn repeated_measurement_is_a_no_op() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut w = uniform(10, 10);
    w.measure(3, 25);
    let before: Vec<u64> = (0..=10).map(|i| w.offset_of(i)).collect();

    w.set_on_change(Some({
        let calls = Arc::clone(&calls);
        move |_: &VirtualWindow, _: bool| {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    }));
    calls.store(0, Ordering::Relaxed);

    w.measure(3, 25);
    let after: Vec<u64> = (0..=10).map(|i| w.offset_of(i)).collect();
    assert_eq!(before, after);
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn empty_list_offsets_are_zero() {
    let mut w = uniform(0, 30);
    w.set_viewport_size(300);
    assert_eq!(w.offset_of(0), 0);
    assert_eq!(w.index_at_offset(0), None);
    assert_eq!(w.index_at_offset_or_zero(12_345), 0);
    assert!(w.virtual_range().is_empty());
    assert_eq!(w.virtual_range().last(), None);
    assert_eq!(w.scroll_to_offset(&ScrollTarget::Index(3), Align::Start, 0), None);
}

#[test]
fn offsets_past_content_map_to_last_index() {
    let w = uniform(10, 5);
    assert_eq!(w.index_at_offset(49), Some(9));
    assert_eq!(w.index_at_offset(50), Some(9));
    assert_eq!(w.index_at_offset(u64::MAX), Some(9));
}

#[test]
fn zero_container_yields_empty_range() {
    let mut w = uniform(100, 30);
    w.set_viewport_px(-300.0);
    assert_eq!(w.viewport_size(), 0);
    assert!(w.virtual_range().is_empty());
    w.set_viewport_px(f32::NAN);
    assert!(w.visible_range().is_empty());
}

#[test]
fn overscan_and_scroll() {
    let mut w = uniform(100, 1);
    w.set_viewport_size(10);
    w.set_scroll_offset(50);
    let r = w.virtual_range();
    assert_eq!(r.start_index, 49);
    assert_eq!(r.end_index, 61);
}

#[test]
fn padding_and_gap_affect_total_and_positions() {
    let w = VirtualWindow::new(
        WindowOptions::new(3, |_| 2)
            .with_padding(10, 5)
            .with_gap(1),
    );
    // 10 + (2+1) + (2+1) + 2 + 5
    assert_eq!(w.total_size(), 23);
    assert_eq!(w.item_start(1), Some(13));

    let mut items = Vec::new();
    w.for_each_virtual_item(|it| items.push(it));
    assert!(items.is_empty());
}

#[test]
fn index_at_offset_maps_gaps_to_previous_item() {
    let w = VirtualWindow::new(WindowOptions::new(2, |_| 2).with_gap(1));
    assert_eq!(w.index_at_offset(0), Some(0));
    assert_eq!(w.index_at_offset(2), Some(0));
    assert_eq!(w.index_at_offset(3), Some(1));
    assert_eq!(w.item_at_offset(4).map(|it| it.index), Some(1));
}

#[test]
fn scroll_to_index_offset_respects_padding_margin_gap_and_scroll_padding() {
    let mut w = VirtualWindow::new(
        WindowOptions::new(3, |_| 2)
            .with_gap(1)
            .with_padding(10, 0)
            .with_scroll_margin(50)
            .with_scroll_padding(5, 4),
    );
    w.set_viewport_size(10);

    assert_eq!(w.item_start(0), Some(60));
    assert_eq!(w.item_start(1), Some(63));
    assert_eq!(w.scroll_to_index_offset(1, Align::Start), 58);
    // item0 end = 62; 62 + 4 - 10
    assert_eq!(w.scroll_to_index_offset(0, Align::End), 56);
}

#[test]
fn scroll_to_offset_px_moves_away_from_the_aligned_edge() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);
    let target = ScrollTarget::Index(50);
    assert_eq!(w.scroll_to_offset(&target, Align::Start, 20), Some(1480));
    assert_eq!(w.scroll_to_offset(&target, Align::End, 20), Some(1250));
    // Center: 1500 + 15 - 150
    assert_eq!(w.scroll_to_offset(&target, Align::Center, 0), Some(1365));
}

#[test]
fn scroll_to_clamps_out_of_range_index_and_resolves_keys() {
    let mut w = VirtualWindow::new(WindowOptions::new_with_key(10, |_| 10, |i| i as u64 * 100));
    w.set_viewport_size(30);

    assert_eq!(
        w.scroll_to_offset(&ScrollTarget::Index(500), Align::Start, 0),
        Some(w.max_scroll_offset())
    );
    assert_eq!(
        w.scroll_to_offset(&ScrollTarget::Key(300), Align::Start, 0),
        Some(30)
    );
    assert_eq!(w.scroll_to_offset(&ScrollTarget::Key(301), Align::Start, 0), None);
}

#[test]
fn align_auto_keeps_offset_when_fully_visible() {
    let mut w = uniform(10, 1);
    w.set_viewport_size(5);
    w.set_scroll_offset(3);
    assert_eq!(w.scroll_to_index_offset(4, Align::Auto), 3);
    // Above the viewport: behaves like Start.
    assert_eq!(w.scroll_to_index_offset(1, Align::Auto), 1);
}

#[test]
fn align_auto_scrolls_to_end_when_item_is_after_viewport() {
    let mut w = VirtualWindow::new(WindowOptions::new(10, |_| 1).with_scroll_padding(0, 2));
    w.set_viewport_size(5);
    w.set_scroll_offset(3);
    assert_eq!(
        w.scroll_to_index_offset(9, Align::Auto),
        w.scroll_to_index_offset(9, Align::End)
    );
    assert_eq!(w.scroll_to_index_offset(9, Align::Auto), w.max_scroll_offset());
}

#[test]
fn two_phase_scroll_corrects_after_measurement() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);

    let coarse = w.scroll_to(ScrollTarget::Index(50), Align::Start, 0);
    assert_eq!(coarse, Some(1500));
    assert!(w.pending_scroll().is_some());

    // An item above the target grows: the pending scroll follows.
    w.measure(10, 80);
    assert_eq!(w.scroll_offset(), 1550);
    assert!(w.pending_scroll().is_some());

    // The target and the overscan row before it settle it.
    w.measure_many([(49, 30), (50, 40)]);
    assert_eq!(w.scroll_offset(), 1550);
    assert!(w.pending_scroll().is_none());

    w.measure(5, 60);
    assert_eq!(w.scroll_offset(), 1550);
}

#[test]
fn pending_scroll_follows_rows_measured_after_the_target() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);
    w.scroll_to(ScrollTarget::Index(50), Align::Start, 0);

    w.measure(50, 30);
    assert_eq!(w.scroll_offset(), 1500);
    assert!(w.pending_scroll().is_some());

    // The overscan row above the target turns out taller.
    w.measure(49, 60);
    assert_eq!(w.scroll_offset(), 1530);
    assert_eq!(w.item_start(50), Some(1530));
    assert!(w.pending_scroll().is_none());
}

#[test]
fn user_scroll_cancels_pending_correction() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);
    w.scroll_to(ScrollTarget::Index(50), Align::Start, 0);
    w.apply_scroll_offset_event_clamped(200, 0);
    assert!(w.pending_scroll().is_none());

    w.measure(0, 100);
    assert_eq!(w.scroll_offset(), 200);
}

#[test]
fn scroll_to_measured_target_does_not_stay_pending() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);
    w.measure_many([(19, 30), (20, 30)]);
    w.scroll_to(ScrollTarget::Index(20), Align::Start, 0);
    assert!(w.pending_scroll().is_none());
    assert_eq!(w.scroll_offset(), 600);
}

#[test]
fn content_end_bounds_scroll_offset() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);
    assert_eq!(w.total_size(), 3_000);
    assert_eq!(w.max_scroll_offset(), 2_700);

    w.set_scroll_offset_clamped(u64::MAX);
    assert_eq!(w.scroll_offset(), 2_700);
    assert_eq!(
        w.visible_range(),
        ItemRange {
            start_index: 90,
            end_index: 100
        }
    );
    assert_eq!(
        w.scroll_to_offset(&ScrollTarget::Index(99), Align::Start, 0),
        Some(2_700)
    );
}

#[test]
fn scroll_edges_report_remaining_room() {
    let mut w = uniform(100, 30);
    w.set_viewport_size(300);
    assert_eq!(
        w.scroll_edges(),
        ScrollEdges {
            can_scroll_backward: false,
            can_scroll_forward: true,
        }
    );

    w.set_scroll_offset_clamped(u64::MAX);
    assert_eq!(w.scroll_offset(), 2700);
    assert_eq!(
        w.scroll_edges(),
        ScrollEdges {
            can_scroll_backward: true,
            can_scroll_forward: false,
        }
    );

    let mut short = uniform(3, 30);
    short.set_viewport_size(300);
    assert_eq!(short.scroll_edges(), ScrollEdges::default());
}

#[test]
fn measurements_follow_keys_after_reorder() {
    let mut w = uniform(2, 1);
    w.measure(0, 10);
    assert_eq!(w.item_size(0), Some(10));
    assert_eq!(w.item_size(1), Some(1));

    w.set_get_item_key(|i| if i == 0 { 1 } else { 0 });
    assert_eq!(w.item_size(0), Some(1));
    assert_eq!(w.item_size(1), Some(10));
}

#[test]
fn set_dataset_moves_and_prunes_measurements() {
    let mut w: VirtualWindow<String> =
        VirtualWindow::new(WindowOptions::new_with_key(0, |_| 30, |i| i.to_string()));
    w.set_dataset(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    w.measure(0, 20);
    w.measure(2, 50);
    assert_eq!(w.measurement_cache_len(), 2);

    // "a" is dropped, "c" moves to the front.
    w.set_dataset(vec!["c".to_string(), "b".to_string(), "d".to_string()]);
    assert_eq!(w.item_size(0), Some(50));
    assert!(w.is_measured(0));
    assert_eq!(w.item_size(2), Some(30));
    assert_eq!(w.measurement_cache_len(), 1);
    assert!(!w.size_cache().contains(&"a".to_string()));
}

#[test]
fn set_dataset_caps_count_at_key_list() {
    let mut w = VirtualWindow::new(WindowOptions::new(0, |_| 10));
    w.set_dataset(vec![10u64, 20, 30]);
    w.set_count(4);
    assert_eq!(w.count(), 3);
    assert_eq!(w.total_size(), 30);

    w.set_count(2);
    assert_eq!(w.count(), 2);
    assert_eq!(w.index_of_key(&30), None);

    w.update_options(|o| o.count = 10);
    assert_eq!(w.count(), 3);
    assert_eq!(w.index_of_key(&30), Some(2));

    // A new key mapping releases the cap.
    w.set_get_item_key(|i| i as u64);
    w.set_count(5);
    assert_eq!(w.count(), 5);
    assert_eq!(w.total_size(), 50);
}

#[test]
fn index_of_key_finds_first_position_in_dataset() {
    let mut w: VirtualWindow<String> =
        VirtualWindow::new(WindowOptions::new_with_key(0, |_| 1, |i: usize| i.to_string()));
    w.set_dataset(vec!["x".to_string(), "y".to_string(), "x".to_string()]);
    assert_eq!(w.index_of_key(&"y".to_string()), Some(1));
    assert_eq!(w.index_of_key(&"x".to_string()), Some(0));
    assert_eq!(w.index_of_key(&"z".to_string()), None);

    w.set_dataset(vec!["y".to_string()]);
    assert_eq!(w.index_of_key(&"y".to_string()), Some(0));
    assert_eq!(w.index_of_key(&"x".to_string()), None);
}

#[test]
fn shrinking_count_prunes_removed_keys() {
    let mut w = uniform(4, 1);
    w.measure(3, 7);
    w.set_count(2);
    assert_eq!(w.measurement_cache_len(), 0);
    w.set_count(4);
    assert_eq!(w.item_size(3), Some(1));
}

#[test]
fn set_count_can_keep_measurements_when_pruning_is_off() {
    let mut w = VirtualWindow::new(
        WindowOptions::new(2, |_| 1)
            .with_gap(1)
            .with_prune_measurements(false),
    );
    w.measure(0, 5);
    w.set_count(4);
    w.measure(3, 7);

    // sizes [5,1,1,7] + 3 gaps
    assert_eq!(w.total_size(), 17);
    assert_eq!(w.item_start(3), Some(10));
    assert_eq!(w.item_end(3), Some(17));

    w.set_count(2);
    assert_eq!(w.total_size(), 7);
    assert_eq!(w.item_size(3), None);

    w.set_count(4);
    assert_eq!(w.item_size(3), Some(7));
    assert_eq!(w.item_start(3), Some(10));
}

#[test]
fn set_count_updates_gap_bookkeeping() {
    let mut w = VirtualWindow::new(WindowOptions::new(1, |_| 2).with_gap(1));
    assert_eq!(w.total_size(), 2);

    w.set_count(2);
    assert_eq!(w.total_size(), 5);
    assert_eq!(w.index_at_offset(2), Some(0));
    assert_eq!(w.index_at_offset(3), Some(1));

    w.set_count(1);
    assert_eq!(w.total_size(), 2);

    w.set_count(0);
    assert_eq!(w.total_size(), 0);
    assert_eq!(w.index_at_offset(0), None);
}

#[test]
fn evict_falls_back_to_estimate() {
    let mut w = uniform(5, 10);
    w.measure(1, 40);
    w.measure(2, 40);
    assert_eq!(w.offset_of(3), 90);

    w.evict_index(1);
    assert!(!w.is_measured(1));
    assert_eq!(w.offset_of(3), 60);

    assert!(w.evict_key(&2));
    assert!(!w.evict_key(&2));
    assert_eq!(w.offset_of(3), 30);
    assert_eq!(w.measurement_cache_len(), 0);
}

#[test]
fn measure_px_ignores_nan_and_clamps_negative() {
    let mut w = uniform(3, 10);
    w.measure_px(0, f32::NAN);
    assert!(!w.is_measured(0));
    w.measure_px(0, -5.0);
    assert_eq!(w.item_size(0), Some(0));
    w.measure_px(1, 12.6);
    assert_eq!(w.item_size(1), Some(13));
}

#[test]
fn measure_many_marks_items_measured_and_updates_total() {
    let mut w = uniform(4, 1);
    w.measure_many([(0, 10), (3, 7), (99, 1)]);
    assert!(w.is_measured(0));
    assert!(w.is_measured(3));
    assert_eq!(w.total_size(), 10 + 1 + 1 + 7);
}

#[test]
fn resize_item_adjusts_scroll_for_items_before_viewport() {
    let mut w = uniform(5, 10);
    w.set_viewport_size(10);
    w.set_scroll_offset(30);
    assert_eq!(w.resize_item(0, 15), 5);
    assert_eq!(w.scroll_offset(), 35);

    // Items after the offset do not move it.
    assert_eq!(w.resize_item(4, 20), 0);
    assert_eq!(w.scroll_offset(), 35);
}

#[test]
fn resize_item_many_sums_applied_deltas() {
    let mut w = uniform(4, 1);
    w.set_viewport_size(2);
    w.set_scroll_offset(100);
    assert_eq!(w.resize_item_many([(0, 4), (2, 0)]), 2);
    assert_eq!(w.scroll_offset(), 102);
}

#[test]
fn adjust_scroll_hook_can_veto() {
    let mut w = VirtualWindow::new(
        WindowOptions::new(5, |_| 10)
            .with_adjust_scroll_on_resize(Some(|_: &VirtualWindow, _: WindowItem, _: i64| false)),
    );
    w.set_viewport_and_scroll(10, 30);
    assert_eq!(w.resize_item(0, 15), 0);
    assert_eq!(w.scroll_offset(), 30);
}

#[test]
fn sync_item_keys_reads_mutated_key_mapping() {
    use std::sync::Mutex;

    let keys = Arc::new(Mutex::new(vec![0u64, 1, 2]));
    let mut w = VirtualWindow::new(WindowOptions::new_with_key(3, |_| 1, {
        let keys = Arc::clone(&keys);
        move |i: usize| keys.lock().unwrap()[i]
    }));
    w.measure(0, 10);

    if let Ok(mut k) = keys.lock() {
        *k = vec![2, 1, 0];
    }
    w.sync_item_keys();
    assert_eq!(w.item_size(0), Some(1));
    assert_eq!(w.item_size(2), Some(10));
}

#[test]
fn range_extractor_can_pin_indices() {
    let mut w = VirtualWindow::new(WindowOptions::new(100, |_| 1).with_overscan(0).with_range_extractor(
        Some(|r: ExtractRange, emit: &mut dyn FnMut(usize)| {
            let mut e = IndexEmitter::new(r, emit);
            e.emit(0);
            e.emit_visible();
        }),
    ));
    w.set_viewport_and_scroll(5, 50);
    let mut items = Vec::new();
    w.collect_virtual_items(&mut items);
    assert_eq!(items[0].index, 0);
    assert_eq!(items[0].start, 0);
    assert!(items.iter().any(|it| it.index == 50 && it.start == 50));
}

#[test]
fn emitter_span_skips_indexes_already_pinned() {
    let mut w = VirtualWindow::new(WindowOptions::new(100, |_| 1).with_overscan(2).with_range_extractor(
        Some(|r: ExtractRange, emit: &mut dyn FnMut(usize)| {
            let mut e = IndexEmitter::new(r, emit);
            e.emit(r.start_index - 1);
            assert_eq!(e.last_emitted(), Some(r.start_index - 1));
            e.emit_overscanned();
        }),
    ));
    w.set_viewport_and_scroll(3, 20);
    let mut out = Vec::new();
    w.collect_virtual_indexes(&mut out);
    assert_eq!(out, vec![19, 20, 21, 22, 23, 24]);
}

#[test]
fn range_extractor_dedupes_consecutive_duplicates() {
    let mut w = VirtualWindow::new(WindowOptions::new(10, |_| 1).with_overscan(0).with_range_extractor(
        Some(|r: ExtractRange, emit: &mut dyn FnMut(usize)| {
            emit(r.start_index);
            emit(r.start_index);
            emit(r.start_index + 1);
        }),
    ));
    w.set_viewport_size(3);
    let mut out = Vec::new();
    w.collect_virtual_indexes(&mut out);
    assert_eq!(out, vec![0, 1]);
}

#[test]
fn keyed_items_match_plain_items() {
    let mut w = uniform(100, 1);
    w.set_viewport_and_scroll_clamped(10, 50);

    let mut plain = Vec::new();
    w.collect_virtual_items(&mut plain);
    let mut keyed = Vec::new();
    w.collect_virtual_items_keyed(&mut keyed);

    assert_eq!(plain.len(), keyed.len());
    for (a, b) in plain.iter().zip(&keyed) {
        assert_eq!((a.index, a.start, a.size), (b.index, b.start, b.size));
        assert_eq!(b.key, b.index as u64);
    }
}

#[test]
fn disabled_window_is_empty_and_side_effect_free() {
    let mut w = VirtualWindow::new(WindowOptions::new(10, |_| 1).with_enabled(false));
    assert_eq!(w.total_size(), 0);
    assert!(w.virtual_range().is_empty());
    assert_eq!(w.index_at_offset(0), None);
    assert_eq!(w.scroll_edges(), ScrollEdges::default());

    w.set_viewport_and_scroll_clamped(10, 5);
    assert!(w.virtual_range().is_empty());

    w.set_enabled(true);
    assert_eq!(w.total_size(), 10);
}

#[test]
fn visible_range_clamps_overscrolled_offsets() {
    let mut w = uniform(5, 1);
    w.set_viewport_size(2);
    assert_eq!(
        w.visible_range_for(u64::MAX, 2),
        ItemRange {
            start_index: 3,
            end_index: 5
        }
    );
    assert_eq!(
        w.virtual_range_for(u64::MAX, 2),
        ItemRange {
            start_index: 2,
            end_index: 5
        }
    );
}

#[test]
fn scroll_margin_affects_visibility_and_item_starts() {
    let mut w = VirtualWindow::new(WindowOptions::new(100, |_| 1).with_scroll_margin(50));
    w.set_viewport_size(10);

    let mut items = Vec::new();
    w.collect_virtual_items(&mut items);
    assert!(items.is_empty());

    w.set_scroll_offset(45);
    w.collect_virtual_items(&mut items);
    assert_eq!(items[0].index, 0);
    assert_eq!(items[0].start, 50);
    assert_eq!(w.scroll_offset_in_list(), 0);
}

#[test]
fn is_scrolling_resets_after_debounce_delay() {
    let mut w = VirtualWindow::new(WindowOptions::new(10, |_| 1).with_is_scrolling_reset_delay_ms(100));
    w.apply_scroll_offset_event(3, 1_000);
    assert!(w.is_scrolling());
    assert_eq!(w.scroll_direction(), Some(ScrollDirection::Forward));

    w.update_scrolling(1_050);
    assert!(w.is_scrolling());
    w.update_scrolling(1_100);
    assert!(!w.is_scrolling());
    assert_eq!(w.scroll_direction(), None);
}

#[test]
fn batch_update_coalesces_on_change() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut w = VirtualWindow::new(WindowOptions::new(100, |_| 1).with_on_change(Some({
        let calls = Arc::clone(&calls);
        move |_: &VirtualWindow, _: bool| {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    })));

    w.batch_update(|w| {
        w.set_viewport_size(10);
        w.batch_update(|w| w.set_scroll_offset(20));
        w.measure(0, 4);
    });
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    w.apply_scroll_frame(Rect { main: 12, cross: 3 }, 30, 0);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn set_options_rebuilds_when_closures_change() {
    let mut w = uniform(3, 1);
    assert_eq!(w.total_size(), 3);
    w.update_options(|o| o.estimate_size = Arc::new(|_: usize| 2u32));
    assert_eq!(w.total_size(), 6);
    w.update_options(|o| o.count = 5);
    assert_eq!(w.total_size(), 10);
}

#[test]
fn initial_offset_provider_and_rect_are_applied() {
    let w = VirtualWindow::new(
        WindowOptions::new(1_000, |_| 1)
            .with_initial_rect(Some(Rect { main: 10, cross: 80 }))
            .with_initial_offset_provider(|| 120),
    );
    assert_eq!(w.scroll_offset(), 120);
    assert_eq!(w.viewport_size(), 10);
    assert_eq!(w.virtual_range().start_index, 119);
}

#[test]
fn frame_state_roundtrips() {
    let mut a = uniform(1_000, 1);
    a.apply_scroll_frame(Rect { main: 20, cross: 7 }, 300, 5);
    let frame = a.frame_state();

    let mut b = uniform(1_000, 1);
    b.restore_frame_state(frame, 10);
    assert_eq!(b.frame_state(), frame);
    assert!(b.is_scrolling());
}

#[test]
fn measurement_cache_roundtrips() {
    let mut a = uniform(20, 3);
    a.measure_many([(1, 9), (7, 4)]);
    let exported = a.export_measurement_cache();
    assert_eq!(exported.len(), 2);

    let mut b = uniform(20, 3);
    b.import_measurement_cache(exported);
    for i in 0..20 {
        assert_eq!(a.item_size(i), b.item_size(i));
        assert_eq!(a.is_measured(i), b.is_measured(i));
    }

    b.reset_measurements();
    assert_eq!(b.measurement_cache_len(), 0);
    assert_eq!(b.total_size(), 60);
}

#[test]
fn large_list_smoke() {
    let mut w = uniform(1_000_000, 1);
    w.set_viewport_and_scroll(10, 123_456);
    let r = w.virtual_range();
    assert!(r.contains(123_456));
    assert_eq!(w.scroll_to_index(999_999, Align::End), 999_990);
    assert!(!w.is_scrolling());
}

#[test]
fn property_offsets_are_monotonic_and_invertible() {
    for seed in [1u64, 2, 3, 7, 42, 123, 999] {
        let mut rng = Lcg::new(seed);
        let count = rng.range_usize(1, 200);
        let gap = rng.range_u32(0, 4);
        let padding_start = rng.range_u32(0, 9);
        let padding_end = rng.range_u32(0, 9);
        let scroll_margin = rng.range_u32(0, 9);

        let mut sizes: Vec<u32> = (0..count).map(|_| rng.range_u32(1, 40)).collect();
        let estimates = Arc::new(sizes.clone());
        let mut w = VirtualWindow::new(
            WindowOptions::new(count, {
                let estimates = Arc::clone(&estimates);
                move |i: usize| estimates[i]
            })
            .with_gap(gap)
            .with_padding(padding_start, padding_end)
            .with_scroll_margin(scroll_margin),
        );
        assert_eq!(w.total_size(), naive_total(&sizes, gap, padding_start, padding_end));

        for i in 0..count {
            let start = scroll_margin as u64 + naive_start_in_list(&sizes, gap, padding_start, i);
            assert_eq!(w.offset_of(i), start);
            assert_eq!(w.index_at_offset(start), Some(i));
            if i > 0 {
                assert!(w.offset_of(i - 1) <= w.offset_of(i));
            }
        }

        // Random re-measurements, zero sizes included.
        for _ in 0..30 {
            let index = rng.range_usize(0, count);
            let size = rng.range_u32(0, 60);
            sizes[index] = size;
            w.measure(index, size);
        }
        assert_eq!(w.total_size(), naive_total(&sizes, gap, padding_start, padding_end));
        for i in 1..=count {
            assert!(w.offset_of(i - 1) <= w.offset_of(i));
        }
        let total = naive_total(&sizes, gap, padding_start, padding_end);
        for _ in 0..60 {
            let in_list = rng.range_u64(0, total + 20);
            assert_eq!(
                w.index_at_offset(scroll_margin as u64 + in_list),
                naive_index_at(&sizes, gap, padding_start, in_list)
            );
        }
    }
}

#[test]
fn property_ranges_stay_in_bounds() {
    for seed in [5u64, 17, 2024] {
        let mut rng = Lcg::new(seed);
        let count = rng.range_usize(1, 300);
        let mut w = VirtualWindow::new(
            WindowOptions::new(count, |i| (i % 7) as u32 * 5 + 1).with_gap(rng.range_u32(0, 3)),
        );
        for _ in 0..100 {
            let viewport = Viewport {
                scroll_offset: rng.range_u64(0, 20_000),
                container_size: rng.range_u32(1, 500),
            };
            let overscan = rng.range_usize(0, 6);
            let range = w.resolve(viewport, overscan);
            assert!(!range.is_empty());
            assert!(range.start_index <= range.end_index - 1);
            assert!(range.end_index <= count);
            assert_eq!(range, w.resolve(viewport, overscan));

            let visible = w.resolve(viewport, 0);
            assert!(range.start_index <= visible.start_index);
            assert!(range.end_index >= visible.end_index);

            if rng.range_u32(0, 4) == 0 {
                let index = rng.range_usize(0, count);
                w.measure(index, rng.range_u32(1, 80));
            }
        }
    }
}
