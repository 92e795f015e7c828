use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::emitter::AscendingIndexes;
use crate::key::{CacheKey, KeyMap};
use crate::offsets::OffsetIndex;
use crate::px;
use crate::{
    Align, ExtractRange, FrameState, GetItemKey, InitialOffset, Insets, ItemKey, ItemRange, Rect,
    ScrollDirection, ScrollEdges, ScrollState, ScrollTarget, SizeCache, Viewport, ViewportState,
    WindowItem, WindowItemKeyed, WindowOptions,
};

/// A scroll-to whose target was still an estimate when it was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingScroll<K> {
    pub target: ScrollTarget<K>,
    pub align: Align,
    pub offset_px: u32,
}

/// Keys installed by [`VirtualWindow::set_dataset`].
///
/// Bound while `options.get_item_key` is still `get_item_key`; the window then caps `count` at
/// `keys.len()` and answers key lookups from `positions`.
#[derive(Clone)]
struct Dataset<K> {
    keys: Arc<[K]>,
    positions: KeyMap<K, usize>,
    get_item_key: GetItemKey<K>,
}

impl<K> core::fmt::Debug for Dataset<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dataset")
            .field("len", &self.keys.len())
            .finish_non_exhaustive()
    }
}

/// A headless virtual window over a list of items.
///
/// The window holds no UI objects. The host drives it with viewport geometry, scroll offsets and
/// item measurements, and reads back which items to render and where to scroll.
///
/// Every method is total: out-of-range indexes are ignored or clamped and nothing panics on host
/// input.
#[derive(Clone, Debug)]
pub struct VirtualWindow<K = ItemKey> {
    options: WindowOptions<K>,
    viewport_size: u32,
    scroll_offset: u64,
    scroll_rect: Rect,
    is_scrolling: bool,
    scroll_direction: Option<ScrollDirection>,
    last_scroll_event_ms: Option<u64>,

    offsets: OffsetIndex,
    cache: SizeCache<K>,
    dataset: Option<Dataset<K>>,
    pending_scroll: Option<PendingScroll<K>>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<K: CacheKey> VirtualWindow<K> {
    pub fn new(options: WindowOptions<K>) -> Self {
        let scroll_rect = options.initial_rect.unwrap_or_default();
        let scroll_offset = options.initial_offset.current();
        wdebug!(
            count = options.count,
            enabled = options.enabled,
            overscan = options.overscan,
            "VirtualWindow::new"
        );
        let mut offsets = OffsetIndex::default();
        offsets.set_gap(options.gap);
        let mut w = Self {
            viewport_size: scroll_rect.main,
            scroll_offset,
            scroll_rect,
            is_scrolling: false,
            scroll_direction: None,
            last_scroll_event_ms: None,
            offsets,
            cache: SizeCache::new(),
            dataset: None,
            pending_scroll: None,
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        w.rebuild_sizes();
        w
    }

    pub fn options(&self) -> &WindowOptions<K> {
        &self.options
    }

    /// Replaces the options, rebuilding only what changed.
    ///
    /// Closures are compared by `Arc` identity: a new `estimate_size` or `get_item_key` triggers a
    /// full rebuild, a `count` change grows or shrinks the size index in place.
    pub fn set_options(&mut self, options: WindowOptions<K>) {
        let prev_count = self.options.count;
        let was_enabled = self.options.enabled;
        let estimate_unchanged = Arc::ptr_eq(&self.options.estimate_size, &options.estimate_size);
        let keys_unchanged = Arc::ptr_eq(&self.options.get_item_key, &options.get_item_key);
        self.options = options;
        self.unbind_stale_dataset();
        self.options.count = self.capped_count(self.options.count);
        wtrace!(
            count = self.options.count,
            enabled = self.options.enabled,
            overscan = self.options.overscan,
            "VirtualWindow::set_options"
        );

        self.offsets.set_gap(self.options.gap);
        if !estimate_unchanged || !keys_unchanged {
            self.on_dataset_changed();
        } else if self.options.count != prev_count {
            self.sync_len();
        }

        if !self.options.enabled {
            self.reset_disabled();
        } else if !was_enabled {
            self.reset_to_initial();
        }

        self.notify();
    }

    /// Clones the options, applies `f`, then calls [`Self::set_options`].
    pub fn update_options(&mut self, f: impl FnOnce(&mut WindowOptions<K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&VirtualWindow<K>, bool) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    pub fn set_initial_offset(&mut self, initial_offset: u64) {
        self.options.initial_offset = InitialOffset::Value(initial_offset);
        self.notify();
    }

    pub fn set_is_scrolling_reset_delay_ms(&mut self, delay_ms: u64) {
        self.options.is_scrolling_reset_delay_ms = delay_ms;
        self.notify();
    }

    fn reset_to_initial(&mut self) {
        self.scroll_offset = self.options.initial_offset.current();
        self.scroll_rect = self.options.initial_rect.unwrap_or_default();
        self.viewport_size = self.scroll_rect.main;
        self.is_scrolling = false;
        self.scroll_direction = None;
        self.last_scroll_event_ms = None;
        self.pending_scroll = None;
    }

    fn reset_disabled(&mut self) {
        self.reset_to_initial();
        self.scroll_rect = Rect::default();
        self.viewport_size = 0;
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.is_scrolling);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Runs `f` and coalesces every `on_change` it would trigger into a single call.
    ///
    /// Nestable; only the outermost batch notifies.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.options.enabled == enabled {
            return;
        }
        self.options.enabled = enabled;
        if enabled {
            self.reset_to_initial();
        } else {
            self.reset_disabled();
        }
        self.notify();
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        if self.is_scrolling == is_scrolling {
            return;
        }
        self.is_scrolling = is_scrolling;
        if !is_scrolling {
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
        }
        self.notify();
    }

    /// Marks a user scroll at `now_ms`. Cancels any pending two-phase scroll-to.
    pub fn notify_scroll_event(&mut self, now_ms: u64) {
        if !self.options.enabled {
            return;
        }
        self.pending_scroll = None;
        self.last_scroll_event_ms = Some(now_ms);
        self.set_is_scrolling(true);
    }

    /// Resets `is_scrolling` once no scroll event arrived for `is_scrolling_reset_delay_ms`.
    pub fn update_scrolling(&mut self, now_ms: u64) {
        if !self.options.enabled || !self.is_scrolling {
            return;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
            self.set_is_scrolling(false);
        }
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll_rect
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            scroll_offset: self.scroll_offset,
            container_size: self.viewport_size,
        }
    }

    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            rect: self.scroll_rect,
        }
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            offset: self.scroll_offset,
            is_scrolling: self.is_scrolling,
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.viewport_state(),
            scroll: self.scroll_state(),
        }
    }

    pub fn restore_viewport_state(&mut self, viewport: ViewportState) {
        self.set_scroll_rect(viewport.rect);
    }

    /// Restores a scroll snapshot. A snapshot taken mid-scroll counts as a scroll event at
    /// `now_ms`.
    pub fn restore_scroll_state(&mut self, scroll: ScrollState, now_ms: u64) {
        if scroll.is_scrolling {
            self.apply_scroll_offset_event_clamped(scroll.offset, now_ms);
            return;
        }
        self.batch_update(|w| {
            w.set_scroll_offset_clamped(scroll.offset);
            w.set_is_scrolling(false);
        });
    }

    pub fn restore_frame_state(&mut self, frame: FrameState, now_ms: u64) {
        if frame.scroll.is_scrolling {
            self.apply_scroll_frame_clamped(frame.viewport.rect, frame.scroll.offset, now_ms);
            return;
        }
        self.batch_update(|w| {
            w.set_scroll_rect(frame.viewport.rect);
            w.set_scroll_offset_clamped(frame.scroll.offset);
            w.set_is_scrolling(false);
        });
    }

    pub fn set_scroll_rect(&mut self, rect: Rect) {
        if self.scroll_rect == rect {
            return;
        }
        self.scroll_rect = rect;
        self.viewport_size = rect.main;
        self.notify();
    }

    pub fn apply_scroll_rect_event(&mut self, rect: Rect) {
        self.batch_update(|w| w.set_scroll_rect(rect));
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// The scroll offset relative to the list start (without `scroll_margin`).
    pub fn scroll_offset_in_list(&self) -> u64 {
        self.scroll_offset
            .saturating_sub(self.options.scroll_margin as u64)
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        if self.viewport_size == size && self.scroll_rect.main == size {
            return;
        }
        self.viewport_size = size;
        self.scroll_rect.main = size;
        self.notify();
    }

    /// Sets the container size from a host float. Negative or NaN sizes become `0`.
    pub fn set_viewport_px(&mut self, size: f32) {
        self.set_viewport_size(px::extent_from_f32(size));
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    /// Sets the scroll offset from a host float, clamped to the scrollable range.
    pub fn set_scroll_offset_px(&mut self, offset: f64) {
        self.set_scroll_offset_clamped(px::offset_from_f64(offset));
    }

    /// Applies a user scroll (wheel, drag, touch) and marks the window as scrolling.
    pub fn apply_scroll_offset_event(&mut self, offset: u64, now_ms: u64) {
        wtrace!(offset, now_ms, "apply_scroll_offset_event");
        self.batch_update(|w| {
            w.set_scroll_offset(offset);
            w.notify_scroll_event(now_ms);
        });
    }

    pub fn apply_scroll_offset_event_clamped(&mut self, offset: u64, now_ms: u64) {
        wtrace!(offset, now_ms, "apply_scroll_offset_event_clamped");
        self.batch_update(|w| {
            w.set_scroll_offset_clamped(offset);
            w.notify_scroll_event(now_ms);
        });
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|w| {
            w.set_viewport_size(viewport_size);
            w.set_scroll_offset(scroll_offset);
        });
    }

    pub fn set_viewport_and_scroll_clamped(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|w| {
            w.set_viewport_size(viewport_size);
            w.set_scroll_offset_clamped(scroll_offset);
        });
    }

    /// Applies rect and offset from one host scroll event as a single update.
    pub fn apply_scroll_frame(&mut self, rect: Rect, scroll_offset: u64, now_ms: u64) {
        wtrace!(
            rect_main = rect.main,
            rect_cross = rect.cross,
            scroll_offset,
            now_ms,
            "apply_scroll_frame"
        );
        self.batch_update(|w| {
            w.set_scroll_rect(rect);
            w.set_scroll_offset(scroll_offset);
            w.notify_scroll_event(now_ms);
        });
    }

    pub fn apply_scroll_frame_clamped(&mut self, rect: Rect, scroll_offset: u64, now_ms: u64) {
        wtrace!(
            rect_main = rect.main,
            rect_cross = rect.cross,
            scroll_offset,
            now_ms,
            "apply_scroll_frame_clamped"
        );
        self.batch_update(|w| {
            w.set_scroll_rect(rect);
            w.set_scroll_offset_clamped(scroll_offset);
            w.notify_scroll_event(now_ms);
        });
    }

    /// Grows or shrinks the dataset. Existing sizes are kept; new items start as estimates (or
    /// cached measurements for their keys).
    ///
    /// While a [`Self::set_dataset`] list is bound, `count` is capped at its length.
    pub fn set_count(&mut self, count: usize) {
        let count = self.capped_count(count);
        if self.options.count == count {
            return;
        }
        self.options.count = count;
        self.sync_len();
        self.notify();
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
        self.notify();
    }

    pub fn set_padding(&mut self, padding_start: u32, padding_end: u32) {
        self.options.padding = Insets::new(padding_start, padding_end);
        self.notify();
    }

    pub fn set_scroll_padding(&mut self, start: u32, end: u32) {
        self.options.scroll_padding = Insets::new(start, end);
        self.notify();
    }

    pub fn set_scroll_margin(&mut self, scroll_margin: u32) {
        self.options.scroll_margin = scroll_margin;
        self.notify();
    }

    pub fn set_gap(&mut self, gap: u32) {
        if self.options.gap == gap {
            return;
        }
        self.options.gap = gap;
        self.offsets.set_gap(gap);
        self.notify();
    }

    pub fn set_get_item_key(&mut self, f: impl Fn(usize) -> K + Send + Sync + 'static) {
        self.options.get_item_key = Arc::new(f);
        self.dataset = None;
        self.on_dataset_changed();
        self.notify();
    }

    /// Replaces the dataset with an ordered list of keys.
    ///
    /// Measurements follow their keys to the new positions; keys that disappeared are evicted
    /// when `prune_measurements` is set.
    pub fn set_dataset(&mut self, keys: impl Into<Arc<[K]>>)
    where
        K: Clone + Send + Sync + 'static,
    {
        let keys: Arc<[K]> = keys.into();
        let mut positions = KeyMap::new();
        for (i, key) in keys.iter().enumerate() {
            positions.entry(key.clone()).or_insert(i);
        }
        let get_item_key: GetItemKey<K> = {
            let keys = Arc::clone(&keys);
            Arc::new(move |i: usize| keys[i].clone())
        };
        self.options.count = keys.len();
        self.options.get_item_key = Arc::clone(&get_item_key);
        self.dataset = Some(Dataset {
            keys,
            positions,
            get_item_key,
        });
        self.on_dataset_changed();
        self.notify();
    }

    /// Re-reads every key after the host reordered or replaced items behind the same
    /// `get_item_key` closure.
    pub fn sync_item_keys(&mut self) {
        self.on_dataset_changed();
        self.notify();
    }

    pub fn set_range_extractor(
        &mut self,
        f: Option<impl Fn(ExtractRange, &mut dyn FnMut(usize)) + Send + Sync + 'static>,
    ) {
        self.options.range_extractor = f.map(|f| Arc::new(f) as _);
        self.notify();
    }

    pub fn set_estimate_size(&mut self, f: impl Fn(usize) -> u32 + Send + Sync + 'static) {
        self.options.estimate_size = Arc::new(f);
        self.rebuild_sizes();
        self.notify();
    }

    pub fn set_adjust_scroll_on_resize(
        &mut self,
        f: Option<impl Fn(&VirtualWindow<K>, WindowItem, i64) -> bool + Send + Sync + 'static>,
    ) {
        self.options.adjust_scroll_on_resize = f.map(|f| Arc::new(f) as _);
        self.notify();
    }

    pub fn set_prune_measurements(&mut self, prune: bool) {
        self.options.prune_measurements = prune;
    }

    /// Drops every cached measurement and falls back to estimates.
    pub fn reset_measurements(&mut self) {
        self.cache.clear();
        self.rebuild_sizes();
        self.notify();
    }

    pub fn size_cache(&self) -> &SizeCache<K> {
        &self.cache
    }

    pub fn measurement_cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn for_each_cached_size(&self, mut f: impl FnMut(&K, u32)) {
        for (k, size) in self.cache.measured() {
            f(k, size);
        }
    }

    pub fn export_measurement_cache(&self) -> Vec<(K, u32)>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.cache.len());
        self.for_each_cached_size(|k, size| out.push((k.clone(), size)));
        out
    }

    /// Replaces the cache with `entries` and re-applies it to the current dataset.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.cache.clear();
        for (k, size) in entries {
            self.cache.set(k, size);
        }
        wdebug!(entries = self.cache.len(), "import_measurement_cache");
        self.rebuild_sizes();
        self.notify();
    }

    /// Records a measured size for `index` without touching the scroll offset.
    pub fn measure(&mut self, index: usize, size: u32) {
        if index >= self.options.count {
            return;
        }
        let key = self.key_for(index);
        self.measure_keyed(index, key, size);
    }

    pub fn measure_keyed(&mut self, index: usize, key: K, size: u32) {
        if index >= self.options.count {
            return;
        }
        wtrace!(index, size, "measure_keyed");
        if self.store_size(index, key, size).is_none() {
            return;
        }
        self.batch_update(|w| {
            w.reconcile_pending_scroll();
            w.notify();
        });
    }

    /// Like [`Self::measure`], taking a host float. NaN measurements are ignored.
    pub fn measure_px(&mut self, index: usize, size: f32) {
        match px::size_from_f32(size) {
            Some(size) => self.measure(index, size),
            None => {
                wwarn!(index, "measure_px: ignoring NaN size");
            }
        }
    }

    pub fn measure_many(&mut self, measurements: impl IntoIterator<Item = (usize, u32)>) {
        let mut changed = false;
        for (index, size) in measurements {
            if index >= self.options.count {
                continue;
            }
            let key = self.key_for(index);
            changed |= self.store_size(index, key, size).is_some();
        }
        if changed {
            self.batch_update(|w| {
                w.reconcile_pending_scroll();
                w.notify();
            });
        }
    }

    /// Records a measured size and shifts the scroll offset by the size delta when the item
    /// sits before the viewport, so visible content does not jump.
    ///
    /// Returns the delta applied to the scroll offset.
    pub fn resize_item(&mut self, index: usize, size: u32) -> i64 {
        if index >= self.options.count {
            return 0;
        }
        let key = self.key_for(index);
        self.resize_item_keyed(index, key, size)
    }

    pub fn resize_item_keyed(&mut self, index: usize, key: K, size: u32) -> i64 {
        if index >= self.options.count {
            return 0;
        }
        let item = self.item(index);
        let Some(delta) = self.store_size(index, key, size) else {
            return 0;
        };

        let should_adjust = delta != 0
            && match &self.options.adjust_scroll_on_resize {
                Some(f) => f(self, item, delta),
                None => item.start < self.scroll_offset,
            };

        let mut applied = 0;
        self.batch_update(|w| {
            if should_adjust {
                w.scroll_offset = if delta > 0 {
                    w.scroll_offset.saturating_add(delta as u64)
                } else {
                    w.scroll_offset.saturating_sub(delta.unsigned_abs())
                };
                applied = delta;
            }
            w.reconcile_pending_scroll();
            w.notify();
        });
        applied
    }

    pub fn resize_item_many(
        &mut self,
        measurements: impl IntoIterator<Item = (usize, u32)>,
    ) -> i64 {
        let mut applied = 0i64;
        self.batch_update(|w| {
            for (index, size) in measurements {
                applied += w.resize_item(index, size);
            }
        });
        applied
    }

    /// Forgets the measurement at `index`; the item falls back to its estimate.
    pub fn evict_index(&mut self, index: usize) {
        if index >= self.options.count {
            return;
        }
        let key = self.key_for(index);
        self.cache.remove(&key);
        let estimate = (self.options.estimate_size)(index);
        self.offsets.set(index, estimate, false);
        self.notify();
    }

    /// Forgets the measurement for `key`. Returns `false` if nothing was cached.
    pub fn evict_key(&mut self, key: &K) -> bool {
        if self.cache.remove(key).is_none() {
            return false;
        }
        if let Some(index) = self.index_of_key(key) {
            let estimate = (self.options.estimate_size)(index);
            self.offsets.set(index, estimate, false);
        }
        self.notify();
        true
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.offsets.is_measured(index)
    }

    pub fn total_size(&self) -> u64 {
        if !self.options.enabled {
            return 0;
        }
        self.options.padding.sum().saturating_add(self.offsets.total())
    }

    /// Calls `get_item_key`. `index` must be below [`Self::count`].
    pub fn key_for(&self, index: usize) -> K {
        (self.options.get_item_key)(index)
    }

    /// Position of `key` in the current dataset.
    ///
    /// A map lookup for lists installed with [`Self::set_dataset`], a linear scan over
    /// `get_item_key` otherwise.
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        if let Some(dataset) = self.bound_dataset() {
            let count = self.options.count;
            return dataset.positions.get(key).copied().filter(|&i| i < count);
        }
        (0..self.options.count).find(|&i| self.key_for(i) == *key)
    }

    /// Start of `index` in the scroll container, i.e. the cumulative size of everything before
    /// it. Indexes past the end return the offset just after the last item.
    pub fn offset_of(&self, index: usize) -> u64 {
        if !self.options.enabled {
            return 0;
        }
        self.start_of(index.min(self.options.count))
    }

    /// Item covering `offset`, clamped to the last item. `None` for an empty or disabled window.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        if !self.options.enabled {
            return None;
        }
        self.index_at_offset_inner(offset)
    }

    /// Total variant of [`Self::index_at_offset`]: `0` for an empty list.
    pub fn index_at_offset_or_zero(&self, offset: u64) -> usize {
        self.index_at_offset(offset).unwrap_or(0)
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        if !self.options.enabled || index >= self.options.count {
            return None;
        }
        Some(self.start_of(index))
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        if !self.options.enabled {
            return None;
        }
        self.offsets.size(index)
    }

    pub fn item_end(&self, index: usize) -> Option<u64> {
        let start = self.item_start(index)?;
        let size = self.item_size(index)?;
        Some(start.saturating_add(size as u64))
    }

    pub fn window_item(&self, index: usize) -> Option<WindowItem> {
        (self.options.enabled && index < self.options.count).then(|| self.item(index))
    }

    pub fn item_at_offset(&self, offset: u64) -> Option<WindowItem> {
        let index = self.index_at_offset(offset)?;
        Some(self.item(index))
    }

    pub fn item_keyed_at_offset(&self, offset: u64) -> Option<WindowItemKeyed<K>> {
        let item = self.item_at_offset(offset)?;
        Some(WindowItemKeyed {
            key: self.key_for(item.index),
            index: item.index,
            start: item.start,
            size: item.size,
        })
    }

    /// Resolves the range to render for `viewport`, extended by `overscan` items on each side.
    pub fn resolve(&self, viewport: Viewport, overscan: usize) -> ItemRange {
        if !self.options.enabled {
            return ItemRange::EMPTY;
        }
        let visible = self.compute_visible_range(viewport.scroll_offset, viewport.container_size);
        self.extend_by(visible, overscan)
    }

    /// Visible range plus the configured overscan.
    pub fn virtual_range(&self) -> ItemRange {
        self.resolve(self.viewport(), self.options.overscan)
    }

    pub fn virtual_range_for(&self, scroll_offset: u64, viewport_size: u32) -> ItemRange {
        let viewport = Viewport {
            scroll_offset,
            container_size: viewport_size,
        };
        self.resolve(viewport, self.options.overscan)
    }

    /// Items intersecting the viewport, without overscan.
    pub fn visible_range(&self) -> ItemRange {
        self.resolve(self.viewport(), 0)
    }

    pub fn visible_range_for(&self, scroll_offset: u64, viewport_size: u32) -> ItemRange {
        let viewport = Viewport {
            scroll_offset,
            container_size: viewport_size,
        };
        self.resolve(viewport, 0)
    }

    pub fn for_each_virtual_index(&self, f: impl FnMut(usize)) {
        self.for_each_virtual_index_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_index_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(usize),
    ) {
        let visible = self.visible_range_for(scroll_offset, viewport_size);
        if visible.is_empty() {
            return;
        }

        let Some(extract) = &self.options.range_extractor else {
            let range = self.extend_by(visible, self.options.overscan);
            (range.start_index..range.end_index).for_each(f);
            return;
        };

        let count = self.options.count;
        let range = ExtractRange {
            start_index: visible.start_index,
            end_index: visible.end_index,
            overscan: self.options.overscan,
            count,
        };
        let mut filter = AscendingIndexes::new(count);
        extract(range, &mut |i| {
            if filter.admit(i) {
                f(i);
            }
        });
    }

    pub fn for_each_virtual_item(&self, f: impl FnMut(WindowItem)) {
        self.for_each_virtual_item_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_item_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(WindowItem),
    ) {
        if self.options.range_extractor.is_some() {
            self.for_each_virtual_index_for(scroll_offset, viewport_size, |i| f(self.item(i)));
            return;
        }

        let range = self.virtual_range_for(scroll_offset, viewport_size);
        let base = self.list_origin();
        self.offsets
            .walk(range.start_index, range.end_index, |index, start, size| {
                f(WindowItem {
                    index,
                    start: base.saturating_add(start),
                    size,
                })
            });
    }

    pub fn for_each_virtual_item_keyed(&self, f: impl FnMut(WindowItemKeyed<K>)) {
        self.for_each_virtual_item_keyed_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_item_keyed_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(WindowItemKeyed<K>),
    ) {
        self.for_each_virtual_item_for(scroll_offset, viewport_size, |item| {
            f(WindowItemKeyed {
                key: self.key_for(item.index),
                index: item.index,
                start: item.start,
                size: item.size,
            })
        });
    }

    /// Collects the indexes to render into `out` (cleared first).
    pub fn collect_virtual_indexes(&self, out: &mut Vec<usize>) {
        out.clear();
        self.for_each_virtual_index(|i| out.push(i));
    }

    pub fn collect_virtual_items(&self, out: &mut Vec<WindowItem>) {
        out.clear();
        self.for_each_virtual_item(|it| out.push(it));
    }

    pub fn collect_virtual_items_keyed(&self, out: &mut Vec<WindowItemKeyed<K>>) {
        out.clear();
        self.for_each_virtual_item_keyed(|it| out.push(it));
    }

    /// Offset that brings `index` into view under `align`, honoring `scroll_padding_*`.
    ///
    /// Indexes past the end clamp to the last item. The result is clamped to
    /// `0..=max_scroll_offset()`.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if !self.options.enabled {
            return self.options.initial_offset.current();
        }
        if self.options.count == 0 {
            return 0;
        }
        self.aligned_offset(index.min(self.options.count - 1), align, 0)
    }

    /// Applies [`Self::scroll_to_index_offset`] without marking the window as scrolling.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    /// Offset that brings `target` into view, `offset_px` further from the aligned edge.
    ///
    /// - `Start`: `offset_of(t) - offset_px`
    /// - `End`: `offset_of(t) + size(t) - container + offset_px`
    /// - `Center`: item center on the container center
    /// - `Auto`: the current offset if `t` is fully visible, else `Start` or `End`
    ///
    /// Returns `None` when the target cannot be resolved (empty or disabled window, unknown key).
    pub fn scroll_to_offset(
        &self,
        target: &ScrollTarget<K>,
        align: Align,
        offset_px: u32,
    ) -> Option<u64> {
        let index = self.resolve_target(target)?;
        Some(self.aligned_offset(index, align, offset_px))
    }

    /// Scrolls to `target` and returns the applied offset.
    ///
    /// While the target or a rendered item before it is still an estimate, the request stays
    /// pending and is re-resolved after every measurement. It settles once those items are all
    /// measured, and is dropped on a user scroll.
    pub fn scroll_to(
        &mut self,
        target: ScrollTarget<K>,
        align: Align,
        offset_px: u32,
    ) -> Option<u64> {
        let index = self.resolve_target(&target)?;
        let offset = self.aligned_offset(index, align, offset_px);
        self.batch_update(|w| {
            w.set_scroll_offset(offset);
            w.pending_scroll = (!w.is_settled(index)).then_some(PendingScroll {
                target,
                align,
                offset_px,
            });
            wtrace!(index, offset, pending = w.pending_scroll.is_some(), "scroll_to");
        });
        Some(offset)
    }

    pub fn pending_scroll(&self) -> Option<&PendingScroll<K>> {
        self.pending_scroll.as_ref()
    }

    pub fn cancel_pending_scroll(&mut self) {
        self.pending_scroll = None;
    }

    pub fn max_scroll_offset(&self) -> u64 {
        if !self.options.enabled {
            return self.options.initial_offset.current();
        }
        let margin = self.options.scroll_margin as u64;
        let view = self.viewport_size as u64;
        margin.saturating_add(self.total_size().saturating_sub(view))
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Whether the current offset can still move toward the start and the end.
    pub fn scroll_edges(&self) -> ScrollEdges {
        if !self.options.enabled {
            return ScrollEdges::default();
        }
        ScrollEdges {
            can_scroll_backward: self.scroll_offset > 0,
            can_scroll_forward: self.scroll_offset < self.max_scroll_offset(),
        }
    }

    fn resolve_target(&self, target: &ScrollTarget<K>) -> Option<usize> {
        if !self.options.enabled || self.options.count == 0 {
            return None;
        }
        match target {
            ScrollTarget::Index(index) => Some((*index).min(self.options.count - 1)),
            ScrollTarget::Key(key) => self.index_of_key(key),
        }
    }

    fn aligned_offset(&self, index: usize, align: Align, offset_px: u32) -> u64 {
        let item = self.item(index);
        let pad_start = self.options.scroll_padding.start as u64 + offset_px as u64;
        let pad_end = self.options.scroll_padding.end as u64 + offset_px as u64;
        let view = self.viewport_size as u64;

        let to_start = item.start.saturating_sub(pad_start);
        let to_end = item.end().saturating_add(pad_end).saturating_sub(view);
        let target = match align {
            Align::Start => to_start,
            Align::End => to_end,
            Align::Center => item
                .start
                .saturating_add(item.size as u64 / 2)
                .saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll_offset;
                if item.start >= cur && item.end() <= cur.saturating_add(view) {
                    cur
                } else if item.start < cur {
                    to_start
                } else {
                    to_end
                }
            }
        };
        self.clamp_scroll_offset(target)
    }

    fn reconcile_pending_scroll(&mut self) {
        let Some(pending) = self.pending_scroll.take() else {
            return;
        };
        let Some(index) = self.resolve_target(&pending.target) else {
            wdebug!("pending scroll target left the dataset");
            return;
        };
        let offset = self.aligned_offset(index, pending.align, pending.offset_px);
        wtrace!(index, offset, "reconcile_pending_scroll");
        self.set_scroll_offset(offset);
        if !self.is_settled(index) {
            self.pending_scroll = Some(pending);
        }
    }

    /// Whether `index` and every rendered item before it carry real measurements, so its
    /// aligned offset can no longer move.
    fn is_settled(&self, index: usize) -> bool {
        let range = self.virtual_range();
        let first = if range.is_empty() {
            index
        } else {
            range.start_index.min(index)
        };
        (first..=index).all(|i| self.offsets.is_measured(i))
    }

    fn bound_dataset(&self) -> Option<&Dataset<K>> {
        self.dataset
            .as_ref()
            .filter(|d| Arc::ptr_eq(&d.get_item_key, &self.options.get_item_key))
    }

    fn unbind_stale_dataset(&mut self) {
        if self.dataset.is_some() && self.bound_dataset().is_none() {
            self.dataset = None;
        }
    }

    /// `count`, capped at the bound dataset's length.
    fn capped_count(&self, count: usize) -> usize {
        let Some(dataset) = self.bound_dataset() else {
            return count;
        };
        let len = dataset.keys.len();
        if count > len {
            wwarn!(count, len, "count exceeds the dataset; capping");
            return len;
        }
        count
    }

    /// Writes a measurement into the cache and the offset index.
    ///
    /// Returns `None` when nothing changed, otherwise the size delta.
    fn store_size(&mut self, index: usize, key: K, size: u32) -> Option<i64> {
        let was_measured = self.offsets.is_measured(index);
        let cache_changed = self.cache.set(key, size);
        let delta = self.offsets.set(index, size, true);
        (cache_changed || delta != 0 || !was_measured).then_some(delta)
    }

    fn on_dataset_changed(&mut self) {
        self.prune_cache();
        self.rebuild_sizes();
        if self
            .pending_scroll
            .as_ref()
            .is_some_and(|p| self.resolve_target(&p.target).is_none())
        {
            self.pending_scroll = None;
        }
    }

    fn prune_cache(&mut self) {
        if !self.options.prune_measurements || self.cache.is_empty() {
            return;
        }
        let mut live = KeyMap::<K, ()>::new();
        for i in 0..self.options.count {
            live.insert(self.key_for(i), ());
        }
        let _evicted = self.cache.retain(|k| live.contains_key(k));
        wdebug!(
            evicted = _evicted,
            remaining = self.cache.len(),
            "prune_cache"
        );
    }

    fn size_for(&self, index: usize) -> (u32, bool) {
        let key = self.key_for(index);
        match self.cache.entry(&key) {
            Some(entry) if entry.measured => (entry.size, true),
            _ => ((self.options.estimate_size)(index), false),
        }
    }

    fn rebuild_sizes(&mut self) {
        wdebug!(
            count = self.options.count,
            cached = self.cache.len(),
            "rebuild_sizes"
        );
        let opts = &self.options;
        let cache = &self.cache;
        self.offsets.rebuild((0..opts.count).map(|i| {
            let key = (opts.get_item_key)(i);
            match cache.entry(&key) {
                Some(entry) if entry.measured => (entry.size, true),
                _ => ((opts.estimate_size)(i), false),
            }
        }));
    }

    fn sync_len(&mut self) {
        let count = self.options.count;
        let len = self.offsets.len();
        if count < len {
            self.offsets.truncate(count);
            self.prune_cache();
        } else {
            for i in len..count {
                let (size, measured) = self.size_for(i);
                self.offsets.push(size, measured);
            }
        }
    }

    fn list_origin(&self) -> u64 {
        (self.options.scroll_margin as u64).saturating_add(self.options.padding.start as u64)
    }

    fn start_of(&self, index: usize) -> u64 {
        self.list_origin()
            .saturating_add(self.offsets.offset_of(index))
    }

    fn item(&self, index: usize) -> WindowItem {
        WindowItem {
            index,
            start: self.start_of(index),
            size: self.offsets.size(index).unwrap_or(0),
        }
    }

    fn extend_by(&self, range: ItemRange, overscan: usize) -> ItemRange {
        if range.is_empty() {
            return range;
        }
        ItemRange {
            start_index: range.start_index.saturating_sub(overscan),
            end_index: cmp::min(
                self.options.count,
                range.end_index.saturating_add(overscan),
            ),
        }
    }

    fn compute_visible_range(&self, scroll_offset: u64, viewport_size: u32) -> ItemRange {
        let count = self.options.count;
        if count == 0 || viewport_size == 0 {
            return ItemRange::EMPTY;
        }

        let margin = self.options.scroll_margin as u64;
        let view = viewport_size as u64;
        let total = self.total_size();

        let max_scroll = margin.saturating_add(total.saturating_sub(view));
        let scroll_offset = scroll_offset.min(max_scroll);
        let scroll_end = scroll_offset.saturating_add(view);
        if scroll_end <= margin {
            return ItemRange::EMPTY;
        }

        let first = scroll_offset.saturating_sub(margin);
        if first >= total {
            return ItemRange::EMPTY;
        }
        let last = scroll_end.saturating_sub(margin).saturating_sub(1).max(first);

        let start = self.index_at_list_offset(first).unwrap_or(count);
        let end = self
            .index_at_list_offset(last)
            .map_or(count, |i| i + 1)
            .min(count);
        ItemRange {
            start_index: start.min(end),
            end_index: end,
        }
    }

    fn index_at_offset_inner(&self, offset: u64) -> Option<usize> {
        let margin = self.options.scroll_margin as u64;
        self.index_at_list_offset(offset.saturating_sub(margin))
    }

    fn index_at_list_offset(&self, offset: u64) -> Option<usize> {
        let padding = self.options.padding.start as u64;
        self.offsets.index_at(offset.saturating_sub(padding))
    }
}
