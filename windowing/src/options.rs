use alloc::sync::Arc;

use crate::window::VirtualWindow;
use crate::{ExtractRange, Insets, ItemKey, Rect, WindowItem};

/// Size assumed for an index until it is measured.
pub type EstimateSize = Arc<dyn Fn(usize) -> u32 + Send + Sync>;

/// Stable identity of the item at an index.
pub type GetItemKey<K> = Arc<dyn Fn(usize) -> K + Send + Sync>;

/// Fired after a state update. The second argument is `is_scrolling`.
pub type OnChange<K> = Arc<dyn Fn(&VirtualWindow<K>, bool) + Send + Sync>;

/// Decides whether the scroll offset should follow a resized item.
///
/// Receives the item as laid out before the resize and the signed size delta.
pub type AdjustScrollOnResize<K> =
    Arc<dyn Fn(&VirtualWindow<K>, WindowItem, i64) -> bool + Send + Sync>;

/// Emits the final, ascending set of indexes to render for a visible range.
///
/// Indexes at or past `range.count` and indexes not above the previous one are dropped.
/// [`crate::IndexEmitter`] applies the same filter on the extractor side.
pub type RangeExtractor = Arc<dyn Fn(ExtractRange, &mut dyn FnMut(usize)) + Send + Sync>;

/// Scroll offset a window starts from, and returns to when it is re-enabled.
#[derive(Clone)]
pub enum InitialOffset {
    Value(u64),
    /// Asked again on every reset.
    Provider(Arc<dyn Fn() -> u64 + Send + Sync>),
}

impl InitialOffset {
    pub(crate) fn current(&self) -> u64 {
        match self {
            Self::Value(v) => *v,
            Self::Provider(f) => f(),
        }
    }
}

impl Default for InitialOffset {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl core::fmt::Debug for InitialOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "InitialOffset({v})"),
            Self::Provider(_) => f.write_str("InitialOffset(<provider>)"),
        }
    }
}

/// Configuration for [`VirtualWindow`].
///
/// Callbacks sit behind `Arc`s. Cloning the options and handing them back through
/// [`VirtualWindow::set_options`] keeps their identity, so only the fields that actually changed
/// trigger work.
pub struct WindowOptions<K = ItemKey> {
    pub count: usize,
    pub estimate_size: EstimateSize,
    /// Measurements are cached under this key and follow it across reorders.
    pub get_item_key: GetItemKey<K>,
    pub range_extractor: Option<RangeExtractor>,
    pub on_change: Option<OnChange<K>>,
    /// `None` keeps the offset of items above the viewport in place on resize.
    pub adjust_scroll_on_resize: Option<AdjustScrollOnResize<K>>,

    /// A disabled window reports no items and an empty content size.
    pub enabled: bool,
    /// Items rendered past each edge of the viewport.
    pub overscan: usize,

    /// Empty space around the items, inside the content size.
    pub padding: Insets,
    /// Distance kept between a scroll-to target and the viewport edge it is aligned to.
    pub scroll_padding: Insets,
    /// Offset of the list inside a larger scroll container.
    pub scroll_margin: u32,
    pub gap: u32,

    pub initial_rect: Option<Rect>,
    pub initial_offset: InitialOffset,
    pub is_scrolling_reset_delay_ms: u64,

    /// Evict cached measurements whose keys left the dataset.
    pub prune_measurements: bool,
}

impl<K> Clone for WindowOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            get_item_key: Arc::clone(&self.get_item_key),
            range_extractor: self.range_extractor.clone(),
            on_change: self.on_change.clone(),
            adjust_scroll_on_resize: self.adjust_scroll_on_resize.clone(),
            enabled: self.enabled,
            overscan: self.overscan,
            padding: self.padding,
            scroll_padding: self.scroll_padding,
            scroll_margin: self.scroll_margin,
            gap: self.gap,
            initial_rect: self.initial_rect,
            initial_offset: self.initial_offset.clone(),
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            prune_measurements: self.prune_measurements,
        }
    }
}

impl WindowOptions<ItemKey> {
    /// Options for a list keyed by index.
    pub fn new(count: usize, estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::new_with_key(count, estimate_size, |i| i as ItemKey)
    }
}

impl<K> WindowOptions<K> {
    /// Options with a custom key mapping, so measurements follow items across reorders.
    pub fn new_with_key(
        count: usize,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            get_item_key: Arc::new(get_item_key),
            range_extractor: None,
            on_change: None,
            adjust_scroll_on_resize: None,
            enabled: true,
            overscan: 1,
            padding: Insets::ZERO,
            scroll_padding: Insets::ZERO,
            scroll_margin: 0,
            gap: 0,
            initial_rect: None,
            initial_offset: InitialOffset::Value(0),
            is_scrolling_reset_delay_ms: 150,
            prune_measurements: true,
        }
    }

    pub fn with_get_item_key(
        mut self,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        self.get_item_key = Arc::new(get_item_key);
        self
    }

    pub fn with_range_extractor(
        mut self,
        range_extractor: Option<
            impl Fn(ExtractRange, &mut dyn FnMut(usize)) + Send + Sync + 'static,
        >,
    ) -> Self {
        self.range_extractor = range_extractor.map(|f| Arc::new(f) as RangeExtractor);
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&VirtualWindow<K>, bool) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as OnChange<K>);
        self
    }

    pub fn with_adjust_scroll_on_resize(
        mut self,
        f: Option<impl Fn(&VirtualWindow<K>, WindowItem, i64) -> bool + Send + Sync + 'static>,
    ) -> Self {
        self.adjust_scroll_on_resize = f.map(|f| Arc::new(f) as AdjustScrollOnResize<K>);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_padding(mut self, start: u32, end: u32) -> Self {
        self.padding = Insets::new(start, end);
        self
    }

    pub fn with_scroll_padding(mut self, start: u32, end: u32) -> Self {
        self.scroll_padding = Insets::new(start, end);
        self
    }

    pub fn with_scroll_margin(mut self, scroll_margin: u32) -> Self {
        self.scroll_margin = scroll_margin;
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_initial_rect(mut self, rect: Option<Rect>) -> Self {
        self.initial_rect = rect;
        self
    }

    pub fn with_initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = InitialOffset::Value(offset);
        self
    }

    pub fn with_initial_offset_provider(
        mut self,
        provider: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.initial_offset = InitialOffset::Provider(Arc::new(provider));
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_prune_measurements(mut self, prune: bool) -> Self {
        self.prune_measurements = prune;
        self
    }
}

impl<K> core::fmt::Debug for WindowOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("count", &self.count)
            .field("enabled", &self.enabled)
            .field("overscan", &self.overscan)
            .field("padding", &self.padding)
            .field("scroll_padding", &self.scroll_padding)
            .field("scroll_margin", &self.scroll_margin)
            .field("gap", &self.gap)
            .field("viewport", &self.initial_rect)
            .field("offset", &self.initial_offset)
            .field("debounce_ms", &self.is_scrolling_reset_delay_ms)
            .field("prune", &self.prune_measurements)
            .finish_non_exhaustive()
    }
}
