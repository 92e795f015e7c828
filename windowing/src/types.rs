/// Alignment policy used when resolving a scroll-to target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    /// Keep the current offset if the item is fully visible, otherwise align to the nearest edge.
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Scroll container geometry. `main` is the virtualized axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

/// Space before the first item and after the last one, along the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub start: u32,
    pub end: u32,
}

impl Insets {
    pub const ZERO: Self = Self { start: 0, end: 0 };

    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn sum(&self) -> u64 {
        self.start as u64 + self.end as u64
    }
}

/// A half-open range of item indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl ItemRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// Inclusive last index, `None` for an empty range.
    pub fn last(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.end_index - 1)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// A positioned item in the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowItem {
    pub index: usize,
    /// Start offset (includes `scroll_margin` and the leading padding).
    pub start: u64,
    /// Size in the scroll axis, without `gap`.
    pub size: u32,
}

impl WindowItem {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowItemKeyed<K> {
    pub key: K,
    pub index: usize,
    pub start: u64,
    pub size: u32,
}

impl<K> WindowItemKeyed<K> {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// Default item key: the item index.
pub type ItemKey = u64;

/// Input handed to a range extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive, visible only (no overscan)
    pub overscan: usize,
    pub count: usize,
}

/// What a scroll-to request points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrollTarget<K> {
    Index(usize),
    Key(K),
}

/// Whether the window can still move toward each end of its content.
///
/// A host uses this to decide whether unconsumed scroll input should bubble to a parent
/// scroller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollEdges {
    pub can_scroll_backward: bool,
    pub can_scroll_forward: bool,
}

/// A scroll position plus container size along the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub scroll_offset: u64,
    pub container_size: u32,
}
