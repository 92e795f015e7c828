//! A headless virtual windowing engine.
//!
//! Given item size estimates, measurements reported by a host, a container size and a scroll
//! offset, this crate answers the questions a virtualized list needs every frame:
//!
//! - which items intersect the viewport (plus overscan),
//! - where each of them starts,
//! - which offset brings a given item into view,
//! - whether the list can still scroll toward either end.
//!
//! Sizes are kept in a Fenwick tree, so measuring an item and mapping an offset back to an index
//! are both `O(log n)`. Measurements are cached by item key and follow items across reorders.
//!
//! Input normalization (wheel/touch deltas, momentum) and frame-driven controllers live in the
//! `windowing-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod emitter;
mod key;
mod offsets;
mod options;
pub mod px;
mod size_cache;
mod state;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use emitter::IndexEmitter;
pub use key::CacheKey;
pub use options::{
    AdjustScrollOnResize, EstimateSize, GetItemKey, InitialOffset, OnChange, RangeExtractor,
    WindowOptions,
};
pub use size_cache::{SizeCache, SizeEntry};
pub use state::{FrameState, ScrollState, ViewportState};
pub use types::{
    Align, ExtractRange, Insets, ItemKey, ItemRange, Rect, ScrollDirection, ScrollEdges,
    ScrollTarget, Viewport, WindowItem, WindowItemKeyed,
};
pub use window::{PendingScroll, VirtualWindow};
