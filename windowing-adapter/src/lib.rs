//! Input and frame plumbing for the `windowing` crate.
//!
//! `windowing` answers layout questions for a virtual list; this crate turns host events into
//! the calls that drive it:
//!
//! - [`ScrollInputNormalizer`]: wheel/touch deltas to candidate offsets, with edge pass-through
//!   for nested scrollers and axis locking for diagonal gestures
//! - [`Momentum`]: exponential decay for flick gestures
//! - [`FrameSlot`]: a single cancellable per-frame task
//! - [`ScrollAnchor`]: keep the viewport on an item while rows are prepended
//! - [`Tween`]: eased programmatic scrolling
//! - [`Controller`]: all of the above wired onto a [`windowing::VirtualWindow`]
//!
//! Nothing here binds to a UI framework.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod frame;
mod input;
mod momentum;
mod tween;


pub use anchor::{
    ScrollAnchor, apply_anchor, apply_anchor_with, capture_anchor_at, capture_first_visible_anchor,
};
pub use controller::Controller;
pub use frame::{FrameHandle, FrameSlot};
pub use input::{
    Axis, NormalizerOptions, ScrollBounds, ScrollDelta, ScrollInputNormalizer, ScrollOutcome,
};
pub use momentum::{Momentum, MomentumOptions};
pub use tween::{Easing, Tween};
