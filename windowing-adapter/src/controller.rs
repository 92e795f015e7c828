use alloc::vec::Vec;

use windowing::{
    Align, CacheKey, ItemKey, ScrollEdges, ScrollTarget, VirtualWindow, WindowOptions,
};

use crate::{
    Easing, FrameSlot, Momentum, MomentumOptions, NormalizerOptions, ScrollAnchor, ScrollBounds,
    ScrollDelta, ScrollInputNormalizer, ScrollOutcome, Tween, anchor,
};

#[derive(Clone, Copy, Debug, PartialEq)]
struct TouchTrack {
    x: f32,
    y: f32,
    /// Delta consumed by the last move, along the list axis.
    velocity: f32,
}

/// Drives a [`VirtualWindow`] from raw host input, one animation frame at a time.
///
/// The controller owns no UI objects. A host forwards wheel and touch events, reports item
/// measurements, and calls [`Self::tick_frame`] once per frame. Whenever a call returns an
/// offset, the host writes it to its real scroll container.
///
/// - Wheel and touch deltas go through a [`ScrollInputNormalizer`]; edge-locked deltas come back
///   as [`ScrollOutcome::PassThrough`] for a parent scroller.
/// - Releasing a touch with velocity starts [`Momentum`], advanced by frame ticks.
/// - Measurements are queued and applied on the next tick, with scroll compensation for items
///   above the viewport.
/// - Tweens animate programmatic scrolls.
#[derive(Clone, Debug)]
pub struct Controller<K = ItemKey> {
    window: VirtualWindow<K>,
    normalizer: ScrollInputNormalizer,
    momentum_options: MomentumOptions,
    momentum: Option<Momentum>,
    momentum_slot: FrameSlot,
    tween: Option<Tween>,
    touch: Option<TouchTrack>,
    measurements: Vec<(usize, u32)>,
    frame: u64,
}

impl<K: CacheKey> Controller<K> {
    pub fn new(options: WindowOptions<K>) -> Self {
        Self::from_window(VirtualWindow::new(options))
    }

    pub fn from_window(window: VirtualWindow<K>) -> Self {
        Self {
            window,
            normalizer: ScrollInputNormalizer::default(),
            momentum_options: MomentumOptions::default(),
            momentum: None,
            momentum_slot: FrameSlot::new(),
            tween: None,
            touch: None,
            measurements: Vec::new(),
            frame: 0,
        }
    }

    pub fn with_normalizer_options(mut self, options: NormalizerOptions) -> Self {
        self.normalizer.set_options(options);
        self
    }

    pub fn with_momentum_options(mut self, options: MomentumOptions) -> Self {
        self.momentum_options = options;
        self
    }

    pub fn window(&self) -> &VirtualWindow<K> {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut VirtualWindow<K> {
        &mut self.window
    }

    pub fn into_window(self) -> VirtualWindow<K> {
        self.window
    }

    pub fn normalizer(&self) -> &ScrollInputNormalizer {
        &self.normalizer
    }

    /// The frame number passed to the latest [`Self::tick_frame`].
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn bounds(&self) -> ScrollBounds {
        ScrollBounds {
            offset: self.window.scroll_offset(),
            max: self.window.max_scroll_offset(),
        }
    }

    pub fn scroll_edges(&self) -> ScrollEdges {
        self.window.scroll_edges()
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn has_momentum(&self) -> bool {
        self.momentum.is_some()
    }

    pub fn cancel_animation(&mut self) {
        self.tween = None;
    }

    pub fn stop_momentum(&mut self) {
        self.momentum = None;
        self.momentum_slot.cancel_pending();
    }

    fn interrupt(&mut self) {
        self.cancel_animation();
        self.stop_momentum();
    }

    pub fn on_viewport_size(&mut self, viewport_main: u32) {
        self.window.set_viewport_size(viewport_main);
    }

    /// The host moved its scroll container itself (scrollbar drag, keyboard).
    pub fn on_scroll(&mut self, scroll_offset: u64, now_ms: u64) {
        self.interrupt();
        self.window.apply_scroll_offset_event(scroll_offset, now_ms);
    }

    /// Feeds a wheel or trackpad delta. Stops any animation or momentum.
    pub fn on_wheel(&mut self, delta: ScrollDelta, now_ms: u64) -> ScrollOutcome {
        self.interrupt();
        self.apply_delta(delta, now_ms)
    }

    pub fn on_touch_start(&mut self, x: f32, y: f32) {
        self.interrupt();
        if !x.is_finite() || !y.is_finite() {
            awarn!(x, y, "on_touch_start: ignoring non-finite position");
            self.touch = None;
            return;
        }
        self.normalizer.reset();
        self.touch = Some(TouchTrack { x, y, velocity: 0.0 });
    }

    /// Feeds a finger position. Moving the finger up scrolls toward the end.
    pub fn on_touch_move(&mut self, x: f32, y: f32, now_ms: u64) -> ScrollOutcome {
        let Some(track) = self.touch else {
            return ScrollOutcome::Ignored;
        };
        if !x.is_finite() || !y.is_finite() {
            return ScrollOutcome::Ignored;
        }
        let delta = ScrollDelta::new(track.x - x, track.y - y);
        let before = self.window.scroll_offset();
        let outcome = self.apply_delta(delta, now_ms);
        let moved = self.window.scroll_offset() as f64 - before as f64;
        self.touch = Some(TouchTrack {
            x,
            y,
            velocity: moved as f32,
        });
        outcome
    }

    /// Ends the touch. A release with velocity starts momentum on the next frame.
    pub fn on_touch_end(&mut self) {
        let Some(track) = self.touch.take() else {
            return;
        };
        let momentum = Momentum::new(track.velocity, self.momentum_options);
        if !momentum.is_active() {
            return;
        }
        adebug!(velocity = track.velocity, "momentum started");
        self.momentum = Some(momentum);
        self.momentum_slot.schedule(self.frame.saturating_add(1));
    }

    fn apply_delta(&mut self, delta: ScrollDelta, now_ms: u64) -> ScrollOutcome {
        let outcome = self.normalizer.normalize(delta, self.bounds());
        if let Some(offset) = outcome.offset() {
            self.window.apply_scroll_offset_event(offset, now_ms);
        }
        outcome
    }

    /// Queues a measurement. It is applied on the next [`Self::tick_frame`].
    pub fn report_measurement(&mut self, index: usize, size: u32) {
        self.measurements.push((index, size));
    }

    pub fn queued_measurements(&self) -> usize {
        self.measurements.len()
    }

    /// Applies queued measurements now. Returns the scroll delta applied to keep content above
    /// the viewport from shifting the view.
    pub fn flush_measurements(&mut self) -> i64 {
        if self.measurements.is_empty() {
            return 0;
        }
        let batch = core::mem::take(&mut self.measurements);
        atrace!(count = batch.len(), "flush_measurements");
        self.window.resize_item_many(batch)
    }

    /// Advances one animation frame.
    ///
    /// Applies queued measurements, then the active tween or momentum, then `is_scrolling`
    /// debouncing. Returns the new scroll offset when this frame moved it.
    pub fn tick_frame(&mut self, frame: u64, now_ms: u64) -> Option<u64> {
        self.frame = frame;
        self.normalizer.on_frame();
        let before = self.window.scroll_offset();

        self.flush_measurements();

        if let Some(tween) = self.tween {
            self.window
                .apply_scroll_offset_event_clamped(tween.sample(now_ms), now_ms);
            if tween.is_done(now_ms) {
                self.tween = None;
                self.window.set_is_scrolling(false);
            }
        } else if self.momentum_slot.poll(frame).is_some() {
            self.step_momentum(now_ms);
        } else {
            self.window.update_scrolling(now_ms);
        }

        let after = self.window.scroll_offset();
        (after != before).then_some(after)
    }

    fn step_momentum(&mut self, now_ms: u64) {
        let Some(momentum) = &mut self.momentum else {
            return;
        };
        let Some(delta) = momentum.step() else {
            adebug!("momentum settled");
            self.momentum = None;
            return;
        };

        let axis = self.normalizer.axis();
        let outcome = self.apply_delta(ScrollDelta::along(axis, delta), now_ms);
        if outcome.hit_edge() {
            adebug!(residual = delta, "momentum stopped at edge");
            self.momentum = None;
            return;
        }
        self.momentum_slot.schedule(self.frame.saturating_add(1));
    }

    /// Scrolls to `target` immediately. See [`VirtualWindow::scroll_to`] for the two-phase
    /// correction applied while the target is unmeasured.
    pub fn scroll_to(
        &mut self,
        target: ScrollTarget<K>,
        align: Align,
        offset_px: u32,
    ) -> Option<u64> {
        self.interrupt();
        self.window.scroll_to(target, align, offset_px)
    }

    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> Option<u64> {
        self.scroll_to(ScrollTarget::Index(index), align, 0)
    }

    /// Starts a tween toward `target`. Returns the clamped destination.
    pub fn start_tween_to(
        &mut self,
        target: &ScrollTarget<K>,
        align: Align,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Option<u64> {
        let to = self.window.scroll_to_offset(target, align, 0)?;
        Some(self.start_tween_to_offset(to, now_ms, duration_ms, easing))
    }

    pub fn start_tween_to_offset(
        &mut self,
        offset: u64,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> u64 {
        self.stop_momentum();
        let to = self.window.clamp_scroll_offset(offset);
        let from = self.window.scroll_offset();
        self.tween = Some(match self.tween {
            Some(mut active) => {
                active.retarget(now_ms, to, duration_ms);
                active.easing = easing;
                active
            }
            None => Tween::new(from, to, now_ms, duration_ms, easing),
        });
        to
    }

    pub fn capture_first_visible_anchor(&self) -> Option<ScrollAnchor<K>> {
        anchor::capture_first_visible_anchor(&self.window)
    }

    pub fn capture_anchor_at(&self, below_top: u64) -> Option<ScrollAnchor<K>> {
        anchor::capture_anchor_at(&self.window, below_top)
    }

    /// Restores `anchor` after a dataset change. Stops any animation or momentum.
    pub fn apply_anchor(&mut self, anchor: &ScrollAnchor<K>) -> bool {
        self.interrupt();
        anchor::apply_anchor(&mut self.window, anchor)
    }
}
