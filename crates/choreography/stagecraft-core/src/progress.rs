//! Progress sources: what drives a section's timeline.
//!
//! Both variants are pull-based subscriptions. The host pushes raw input (scroll
//! offset, clock) and the section drains at most one `ProgressState` per frame via
//! `take_update`.

use serde::{Deserialize, Serialize};

use crate::binding::{LayoutProbe, TargetHandle};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Scroll,
    Timer,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub value: f32,
    pub direction: Direction,
    pub source: SourceKind,
}

pub trait ProgressSource {
    fn kind(&self) -> SourceKind;
    /// Let time-dependent sources catch up to `now_ms`.
    fn advance_clock(&mut self, now_ms: f64);
    /// Drain the update produced since the last call, if the value moved.
    fn take_update(&mut self) -> Option<ProgressState>;
    /// Last emitted value.
    fn current(&self) -> f32;
    /// Return to 0 and drop anything not yet drained.
    fn reset(&mut self);
}

/// Distance the pinned span covers.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extent {
    /// Fixed scroll distance in pixels (`"+=2500"`).
    Fixed(f64),
    /// Region height minus viewport height (`"bottom bottom"`).
    RegionHeight,
}

const SNAP_EPSILON: f32 = 1e-4;

/// Scroll fraction over a pinned region.
#[derive(Debug)]
pub struct PinnedScroll {
    region: TargetHandle,
    extent_mode: Extent,
    smoothing_ms: Option<f64>,

    // Layout, recomputed on resize; `None` until measured.
    start: Option<f64>,
    extent: Option<f64>,

    scroll: f64,
    raw: f32,
    displayed: f32,
    last_emitted: Option<f32>,
    last_clock: Option<f64>,
    pinned: bool,
    pin_change: Option<bool>,
    pending: Option<ProgressState>,
}

impl PinnedScroll {
    pub fn new(region: TargetHandle, extent_mode: Extent, smoothing_ms: Option<f64>) -> Self {
        Self {
            region,
            extent_mode,
            smoothing_ms: smoothing_ms.filter(|s| *s > 0.0),
            start: None,
            extent: None,
            scroll: 0.0,
            raw: 0.0,
            displayed: 0.0,
            last_emitted: None,
            last_clock: None,
            pinned: false,
            pin_change: None,
            pending: None,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn is_measured(&self) -> bool {
        self.start.is_some() && self.extent.is_some()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Measure pin start and extent. Returns `false` when layout is not available yet.
    pub fn measure(&mut self, probe: &mut dyn LayoutProbe, viewport_height: f64) -> bool {
        let Some(rect) = probe.region_rect(&self.region) else {
            return false;
        };
        let extent = match self.extent_mode {
            Extent::Fixed(px) => px,
            Extent::RegionHeight => rect.height - viewport_height,
        };
        self.start = Some(rect.top);
        // A region no taller than the viewport still needs a non-zero span.
        self.extent = Some(extent.max(1.0));
        self.recompute();
        true
    }

    /// Forget layout and pin state (breakpoint teardown).
    pub fn release(&mut self) {
        self.start = None;
        self.extent = None;
        self.last_clock = None;
        self.pending = None;
        if self.pinned {
            self.pinned = false;
            self.pin_change = Some(false);
        }
    }

    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.scroll = scroll_y;
        self.recompute();
    }

    fn recompute(&mut self) {
        let (Some(start), Some(extent)) = (self.start, self.extent) else {
            return;
        };
        let travelled = self.scroll - start;
        self.raw = (travelled / extent).clamp(0.0, 1.0) as f32;
        let pinned = travelled >= 0.0 && travelled < extent;
        if pinned != self.pinned {
            self.pinned = pinned;
            self.pin_change = Some(pinned);
        }
    }

    /// Pin state transition since the last call.
    pub fn take_pin_change(&mut self) -> Option<bool> {
        self.pin_change.take()
    }

    fn emit(&mut self) {
        let value = self.displayed;
        let direction = match self.last_emitted {
            Some(prev) if value < prev => Direction::Backward,
            _ => Direction::Forward,
        };
        if let Some(prev) = self.last_emitted {
            if (prev - value).abs() <= f32::EPSILON {
                return;
            }
        }
        self.last_emitted = Some(value);
        self.pending = Some(ProgressState {
            value,
            direction,
            source: SourceKind::Scroll,
        });
    }
}

impl ProgressSource for PinnedScroll {
    fn kind(&self) -> SourceKind {
        SourceKind::Scroll
    }

    fn advance_clock(&mut self, now_ms: f64) {
        if !self.is_measured() {
            return;
        }
        let dt = self.last_clock.map(|t| (now_ms - t).max(0.0)).unwrap_or(0.0);
        self.last_clock = Some(now_ms);
        // A fresh binding starts on the raw value instead of chasing it.
        self.displayed = match self.smoothing_ms {
            Some(tau) if self.last_emitted.is_some() => {
                let alpha = 1.0 - (-dt / tau).exp();
                let next = self.displayed + (self.raw - self.displayed) * alpha as f32;
                if (self.raw - next).abs() < SNAP_EPSILON {
                    self.raw
                } else {
                    next
                }
            }
            _ => self.raw,
        };
        self.emit();
    }

    fn take_update(&mut self) -> Option<ProgressState> {
        self.pending.take()
    }

    fn current(&self) -> f32 {
        self.last_emitted.unwrap_or(0.0)
    }

    fn reset(&mut self) {
        self.displayed = self.raw;
        self.last_emitted = None;
        self.last_clock = None;
        self.pending = None;
    }
}

/// Countdown-style progress that grows by a fixed step per tick.
///
/// Monotonic while running; `restart` returns it to 0 (stage change or manual
/// selection) and `pause` freezes it without resetting.
#[derive(Debug)]
pub struct TimerProgress {
    tick_ms: f64,
    step: f32,
    value: f32,
    last_tick: Option<f64>,
    pending: Option<ProgressState>,
}

impl TimerProgress {
    /// `interval_ms` is the autoplay interval the countdown spans.
    pub fn new(interval_ms: f64, tick_ms: f64) -> Self {
        let tick_ms = tick_ms.max(1.0);
        let step = (tick_ms / interval_ms.max(tick_ms)) as f32;
        Self {
            tick_ms,
            step,
            value: 0.0,
            last_tick: None,
            pending: None,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.last_tick.is_some()
    }

    /// Reset to 0 and start ticking from `now_ms`.
    pub fn restart(&mut self, now_ms: f64) {
        self.reset();
        self.last_tick = Some(now_ms);
    }

    pub fn pause(&mut self) {
        self.last_tick = None;
    }
}

impl ProgressSource for TimerProgress {
    fn kind(&self) -> SourceKind {
        SourceKind::Timer
    }

    fn advance_clock(&mut self, now_ms: f64) {
        let Some(last) = self.last_tick else {
            return;
        };
        let ticks = ((now_ms - last) / self.tick_ms).floor();
        if ticks < 1.0 {
            return;
        }
        self.last_tick = Some(last + ticks * self.tick_ms);
        let next = (self.value + self.step * ticks as f32).min(1.0);
        if next > self.value {
            self.value = next;
            self.pending = Some(ProgressState {
                value: next,
                direction: Direction::Forward,
                source: SourceKind::Timer,
            });
        }
    }

    fn take_update(&mut self) -> Option<ProgressState> {
        self.pending.take()
    }

    fn current(&self) -> f32 {
        self.value
    }

    fn reset(&mut self) {
        let changed = self.value != 0.0;
        self.value = 0.0;
        self.pending = changed.then_some(ProgressState {
            value: 0.0,
            direction: Direction::Backward,
            source: SourceKind::Timer,
        });
    }
}

/// The single driver a section owns.
#[derive(Debug)]
pub enum Driver {
    Scroll(PinnedScroll),
    Timer(TimerProgress),
}

impl ProgressSource for Driver {
    fn kind(&self) -> SourceKind {
        match self {
            Driver::Scroll(s) => s.kind(),
            Driver::Timer(t) => t.kind(),
        }
    }

    fn advance_clock(&mut self, now_ms: f64) {
        match self {
            Driver::Scroll(s) => s.advance_clock(now_ms),
            Driver::Timer(t) => t.advance_clock(now_ms),
        }
    }

    fn take_update(&mut self) -> Option<ProgressState> {
        match self {
            Driver::Scroll(s) => s.take_update(),
            Driver::Timer(t) => t.take_update(),
        }
    }

    fn current(&self) -> f32 {
        match self {
            Driver::Scroll(s) => s.current(),
            Driver::Timer(t) => t.current(),
        }
    }

    fn reset(&mut self) {
        match self {
            Driver::Scroll(s) => s.reset(),
            Driver::Timer(t) => t.reset(),
        }
    }
}
