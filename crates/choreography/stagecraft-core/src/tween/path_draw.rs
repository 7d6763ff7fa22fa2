//! Stroke draw-in for vector paths.
//!
//! A path is hidden by offsetting its dash pattern by the full path length and
//! revealed by animating the offset down to 0. Lengths come from the host probe
//! and are measured once per binding.

use hashbrown::HashMap;

use crate::binding::{LayoutProbe, TargetHandle};
use crate::interp::Ease;

use super::{Repeat, StartFrom, TweenSpec};

/// Measured path lengths, cached per handle until released.
#[derive(Debug, Default)]
pub struct PathLengths {
    lengths: HashMap<TargetHandle, f32>,
}

impl PathLengths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached length, measuring through `probe` on first use. `None` while the
    /// host cannot measure the path yet; nothing is cached in that case.
    pub fn get_or_measure(&mut self, target: &str, probe: &mut dyn LayoutProbe) -> Option<f32> {
        if let Some(len) = self.lengths.get(target) {
            return Some(*len);
        }
        let len = probe.path_length(target).filter(|l| l.is_finite() && *l > 0.0)?;
        log::debug!("measured path '{target}' length {len}");
        self.lengths.insert(target.to_string(), len);
        Some(len)
    }

    pub fn cached(&self, target: &str) -> Option<f32> {
        self.lengths.get(target).copied()
    }

    /// Forget every measurement (breakpoint teardown or re-layout).
    pub fn release(&mut self) {
        self.lengths.clear();
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Draw progress of one path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathDrawState {
    pub total_length: f32,
    pub offset: f32,
}

impl PathDrawState {
    /// Fully hidden path.
    pub fn hidden(total_length: f32) -> Self {
        Self {
            total_length,
            offset: total_length,
        }
    }

    /// Offset for a draw fraction in [0, 1]; always within `[0, total_length]`.
    pub fn at(total_length: f32, drawn: f32) -> Self {
        let drawn = drawn.clamp(0.0, 1.0);
        Self {
            total_length,
            offset: (total_length * (1.0 - drawn)).clamp(0.0, total_length),
        }
    }

    pub fn is_drawn(&self) -> bool {
        self.offset <= 0.0
    }
}

/// Draw from fully hidden to fully drawn.
pub fn draw_spec(total_length: f32, duration_ms: f64, ease: Ease) -> TweenSpec {
    TweenSpec::from_to(total_length, 0.0, duration_ms, ease)
}

/// Emphasis loop started once a draw completes; runs until cancelled.
pub fn pulse_spec(period_ms: f64) -> TweenSpec {
    TweenSpec {
        from: StartFrom::Value(0.0),
        ..TweenSpec::to(1.0, period_ms, Ease::SineInOut)
    }
    .with_repeat(Repeat::YoyoForever)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Rect;
    use crate::outputs::Outputs;
    use crate::tween::{TweenKey, TweenSet};
    use crate::value::Property;

    struct CountingProbe {
        length: Option<f32>,
        calls: usize,
    }

    impl LayoutProbe for CountingProbe {
        fn path_length(&mut self, _target: &str) -> Option<f32> {
            self.calls += 1;
            self.length
        }
        fn region_rect(&mut self, _target: &str) -> Option<Rect> {
            None
        }
    }

    #[test]
    fn length_is_measured_once() {
        let mut probe = CountingProbe {
            length: None,
            calls: 0,
        };
        let mut cache = PathLengths::new();
        assert_eq!(cache.get_or_measure("line", &mut probe), None);
        probe.length = Some(480.0);
        assert_eq!(cache.get_or_measure("line", &mut probe), Some(480.0));
        assert_eq!(cache.get_or_measure("line", &mut probe), Some(480.0));
        assert_eq!(probe.calls, 2);
        cache.release();
        assert!(cache.is_empty());
    }

    #[test]
    fn draw_offset_is_monotonic_and_never_negative() {
        let mut set = TweenSet::new();
        let mut out = Outputs::default();
        let key = TweenKey::new("line", Property::StrokeDashoffset);
        set.start(key.clone(), draw_spec(300.0, 2500.0, Ease::Power2Out), 0.0);
        let mut prev = f32::INFINITY;
        for frame in 0..=200 {
            set.step(frame as f64 * 16.0, &mut out);
            let offset = set.current(&key).unwrap();
            assert!(offset >= 0.0 && offset <= 300.0);
            assert!(offset <= prev);
            prev = offset;
        }
        assert_eq!(prev, 0.0);
    }

    #[test]
    fn state_offset_stays_in_range() {
        assert_eq!(PathDrawState::at(100.0, -1.0).offset, 100.0);
        assert_eq!(PathDrawState::at(100.0, 2.0).offset, 0.0);
        assert!(PathDrawState::at(100.0, 1.0).is_drawn());
        assert!(!PathDrawState::hidden(100.0).is_drawn());
    }
}
