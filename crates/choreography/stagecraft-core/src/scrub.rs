//! Properties mapped directly onto timeline progress.
//!
//! Several scrubs may share one `(target, property)` pair over different spans
//! (an image fading in over one phase and out over the next). At any progress
//! the pair is governed by the last scrub that has started, or by the first one
//! while none has, which is how a scrubbed timeline renders overlapping tweens.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::binding::{LayoutProbe, TargetHandle, TargetResolver};
use crate::cues::resolve_at;
use crate::data::CueAt;
use crate::error::ConfigError;
use crate::interp::functions::{inverse_lerp_clamped, lerp_f32};
use crate::interp::Ease;
use crate::outputs::{CoreEvent, Outputs};
use crate::tween::path_draw::{PathDrawState, PathLengths};
use crate::value::{Property, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrubKind {
    Property { property: Property, from: f32, to: f32 },
    /// Stroke draw-in using the cached path length.
    PathDraw,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrubSpec {
    /// Element reference.
    pub target: String,
    pub start: CueAt,
    pub end: CueAt,
    #[serde(default)]
    pub ease: Ease,
    pub kind: ScrubKind,
}

impl ScrubSpec {
    /// Resolve `[start, end]` to offsets, rejecting reversed spans.
    pub fn resolve_span(&self, labels: &BTreeMap<String, f32>) -> Result<(f32, f32), ConfigError> {
        let start = resolve_at(&self.start, labels, &self.target)?;
        let end = resolve_at(&self.end, labels, &self.target)?;
        if start > end {
            return Err(ConfigError::InvalidScrubSpan {
                target: self.target.clone(),
                start,
                end,
            });
        }
        Ok((start, end))
    }

    fn property(&self) -> Property {
        match &self.kind {
            ScrubKind::Property { property, .. } => property.clone(),
            ScrubKind::PathDraw => Property::StrokeDashoffset,
        }
    }
}

#[derive(Clone, Debug)]
struct BoundScrub {
    handle: TargetHandle,
    property: Property,
    start: f32,
    end: f32,
    ease: Ease,
    kind: ScrubKind,
}

impl BoundScrub {
    fn local(&self, p: f32) -> f32 {
        if self.end <= self.start {
            return if p >= self.start { 1.0 } else { 0.0 };
        }
        self.ease.apply(inverse_lerp_clamped(self.start, self.end, p))
    }
}

#[derive(Debug, Default)]
pub struct ScrubTrack {
    // Sorted by start; ties keep registration order.
    scrubs: Vec<BoundScrub>,
    written: HashMap<(TargetHandle, Property), f32>,
}

impl ScrubTrack {
    /// Bind scrubs whose target resolves; absent targets are skipped.
    pub fn bind(
        specs: &[ScrubSpec],
        labels: &BTreeMap<String, f32>,
        resolver: &mut dyn TargetResolver,
    ) -> Result<Self, ConfigError> {
        let mut scrubs = Vec::new();
        for spec in specs {
            let (start, end) = spec.resolve_span(labels)?;
            let Some(handle) = resolver.resolve(&spec.target) else {
                log::debug!("scrub target '{}' not present; skipping", spec.target);
                continue;
            };
            scrubs.push(BoundScrub {
                handle,
                property: spec.property(),
                start,
                end,
                ease: spec.ease,
                kind: spec.kind.clone(),
            });
        }
        scrubs.sort_by(|a, b| a.start.total_cmp(&b.start));
        Ok(Self {
            scrubs,
            written: HashMap::new(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.scrubs.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = &TargetHandle> {
        self.scrubs.iter().map(|s| &s.handle)
    }

    /// Write every governed pair whose value changed at progress `p`.
    pub fn apply(
        &mut self,
        p: f32,
        lengths: &mut PathLengths,
        probe: &mut dyn LayoutProbe,
        out: &mut Outputs,
    ) {
        for (i, scrub) in self.scrubs.iter().enumerate() {
            if !self.governs(i, p) {
                continue;
            }
            let t = scrub.local(p);
            let value = match &scrub.kind {
                ScrubKind::Property { from, to, .. } => lerp_f32(*from, *to, t),
                ScrubKind::PathDraw => match lengths.get_or_measure(&scrub.handle, probe) {
                    Some(len) => PathDrawState::at(len, t).offset,
                    None => {
                        out.push_event(CoreEvent::MeasurementDeferred {
                            target: scrub.handle.clone(),
                        });
                        continue;
                    }
                },
            };
            let key = (scrub.handle.clone(), scrub.property.clone());
            if self.written.get(&key) == Some(&value) {
                continue;
            }
            self.written.insert(key, value);
            out.write(&scrub.handle, scrub.property.clone(), Value::Scalar(value));
        }
    }

    /// Forget written values so the next `apply` rewrites everything.
    pub fn invalidate(&mut self) {
        self.written.clear();
    }

    fn governs(&self, index: usize, p: f32) -> bool {
        let me = &self.scrubs[index];
        let mut same_key = self
            .scrubs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.handle == me.handle && s.property == me.property);
        let started = same_key
            .clone()
            .filter(|(_, s)| s.start <= p)
            .map(|(i, _)| i)
            .last();
        match started {
            Some(i) => i == index,
            None => same_key.next().map(|(i, _)| i) == Some(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Rect;

    struct Everything;
    impl TargetResolver for Everything {
        fn resolve(&mut self, element_ref: &str) -> Option<TargetHandle> {
            (element_ref != "missing").then(|| element_ref.to_string())
        }
    }

    struct Lengths(Option<f32>);
    impl LayoutProbe for Lengths {
        fn path_length(&mut self, _target: &str) -> Option<f32> {
            self.0
        }
        fn region_rect(&mut self, _target: &str) -> Option<Rect> {
            None
        }
    }

    fn property(target: &str, start: f32, end: f32, from: f32, to: f32) -> ScrubSpec {
        ScrubSpec {
            target: target.into(),
            start: CueAt::Offset(start),
            end: CueAt::Offset(end),
            ease: Ease::Linear,
            kind: ScrubKind::Property {
                property: Property::Opacity,
                from,
                to,
            },
        }
    }

    #[test]
    fn overlapping_spans_hand_over_the_pair() {
        let specs = [
            property("img", 0.2, 0.4, 0.0, 1.0),
            property("img", 0.6, 0.8, 1.0, 0.0),
            property("missing", 0.0, 1.0, 0.0, 1.0),
        ];
        let mut track = ScrubTrack::bind(&specs, &BTreeMap::new(), &mut Everything).unwrap();
        let mut lengths = PathLengths::new();
        let mut probe = Lengths(None);
        let mut out = Outputs::default();

        let mut at = |p: f32, track: &mut ScrubTrack| {
            out.clear();
            track.apply(p, &mut lengths, &mut probe, &mut out);
            out.last_value("img", &Property::Opacity).and_then(Value::as_scalar)
        };
        assert_eq!(at(0.0, &mut track), Some(0.0));
        assert_eq!(at(0.3, &mut track).map(|v| (v * 100.0).round()), Some(50.0));
        assert_eq!(at(0.5, &mut track), Some(1.0));
        // unchanged values are not rewritten
        assert_eq!(at(0.55, &mut track), None);
        assert_eq!(at(0.9, &mut track), Some(0.0));
        assert_eq!(at(0.3, &mut track).map(|v| (v * 100.0).round()), Some(50.0));
    }

    #[test]
    fn path_draw_defers_until_measured() {
        let specs = [ScrubSpec {
            target: "line".into(),
            start: CueAt::Offset(0.0),
            end: CueAt::Offset(1.0),
            ease: Ease::Linear,
            kind: ScrubKind::PathDraw,
        }];
        let mut track = ScrubTrack::bind(&specs, &BTreeMap::new(), &mut Everything).unwrap();
        let mut lengths = PathLengths::new();
        let mut out = Outputs::default();
        track.apply(0.5, &mut lengths, &mut Lengths(None), &mut out);
        assert!(out.changes.is_empty());
        assert!(matches!(
            out.events[0],
            CoreEvent::MeasurementDeferred { .. }
        ));
        out.clear();
        track.apply(0.5, &mut lengths, &mut Lengths(Some(200.0)), &mut out);
        assert_eq!(
            out.last_value("line", &Property::StrokeDashoffset),
            Some(&Value::Scalar(100.0))
        );
    }

    #[test]
    fn reversed_span_is_rejected() {
        let err = property("x", 0.8, 0.2, 0.0, 1.0)
            .resolve_span(&BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScrubSpan { .. }));
    }
}
