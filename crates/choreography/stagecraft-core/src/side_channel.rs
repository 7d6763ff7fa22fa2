//! Secondary visuals that follow each accepted stage change.
//!
//! A chart line redraws from hidden with its dots fading in one after another,
//! and an emphasis pulse starts once the line is fully drawn. A gauge arc
//! sweeps to the stage's score, metric slots count up to the stage's metrics, and
//! one metric card is highlighted in rotation. Everything here runs through
//! the section's `TweenSet`, so a newer stage simply overwrites an older one.

use crate::binding::{resolve_group, resolve_opt, LayoutProbe, TargetHandle, TargetResolver};
use crate::config::{ChartConfig, GaugeConfig, MetricsConfig, SectionConfig};
use crate::data::Stage;
use crate::ids::CancelToken;
use crate::outputs::{CoreEvent, Outputs};
use crate::tween::counter::{CounterOrigin, CounterState, Precision};
use crate::tween::path_draw::{draw_spec, pulse_spec, PathLengths};
use crate::tween::{Completion, TweenKey, TweenSet, TweenSpec};
use crate::value::{Property, Value};

#[derive(Debug)]
struct BoundChart {
    line: TargetHandle,
    dots: Vec<TargetHandle>,
    config: ChartConfig,
    draw: Option<CancelToken>,
    // Draw requested while the line could not be measured.
    deferred: bool,
}

#[derive(Debug)]
struct BoundGauge {
    arc: Option<TargetHandle>,
    score: Option<TargetHandle>,
    config: GaugeConfig,
}

#[derive(Debug)]
struct BoundMetrics {
    slots: Vec<TargetHandle>,
    highlights: Vec<TargetHandle>,
    config: MetricsConfig,
}

#[derive(Debug, Default)]
pub struct SideChannels {
    chart: Option<BoundChart>,
    gauge: Option<BoundGauge>,
    metrics: Option<BoundMetrics>,
    active_class: String,
}

impl SideChannels {
    /// Resolve side-channel elements. Every one of them is optional.
    pub fn bind(config: &SectionConfig, resolver: &mut dyn TargetResolver) -> Self {
        let chart = config.chart.as_ref().and_then(|c| {
            let line = resolve_opt(resolver, Some(c.line.as_str()))?;
            Some(BoundChart {
                line,
                dots: resolve_group(resolver, c.dots.as_ref()),
                config: c.clone(),
                draw: None,
                deferred: false,
            })
        });
        let gauge = config.gauge.as_ref().and_then(|g| {
            let arc = resolve_opt(resolver, g.arc.as_deref());
            let score = resolve_opt(resolver, g.score.as_deref());
            (arc.is_some() || score.is_some()).then(|| BoundGauge {
                arc,
                score,
                config: g.clone(),
            })
        });
        let metrics = config.metrics.as_ref().and_then(|m| {
            let slots = resolve_group(resolver, Some(&m.slots));
            let highlights = resolve_group(resolver, m.highlights.as_ref());
            (!slots.is_empty() || !highlights.is_empty()).then(|| BoundMetrics {
                slots,
                highlights,
                config: m.clone(),
            })
        });
        Self {
            chart,
            gauge,
            metrics,
            active_class: config.active_class.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chart.is_none() && self.gauge.is_none() && self.metrics.is_none()
    }

    /// Every handle the side channels write to.
    pub fn handles(&self) -> Vec<TargetHandle> {
        let mut handles = Vec::new();
        if let Some(chart) = &self.chart {
            handles.push(chart.line.clone());
            handles.extend(chart.dots.iter().cloned());
        }
        if let Some(gauge) = &self.gauge {
            handles.extend(gauge.arc.iter().cloned());
            handles.extend(gauge.score.iter().cloned());
        }
        if let Some(metrics) = &self.metrics {
            handles.extend(metrics.slots.iter().cloned());
            handles.extend(metrics.highlights.iter().cloned());
        }
        handles
    }

    /// Start every channel for `stage`, the newly accepted target.
    pub fn fire(
        &mut self,
        stage: &Stage,
        set: &mut TweenSet,
        lengths: &mut PathLengths,
        probe: &mut dyn LayoutProbe,
        now_ms: f64,
        out: &mut Outputs,
    ) {
        if let Some(chart) = &mut self.chart {
            chart.redraw(set, lengths, probe, now_ms, out);
        }
        if let (Some(gauge), Some(value)) = (&self.gauge, stage.gauge) {
            gauge.sweep(value, set, now_ms);
        }
        if let Some(metrics) = &self.metrics {
            metrics.count(stage, set, now_ms, out);
            metrics.highlight(stage.index, &self.active_class, out);
        }
    }

    /// Start the pulse once the line draw has completed.
    pub fn on_completions(&mut self, done: &[Completion], set: &mut TweenSet, now_ms: f64) {
        let Some(chart) = &mut self.chart else {
            return;
        };
        let Some(draw) = chart.draw else {
            return;
        };
        if !done.iter().any(|c| c.token == draw) {
            return;
        }
        chart.draw = None;
        if let Some(period) = chart.config.pulse_ms {
            set.start(
                TweenKey::new(&chart.line, Property::Emphasis),
                pulse_spec(period),
                now_ms,
            );
        }
    }

    /// Retry a chart draw that was waiting on layout.
    pub fn retry_deferred(
        &mut self,
        set: &mut TweenSet,
        lengths: &mut PathLengths,
        probe: &mut dyn LayoutProbe,
        now_ms: f64,
        out: &mut Outputs,
    ) {
        if let Some(chart) = &mut self.chart {
            if chart.deferred {
                chart.start_draw(set, lengths, probe, now_ms, out);
            }
        }
    }

    pub fn has_deferred(&self) -> bool {
        self.chart.as_ref().is_some_and(|c| c.deferred)
    }

    /// Drop pending work (teardown). Live runs are cancelled by the owner.
    pub fn release(&mut self) {
        if let Some(chart) = &mut self.chart {
            chart.draw = None;
            chart.deferred = false;
        }
    }
}

impl BoundChart {
    fn redraw(
        &mut self,
        set: &mut TweenSet,
        lengths: &mut PathLengths,
        probe: &mut dyn LayoutProbe,
        now_ms: f64,
        out: &mut Outputs,
    ) {
        // kills the running draw and any pulse
        set.cancel_target(&self.line);
        self.draw = None;
        self.start_draw(set, lengths, probe, now_ms, out);
        for (i, dot) in self.dots.iter().enumerate() {
            set.start(
                TweenKey::new(dot, Property::Opacity),
                TweenSpec::from_to(0.0, 1.0, self.config.dot_fade_ms, Default::default())
                    .with_delay(i as f64 * self.config.dot_stagger_ms),
                now_ms,
            );
        }
    }

    fn start_draw(
        &mut self,
        set: &mut TweenSet,
        lengths: &mut PathLengths,
        probe: &mut dyn LayoutProbe,
        now_ms: f64,
        out: &mut Outputs,
    ) {
        match lengths.get_or_measure(&self.line, probe) {
            Some(len) => {
                self.deferred = false;
                self.draw = Some(set.start(
                    TweenKey::new(&self.line, Property::StrokeDashoffset),
                    draw_spec(len, self.config.draw_ms, self.config.ease),
                    now_ms,
                ));
            }
            None => {
                self.deferred = true;
                out.push_event(CoreEvent::MeasurementDeferred {
                    target: self.line.clone(),
                });
            }
        }
    }
}

impl BoundGauge {
    fn sweep(&self, value: f32, set: &mut TweenSet, now_ms: f64) {
        let cfg = &self.config;
        if let Some(arc) = &self.arc {
            set.start(
                TweenKey::new(arc, Property::StrokeDashoffset),
                TweenSpec::from_to(cfg.max_dash, cfg.offset_for(value), cfg.duration_ms, cfg.ease),
                now_ms,
            );
        }
        if let Some(score) = &self.score {
            // Integer readout: the score's last frame is the rounded gauge value.
            let counter = CounterState::new(value as f64, "", Precision::Fixed(0));
            set.start(
                TweenKey::new(score, Property::Content),
                counter.tween(0.0, cfg.duration_ms, cfg.ease),
                now_ms,
            );
        }
    }
}

impl BoundMetrics {
    fn count(&self, stage: &Stage, set: &mut TweenSet, now_ms: f64, out: &mut Outputs) {
        let cfg = &self.config;
        for (slot, metric) in self.slots.iter().zip(stage.metrics.iter()) {
            let key = TweenKey::new(slot, Property::Content);
            match metric.parse() {
                Some(parsed) => {
                    let from = match cfg.origin {
                        CounterOrigin::Zero => 0.0,
                        CounterOrigin::Previous => set.current(&key).unwrap_or(0.0),
                    };
                    let counter = CounterState::from_metric(&parsed, cfg.precision);
                    set.start(key, counter.tween(from, cfg.duration_ms, cfg.ease), now_ms);
                }
                None => {
                    set.cancel(&key);
                    out.write(slot, Property::Content, Value::Text(metric.verbatim()));
                }
            }
        }
    }

    fn highlight(&self, index: usize, class: &str, out: &mut Outputs) {
        if self.highlights.is_empty() {
            return;
        }
        let active = index % self.highlights.len();
        for (i, h) in self.highlights.iter().enumerate() {
            out.tag(h, class, i == active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Rect;
    use crate::data::Metric;

    struct Everything;
    impl TargetResolver for Everything {
        fn resolve(&mut self, element_ref: &str) -> Option<TargetHandle> {
            Some(element_ref.to_string())
        }
    }

    struct Probe(Option<f32>);
    impl LayoutProbe for Probe {
        fn path_length(&mut self, _target: &str) -> Option<f32> {
            self.0
        }
        fn region_rect(&mut self, _target: &str) -> Option<Rect> {
            None
        }
    }

    fn workflow() -> SectionConfig {
        serde_json::from_value(serde_json::json!({
            "root": "#workflow",
            "stages": [
                { "index": 0, "metrics": ["400K", "2.1M", "3.2%", "12.4"], "gauge": 80 },
                { "index": 1, "metrics": ["450K", "2.5M", "3.5%", "10.1"], "gauge": 85 }
            ],
            "chart": { "line": "line", "dots": ["d0", "d1", "d2", "d3"] },
            "gauge": { "arc": "arc", "score": "score" },
            "metrics": { "slots": ["m0", "m1", "m2", "m3"], "highlights": ["c0", "c1", "c2"] }
        }))
        .unwrap()
    }

    fn stage(metrics: &[&str], gauge: f32, index: usize) -> Stage {
        Stage {
            index,
            content: Default::default(),
            metrics: metrics.iter().map(|m| Metric::Formatted(m.to_string())).collect(),
            gauge: Some(gauge),
        }
    }

    #[test]
    fn fire_counts_metrics_to_their_exact_text() {
        let mut sc = SideChannels::bind(&workflow(), &mut Everything);
        let mut set = TweenSet::new();
        let mut lengths = PathLengths::new();
        let mut out = Outputs::default();
        let s = stage(&["400K", "2.1M", "3.2%", "12.4"], 80.0, 0);
        sc.fire(&s, &mut set, &mut lengths, &mut Probe(Some(400.0)), 0.0, &mut out);
        set.step(1000.0, &mut out);
        set.step(2500.0, &mut out);
        assert_eq!(out.last_value("m0", &Property::Content), Some(&Value::Text("400K".into())));
        assert_eq!(out.last_value("m3", &Property::Content), Some(&Value::Text("12.4".into())));
        assert_eq!(out.last_value("score", &Property::Content), Some(&Value::Text("80".into())));
        let arc = out.last_value("arc", &Property::StrokeDashoffset).and_then(Value::as_scalar);
        assert!((arc.unwrap() - 25.2).abs() < 1e-3);
        assert_eq!(out.last_value("line", &Property::StrokeDashoffset), Some(&Value::Scalar(0.0)));
        assert_eq!(out.last_value("c0", &Property::class("active")), Some(&Value::Flag(true)));
    }

    #[test]
    fn pulse_starts_only_after_the_draw() {
        let mut sc = SideChannels::bind(&workflow(), &mut Everything);
        let mut set = TweenSet::new();
        let mut lengths = PathLengths::new();
        let mut out = Outputs::default();
        let pulse = TweenKey::new("line", Property::Emphasis);
        let s = stage(&[], 80.0, 0);
        sc.fire(&s, &mut set, &mut lengths, &mut Probe(Some(400.0)), 0.0, &mut out);
        let done = set.step(1000.0, &mut out);
        sc.on_completions(&done, &mut set, 1000.0);
        set.step(1100.0, &mut out);
        assert!(set.current(&pulse).is_none());

        let done = set.step(2500.0, &mut out);
        sc.on_completions(&done, &mut set, 2500.0);
        set.step(3000.0, &mut out);
        assert!(set.current(&pulse).is_some());
        assert!(set.live_count() >= 1);
    }

    #[test]
    fn unmeasurable_line_is_deferred_and_retried() {
        let mut sc = SideChannels::bind(&workflow(), &mut Everything);
        let mut set = TweenSet::new();
        let mut lengths = PathLengths::new();
        let mut out = Outputs::default();
        let s = stage(&[], 80.0, 0);
        sc.fire(&s, &mut set, &mut lengths, &mut Probe(None), 0.0, &mut out);
        assert!(sc.has_deferred());
        assert!(out
            .events
            .iter()
            .any(|e| matches!(e, CoreEvent::MeasurementDeferred { target } if target == "line")));
        sc.retry_deferred(&mut set, &mut lengths, &mut Probe(Some(120.0)), 16.0, &mut out);
        assert!(!sc.has_deferred());
        assert_eq!(lengths.cached("line"), Some(120.0));
    }

    #[test]
    fn highlight_rotates_modulo_the_card_count() {
        let sc = SideChannels::bind(&workflow(), &mut Everything);
        let mut out = Outputs::default();
        let metrics = sc.metrics.as_ref().unwrap();
        metrics.highlight(3, "active", &mut out);
        assert_eq!(out.last_value("c0", &Property::class("active")), Some(&Value::Flag(true)));
        assert_eq!(out.last_value("c1", &Property::class("active")), Some(&Value::Flag(false)));
    }
}
