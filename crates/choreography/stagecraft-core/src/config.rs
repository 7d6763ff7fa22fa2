//! Per-section configuration.
//!
//! Sections arrive as JSON. Every timing has a default matching the page it was
//! authored for, so a config only spells out what differs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::binding::ElementGroup;
use crate::cues::CueTrack;
use crate::data::{Cue, Stage};
use crate::error::ConfigError;
use crate::interp::Ease;
use crate::progress::Extent;
use crate::scrub::ScrubSpec;
use crate::tween::counter::{CounterOrigin, Precision};
use crate::tween::fade::{FadeSpec, IndicatorStyle};

fn default_breakpoint() -> f64 {
    1024.0
}

fn default_active_class() -> String {
    "active".to_string()
}

fn default_pinned_class() -> String {
    "pinned".to_string()
}

/// A scroll-pinned region driving the section's timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinnedConfig {
    pub region: String,
    #[serde(default = "PinnedConfig::default_extent")]
    pub extent: Extent,
    /// Scrub smoothing time constant; `None` follows scroll exactly.
    #[serde(default)]
    pub smoothing_ms: Option<f64>,
}

impl PinnedConfig {
    fn default_extent() -> Extent {
        Extent::Fixed(2500.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    pub interval_ms: f64,
    pub tick_ms: f64,
    /// Pause while the pointer or focus is inside the section root.
    pub pause_on_hover: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            interval_ms: 4000.0,
            tick_ms: 100.0,
            pause_on_hover: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub line: String,
    #[serde(default)]
    pub dots: Option<ElementGroup>,
    #[serde(default = "ChartConfig::default_draw_ms")]
    pub draw_ms: f64,
    #[serde(default = "ChartConfig::default_ease")]
    pub ease: Ease,
    #[serde(default = "ChartConfig::default_dot_stagger_ms")]
    pub dot_stagger_ms: f64,
    #[serde(default = "ChartConfig::default_dot_fade_ms")]
    pub dot_fade_ms: f64,
    /// Emphasis loop period after the draw; `None` disables the pulse.
    #[serde(default = "ChartConfig::default_pulse_ms")]
    pub pulse_ms: Option<f64>,
}

impl ChartConfig {
    fn default_draw_ms() -> f64 {
        2500.0
    }
    fn default_ease() -> Ease {
        Ease::Power2Out
    }
    fn default_dot_stagger_ms() -> f64 {
        800.0
    }
    fn default_dot_fade_ms() -> f64 {
        300.0
    }
    fn default_pulse_ms() -> Option<f64> {
        Some(1500.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    #[serde(default)]
    pub arc: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default = "GaugeConfig::default_max_dash")]
    pub max_dash: f32,
    #[serde(default = "GaugeConfig::default_duration_ms")]
    pub duration_ms: f64,
    #[serde(default = "ChartConfig::default_ease")]
    pub ease: Ease,
}

impl GaugeConfig {
    fn default_max_dash() -> f32 {
        126.0
    }
    fn default_duration_ms() -> f64 {
        2500.0
    }

    /// Dash offset showing `gauge` percent of the arc.
    pub fn offset_for(&self, gauge: f32) -> f32 {
        self.max_dash - gauge.clamp(0.0, 100.0) / 100.0 * self.max_dash
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Elements receiving the counter text, matched to a stage's metrics by position.
    pub slots: ElementGroup,
    /// Elements tagged `active` in rotation, one per stage.
    #[serde(default)]
    pub highlights: Option<ElementGroup>,
    #[serde(default = "GaugeConfig::default_duration_ms")]
    pub duration_ms: f64,
    #[serde(default = "ChartConfig::default_ease")]
    pub ease: Ease,
    #[serde(default)]
    pub origin: CounterOrigin,
    #[serde(default)]
    pub precision: Precision,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Section root; hover/focus on it pauses autoplay.
    pub root: String,
    #[serde(default)]
    pub pinned: Option<PinnedConfig>,
    #[serde(default = "default_breakpoint")]
    pub responsive_breakpoint: f64,
    #[serde(default)]
    pub autoplay: Option<AutoplayConfig>,

    pub stages: Vec<Stage>,
    #[serde(default)]
    pub cues: Vec<Cue>,
    /// Named timeline positions in [0, 1].
    #[serde(default)]
    pub labels: BTreeMap<String, f32>,

    /// Field name → element reference.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Elements faded around a content swap. Defaults to the field elements.
    #[serde(default)]
    pub fade_targets: Option<ElementGroup>,
    #[serde(default)]
    pub indicators: Option<ElementGroup>,
    /// When set, indicators are restyled on selection instead of faded.
    #[serde(default)]
    pub indicator_style: Option<IndicatorStyle>,
    #[serde(default)]
    pub stage_images: Option<ElementGroup>,
    #[serde(default)]
    pub fade: FadeSpec,

    #[serde(default)]
    pub chart: Option<ChartConfig>,
    #[serde(default)]
    pub gauge: Option<GaugeConfig>,
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub scrubs: Vec<ScrubSpec>,

    #[serde(default = "default_active_class")]
    pub active_class: String,
    #[serde(default = "default_pinned_class")]
    pub pinned_class: String,
}

impl SectionConfig {
    /// Parse and validate a section config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SectionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that can be checked without a host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(autoplay) = &self.autoplay {
            if autoplay.interval_ms <= 0.0 || autoplay.tick_ms <= 0.0 {
                return Err(ConfigError::ZeroInterval);
            }
        }
        CueTrack::build(&self.cues, &self.labels, self.stages.len())?;
        for scrub in &self.scrubs {
            scrub.resolve_span(&self.labels)?;
        }
        Ok(())
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Extent;

    #[test]
    fn defaults_fill_in_page_constants() {
        let cfg = SectionConfig::from_json_str(
            r##"{
                "root": "#workflow",
                "autoplay": {},
                "stages": [{ "index": 0 }],
                "gauge": { "arc": ".gauge-progress" },
                "pinned": { "region": ".pin" }
            }"##,
        )
        .unwrap();
        assert_eq!(cfg.responsive_breakpoint, 1024.0);
        let autoplay = cfg.autoplay.as_ref().unwrap();
        assert_eq!(autoplay.interval_ms, 4000.0);
        assert!(autoplay.pause_on_hover);
        assert_eq!(cfg.fade.out_ms, 250.0);
        assert_eq!(cfg.fade.in_ms, 400.0);
        let gauge = cfg.gauge.as_ref().unwrap();
        assert_eq!(gauge.max_dash, 126.0);
        assert!((gauge.offset_for(80.0) - 25.2).abs() < 1e-4);
        assert_eq!(cfg.pinned.as_ref().unwrap().extent, Extent::Fixed(2500.0));
        assert_eq!(cfg.active_class, "active");
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = SectionConfig::from_json_str(
            r#"{
                "root": "r",
                "stages": [{ "index": 0 }],
                "cues": [{ "label": "x", "at": "nowhere", "action": "signal" }]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLabel { .. }));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = SectionConfig::from_json_str(
            r#"{ "root": "r", "stages": [{ "index": 0 }], "autoplay": { "interval_ms": 0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SectionConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
