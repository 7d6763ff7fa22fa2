//! Numeric counters with format preservation.

use serde::{Deserialize, Serialize};

use crate::data::ParsedMetric;
use crate::interp::Ease;

use super::{Render, StartFrom, TweenSpec};

/// Decimal places used while a counter runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Integer when the target has no fractional part, otherwise one decimal.
    #[default]
    Auto,
    Fixed(u8),
}

/// Where a counter starts on each run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterOrigin {
    #[default]
    Zero,
    /// Continue from the previously displayed value.
    Previous,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CounterState {
    pub current: f64,
    pub target: f64,
    pub prefix: String,
    pub suffix: String,
    pub precision: Precision,
}

impl CounterState {
    pub fn new(target: f64, suffix: impl Into<String>, precision: Precision) -> Self {
        Self {
            current: 0.0,
            target,
            prefix: String::new(),
            suffix: suffix.into(),
            precision,
        }
    }

    pub fn from_metric(metric: &ParsedMetric, precision: Precision) -> Self {
        Self {
            current: 0.0,
            target: metric.value,
            prefix: metric.prefix.clone(),
            suffix: metric.suffix.clone(),
            precision,
        }
    }

    fn decimals(&self) -> usize {
        match self.precision {
            Precision::Fixed(n) => n as usize,
            Precision::Auto if self.target.fract() == 0.0 => 0,
            Precision::Auto => 1,
        }
    }

    /// Intermediate frame text.
    pub fn render(&self) -> String {
        format!(
            "{}{:.*}{}",
            self.prefix,
            self.decimals(),
            self.current,
            self.suffix
        )
    }

    /// Final frame text. `Auto` renders the exact target; `Fixed(n)` rounds it
    /// half away from zero to `n` decimals (a 72.5 gauge score ends on "73").
    pub fn render_final(&self) -> String {
        let number = match self.precision {
            Precision::Fixed(n) => {
                let scale = 10f64.powi(n as i32);
                format!("{:.*}", n as usize, (self.target * scale).round() / scale)
            }
            Precision::Auto if self.target.fract() == 0.0 => format!("{:.0}", self.target),
            Precision::Auto => format!("{}", self.target),
        };
        format!("{}{}{}", self.prefix, number, self.suffix)
    }

    /// Tween spec running this counter from `from` to its target.
    pub fn tween(self, from: f32, duration_ms: f64, ease: Ease) -> TweenSpec {
        let to = self.target as f32;
        TweenSpec {
            from: StartFrom::Value(from),
            ..TweenSpec::to(to, duration_ms, ease)
        }
        .with_render(Render::Counter(self))
    }
}
