//! Stage and cue definitions as they arrive from section configs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One slot value of a stage: display text or an asset reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text(String),
    Asset(String),
}

impl Content {
    pub fn to_value(&self) -> crate::value::Value {
        match self {
            Content::Text(s) => crate::value::Value::Text(s.clone()),
            Content::Asset(s) => crate::value::Value::Asset(s.clone()),
        }
    }
}

/// A metric as authored: a bare number or a formatted string such as `"400K"` or
/// `"3.2%"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Number(f64),
    Formatted(String),
}

/// Numeric core of a metric plus the text around it.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedMetric {
    pub prefix: String,
    pub value: f64,
    pub suffix: String,
}

impl Metric {
    /// Split a metric into `prefix`, leading number, and `suffix`.
    /// Returns `None` when no digits are present (the metric is then written verbatim).
    pub fn parse(&self) -> Option<ParsedMetric> {
        match self {
            Metric::Number(n) => Some(ParsedMetric {
                prefix: String::new(),
                value: *n,
                suffix: String::new(),
            }),
            Metric::Formatted(s) => {
                let start = s.find(|c: char| c.is_ascii_digit() || c == '.')?;
                let rest = &s[start..];
                let len = rest
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(rest.len());
                let value: f64 = rest[..len].parse().ok()?;
                Some(ParsedMetric {
                    prefix: s[..start].to_string(),
                    value,
                    suffix: rest[len..].to_string(),
                })
            }
        }
    }

    pub fn verbatim(&self) -> String {
        match self {
            Metric::Number(n) => format!("{n}"),
            Metric::Formatted(s) => s.clone(),
        }
    }
}

/// One narrative step. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub index: usize,
    /// Field name → value. Field names match `SectionConfig::fields`.
    #[serde(default)]
    pub content: BTreeMap<String, Content>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub gauge: Option<f32>,
}

/// Where a cue sits on the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CueAt {
    Offset(f32),
    /// A named timeline position (see `SectionConfig::labels`).
    Named(String),
    /// A named position shifted by `delta` (may be negative).
    Relative { label: String, delta: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueAction {
    /// Crossing the cue moves the section to this stage.
    Stage(usize),
    /// Crossing the cue emits `CoreEvent::CueFired` only.
    Signal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub label: String,
    pub at: CueAt,
    pub action: CueAction,
}
