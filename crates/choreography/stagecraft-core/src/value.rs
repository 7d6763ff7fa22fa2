//! Written values and the properties they land on.

use serde::{Deserialize, Serialize};

/// A presentation property on a bound element.
///
/// `Content` receives text or an asset reference; `Class` toggles a named state tag
/// such as `active` or `pinned`. Every other variant carries a scalar.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    RotationY,
    Blur,
    StrokeDashoffset,
    /// Emphasis parameter bounced by the path pulse loop (0..1).
    Emphasis,
    Content,
    Class(String),
}

impl Property {
    pub fn class(name: &str) -> Self {
        Property::Class(name.to_string())
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Property::Content | Property::Class(_))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Scalar(f32),
    Text(String),
    /// Reference to an external asset (image path, media key). Never loaded by the core.
    Asset(String),
    Flag(bool),
}

impl Value {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Asset(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
