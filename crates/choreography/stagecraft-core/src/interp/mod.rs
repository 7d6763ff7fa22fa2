//! Easing curves and interpolation helpers.
//!
//! Curve names follow the `family.direction` convention used in section configs
//! (`"power2.out"`, `"sine.inOut"`, `"none"`).

pub mod functions;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    #[serde(rename = "none", alias = "linear")]
    Linear,
    #[serde(rename = "power1.out")]
    Power1Out,
    #[serde(rename = "power2.in")]
    Power2In,
    #[serde(rename = "power2.out")]
    Power2Out,
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    #[serde(rename = "power3.out")]
    Power3Out,
    #[serde(rename = "sine.inOut")]
    SineInOut,
}

impl Ease {
    /// Map normalized time to eased progress. Input is clamped to [0, 1] and both
    /// endpoints are exact.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power2In => t * t * t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::Power3Out => 1.0 - (1.0 - t).powi(4),
            Ease::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}
