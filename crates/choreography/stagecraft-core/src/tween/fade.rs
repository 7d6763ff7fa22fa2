//! Opacity fades over groups of handles.

use serde::{Deserialize, Serialize};

use crate::binding::TargetHandle;
use crate::ids::CancelToken;
use crate::interp::Ease;
use crate::value::Property;

use super::{StartFrom, TweenKey, TweenSet, TweenSpec};

/// Timings of the content swap fades.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeSpec {
    pub out_ms: f64,
    pub in_ms: f64,
    pub ease_out: Ease,
    pub ease_in: Ease,
    /// Vertical shift applied while faded out; `0` disables the y channel.
    pub shift_y: f32,
}

impl Default for FadeSpec {
    fn default() -> Self {
        Self {
            out_ms: 250.0,
            in_ms: 400.0,
            ease_out: Ease::Linear,
            ease_in: Ease::Power2Out,
            shift_y: 0.0,
        }
    }
}

/// Inactive navigation indicator look. Active indicators return to opacity 1
/// and blur 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorStyle {
    pub inactive_opacity: f32,
    pub inactive_blur: f32,
    pub duration_ms: f64,
}

impl Default for IndicatorStyle {
    fn default() -> Self {
        Self {
            inactive_opacity: 0.4,
            inactive_blur: 6.0,
            duration_ms: 400.0,
        }
    }
}

/// Fade every handle to opacity 0 from wherever it currently is.
pub fn fade_out<'a>(
    set: &mut TweenSet,
    handles: impl IntoIterator<Item = &'a TargetHandle>,
    spec: &FadeSpec,
    now_ms: f64,
) -> Vec<CancelToken> {
    fade(set, handles, 0.0, spec.shift_y, spec.out_ms, spec.ease_out, now_ms)
}

/// Fade every handle back to opacity 1.
pub fn fade_in<'a>(
    set: &mut TweenSet,
    handles: impl IntoIterator<Item = &'a TargetHandle>,
    spec: &FadeSpec,
    now_ms: f64,
) -> Vec<CancelToken> {
    fade(set, handles, 1.0, 0.0, spec.in_ms, spec.ease_in, now_ms)
}

fn fade<'a>(
    set: &mut TweenSet,
    handles: impl IntoIterator<Item = &'a TargetHandle>,
    opacity: f32,
    shift_y: f32,
    duration_ms: f64,
    ease: Ease,
    now_ms: f64,
) -> Vec<CancelToken> {
    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(set.start(
            TweenKey::new(handle, Property::Opacity),
            TweenSpec {
                from: StartFrom::Current { fallback: 1.0 },
                ..TweenSpec::to(opacity, duration_ms, ease)
            },
            now_ms,
        ));
        let y_key = TweenKey::new(handle, Property::TranslateY);
        if shift_y != 0.0 || set.current(&y_key).is_some_and(|y| y != 0.0) {
            tokens.push(set.start(
                y_key,
                TweenSpec {
                    from: StartFrom::Current { fallback: 0.0 },
                    ..TweenSpec::to(shift_y, duration_ms, ease)
                },
                now_ms,
            ));
        }
    }
    tokens
}

/// Restyle indicators so only `active` stands out.
pub fn style_indicators(
    set: &mut TweenSet,
    indicators: &[TargetHandle],
    active: usize,
    style: &IndicatorStyle,
    now_ms: f64,
) {
    for (i, handle) in indicators.iter().enumerate() {
        let (opacity, blur) = if i == active {
            (1.0, 0.0)
        } else {
            (style.inactive_opacity, style.inactive_blur)
        };
        set.start(
            TweenKey::new(handle, Property::Opacity),
            TweenSpec {
                from: StartFrom::Current { fallback: 1.0 },
                ..TweenSpec::to(opacity, style.duration_ms, Ease::Linear)
            },
            now_ms,
        );
        set.start(
            TweenKey::new(handle, Property::Blur),
            TweenSpec {
                from: StartFrom::Current { fallback: 0.0 },
                ..TweenSpec::to(blur, style.duration_ms, Ease::Linear)
            },
            now_ms,
        );
    }
}
