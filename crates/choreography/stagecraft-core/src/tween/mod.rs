//! Tween runs keyed by `(target, property)` with last-writer-wins cancellation.
//!
//! Starting a run on a key that already has one replaces it: the old run's token
//! stops being live before the new run writes anything, so two writers never
//! compete for one property. Runs advance only inside `TweenSet::step`, once per
//! frame.

pub mod counter;
pub mod fade;
pub mod path_draw;

use hashbrown::HashMap;

use crate::binding::TargetHandle;
use crate::ids::{CancelToken, IdAllocator};
use crate::interp::functions::{lerp_f32, yoyo_phase};
use crate::interp::Ease;
use crate::outputs::Outputs;
use crate::value::{Property, Value};

use self::counter::CounterState;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TweenKey {
    pub target: TargetHandle,
    pub property: Property,
}

impl TweenKey {
    pub fn new(target: &str, property: Property) -> Self {
        Self {
            target: target.to_string(),
            property,
        }
    }
}

/// Start value of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StartFrom {
    Value(f32),
    /// Continue from the last value written to the key, or `fallback` if none.
    Current { fallback: f32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Repeat {
    Once,
    /// Bounce between `from` and `to` until cancelled; never completes.
    YoyoForever,
}

/// How the interpolated number is written.
#[derive(Clone, Debug, PartialEq)]
pub enum Render {
    Scalar,
    Counter(CounterState),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TweenSpec {
    pub from: StartFrom,
    pub to: f32,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub ease: Ease,
    pub repeat: Repeat,
    pub render: Render,
}

impl TweenSpec {
    pub fn to(to: f32, duration_ms: f64, ease: Ease) -> Self {
        Self {
            from: StartFrom::Current { fallback: to },
            to,
            duration_ms,
            delay_ms: 0.0,
            ease,
            repeat: Repeat::Once,
            render: Render::Scalar,
        }
    }

    pub fn from_to(from: f32, to: f32, duration_ms: f64, ease: Ease) -> Self {
        Self {
            from: StartFrom::Value(from),
            ..Self::to(to, duration_ms, ease)
        }
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_render(mut self, render: Render) -> Self {
        self.render = render;
        self
    }
}

#[derive(Clone, Debug)]
struct Run {
    key: TweenKey,
    token: CancelToken,
    from: f32,
    start_ms: f64,
    primed: bool,
    spec: TweenSpec,
}

/// A run that reached its end this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub key: TweenKey,
    pub token: CancelToken,
}

#[derive(Debug, Default)]
pub struct TweenSet {
    ids: IdAllocator,
    // Insertion-ordered so writes within a frame are deterministic.
    runs: Vec<Run>,
    last: HashMap<TweenKey, f32>,
}

impl TweenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run, cancelling any live run on the same key first.
    pub fn start(&mut self, key: TweenKey, spec: TweenSpec, now_ms: f64) -> CancelToken {
        self.cancel(&key);
        let token = self.ids.alloc_token();
        let from = match spec.from {
            StartFrom::Value(v) => v,
            StartFrom::Current { fallback } => self.last.get(&key).copied().unwrap_or(fallback),
        };
        self.runs.push(Run {
            key,
            token,
            from,
            start_ms: now_ms,
            primed: false,
            spec,
        });
        token
    }

    pub fn cancel(&mut self, key: &TweenKey) {
        self.runs.retain(|r| &r.key != key);
    }

    pub fn cancel_target(&mut self, target: &str) {
        self.runs.retain(|r| r.key.target != target);
    }

    /// Drop every live run (section teardown). Written values are kept.
    pub fn cancel_all(&mut self) {
        self.runs.clear();
    }

    pub fn is_live(&self, token: CancelToken) -> bool {
        self.runs.iter().any(|r| r.token == token)
    }

    pub fn any_live(&self, tokens: &[CancelToken]) -> bool {
        tokens.iter().any(|t| self.is_live(*t))
    }

    pub fn live_count(&self) -> usize {
        self.runs.len()
    }

    /// Last numeric value written to `key`.
    pub fn current(&self, key: &TweenKey) -> Option<f32> {
        self.last.get(key).copied()
    }

    /// Record a value written outside of a run (instant sets), so later runs
    /// starting from `StartFrom::Current` continue from it.
    pub fn note(&mut self, key: TweenKey, value: f32) {
        self.last.insert(key, value);
    }

    /// Advance all runs to `now_ms`, writing changed values to `out`.
    pub fn step(&mut self, now_ms: f64, out: &mut Outputs) -> Vec<Completion> {
        let mut done = Vec::new();
        for run in self.runs.iter_mut() {
            let elapsed = now_ms - run.start_ms - run.spec.delay_ms;
            if elapsed < 0.0 {
                if !run.primed {
                    run.primed = true;
                    let from = run.from;
                    write(&mut self.last, out, run, from, false);
                }
                continue;
            }
            run.primed = true;
            let (value, finished) = match run.spec.repeat {
                Repeat::Once => {
                    let t = if run.spec.duration_ms <= 0.0 {
                        1.0
                    } else {
                        (elapsed / run.spec.duration_ms).min(1.0) as f32
                    };
                    if t >= 1.0 {
                        (run.spec.to, true)
                    } else {
                        (lerp_f32(run.from, run.spec.to, run.spec.ease.apply(t)), false)
                    }
                }
                Repeat::YoyoForever => {
                    let phase = yoyo_phase(elapsed, run.spec.duration_ms);
                    (
                        lerp_f32(run.from, run.spec.to, run.spec.ease.apply(phase)),
                        false,
                    )
                }
            };
            write(&mut self.last, out, run, value, finished);
            if finished {
                done.push(Completion {
                    key: run.key.clone(),
                    token: run.token,
                });
            }
        }
        if !done.is_empty() {
            self.runs.retain(|r| !done.iter().any(|c| c.token == r.token));
        }
        done
    }
}

fn write(
    last: &mut HashMap<TweenKey, f32>,
    out: &mut Outputs,
    run: &mut Run,
    value: f32,
    finished: bool,
) {
    let unchanged = last.get(&run.key).is_some_and(|prev| *prev == value);
    last.insert(run.key.clone(), value);
    match &mut run.spec.render {
        Render::Scalar => {
            if !unchanged || finished {
                out.write(&run.key.target, run.key.property.clone(), Value::Scalar(value));
            }
        }
        Render::Counter(state) => {
            state.current = value as f64;
            let text = if finished {
                state.render_final()
            } else {
                state.render()
            };
            out.write(&run.key.target, run.key.property.clone(), Value::Text(text));
        }
    }
}
