//! The single entry point for stage changes.
//!
//! ```text
//! Idle --request--> FadingOut --fades done--> Mutating --> FadingIn --fades done--> Idle
//! ```
//!
//! Content is only ever swapped in `Mutating`, in one batch, while every faded
//! element is invisible. A request arriving mid-transition retargets it: during
//! `FadingOut` the fade restarts from the current opacity toward the newest
//! target, and during `FadingIn` the elements fade back out from wherever they
//! are. Mutations never interleave, so two quick requests produce one swap.

use crate::binding::{BindingTable, TargetHandle};
use crate::ids::CancelToken;
use crate::inputs::{AdvanceRequest, AdvanceSource};
use crate::outputs::{CoreEvent, Outputs};
use crate::registry::RegistryHandle;
use crate::tween::fade::{fade_in, fade_out, style_indicators, FadeSpec, IndicatorStyle};
use crate::tween::{TweenKey, TweenSet};
use crate::value::{Property, Value};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FadingOut { target: usize },
    /// Transient; observable only inside a single `on_frame` call.
    Mutating { target: usize },
    FadingIn { target: usize },
}

/// Elements a switcher writes to.
#[derive(Clone, Debug, Default)]
pub struct SwitcherBindings {
    pub fields: BindingTable,
    /// Faded around the swap; the field elements when empty.
    pub fade_targets: Vec<TargetHandle>,
    pub indicators: Vec<TargetHandle>,
    pub images: Vec<TargetHandle>,
    pub indicator_style: Option<IndicatorStyle>,
    pub fade: FadeSpec,
    pub active_class: String,
}

impl SwitcherBindings {
    fn fade_base(&self) -> Vec<TargetHandle> {
        if self.fade_targets.is_empty() {
            self.fields.handles().cloned().collect()
        } else {
            self.fade_targets.clone()
        }
    }

    /// Fade targets plus the indicator/image entries of the given stages.
    fn fade_set(&self, stages: &[Option<usize>]) -> Vec<TargetHandle> {
        let mut set = self.fade_base();
        let mut push = |h: &TargetHandle| {
            if !set.contains(h) {
                set.push(h.clone());
            }
        };
        for index in stages.iter().flatten() {
            if self.indicator_style.is_none() {
                if let Some(h) = self.indicators.get(*index) {
                    push(h);
                }
            }
            if let Some(h) = self.images.get(*index) {
                push(h);
            }
        }
        set
    }

    pub fn handles(&self) -> Vec<TargetHandle> {
        let mut all: Vec<TargetHandle> = self.fields.handles().cloned().collect();
        all.extend(self.fade_targets.iter().cloned());
        all.extend(self.indicators.iter().cloned());
        all.extend(self.images.iter().cloned());
        all
    }
}

#[derive(Debug)]
pub struct StageSwitcher {
    registry: RegistryHandle,
    bindings: SwitcherBindings,
    phase: Phase,
    tokens: Vec<CancelToken>,
    // Stage whose content the fields show.
    rendered: Option<usize>,
    // Stage the last completed transition settled on.
    current: Option<usize>,
    mutations: usize,
}

impl StageSwitcher {
    pub fn new(registry: RegistryHandle, bindings: SwitcherBindings) -> Self {
        Self {
            registry,
            bindings,
            phase: Phase::Idle,
            tokens: Vec::new(),
            rendered: None,
            current: None,
            mutations: 0,
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn bindings(&self) -> &SwitcherBindings {
        &self.bindings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn rendered_index(&self) -> Option<usize> {
        self.rendered
    }

    /// Number of content swaps performed so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Where the section is heading: the pending target while busy, else current.
    pub fn effective_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Idle => self.current,
            Phase::FadingOut { target } | Phase::Mutating { target } | Phase::FadingIn { target } => {
                Some(target)
            }
        }
    }

    /// Consume one advance request. Returns the accepted (wrapped) target, or
    /// `None` when the request is a no-op.
    pub fn request(
        &mut self,
        req: AdvanceRequest,
        set: &mut TweenSet,
        now_ms: f64,
        out: &mut Outputs,
    ) -> Option<usize> {
        let target = self.registry.resolve(req.target);
        if Some(target) == self.effective_index() {
            return None;
        }
        out.push_event(CoreEvent::AdvanceRequested {
            target,
            source: req.source,
        });
        log::debug!("advance to {target} ({:?}) in {:?}", req.source, self.phase);

        if let Some(style) = &self.bindings.indicator_style {
            style_indicators(set, &self.bindings.indicators, target, style, now_ms);
        }

        if self.rendered.is_none() || req.source == AdvanceSource::Bind {
            self.render_now(target, set, out);
            return Some(target);
        }

        match self.phase {
            Phase::FadingOut { .. } if Some(target) == self.rendered => {
                // still showing this stage: turn around without swapping
                let handles = self.bindings.fade_set(&[self.rendered]);
                self.tokens = fade_in(set, &handles, &self.bindings.fade, now_ms);
                self.phase = Phase::FadingIn { target };
            }
            _ => {
                let handles = self.bindings.fade_set(&[self.rendered]);
                self.tokens = fade_out(set, &handles, &self.bindings.fade, now_ms);
                self.phase = Phase::FadingOut { target };
            }
        }
        Some(target)
    }

    /// Advance the phase machine after the frame's tweens have stepped.
    pub fn on_frame(&mut self, set: &mut TweenSet, now_ms: f64, out: &mut Outputs) {
        match self.phase {
            Phase::Idle | Phase::Mutating { .. } => {}
            Phase::FadingOut { target } => {
                if set.any_live(&self.tokens) {
                    return;
                }
                self.phase = Phase::Mutating { target };
                let previous = self.rendered;
                self.mutate(target, out);
                let handles = self.bindings.fade_set(&[previous, Some(target)]);
                self.tokens = fade_in(set, &handles, &self.bindings.fade, now_ms);
                self.phase = Phase::FadingIn { target };
            }
            Phase::FadingIn { target } => {
                if set.any_live(&self.tokens) {
                    return;
                }
                self.tokens.clear();
                self.current = Some(target);
                self.phase = Phase::Idle;
                out.push_event(CoreEvent::StageSettled { index: target });
            }
        }
    }

    /// Finish any transition instantly: swap if still needed, show everything.
    pub fn settle(&mut self, set: &mut TweenSet, out: &mut Outputs) {
        let target = match self.phase {
            Phase::Idle => return,
            Phase::FadingOut { target } | Phase::Mutating { target } | Phase::FadingIn { target } => {
                target
            }
        };
        if self.rendered != Some(target) {
            self.mutate(target, out);
        }
        let handles = self.bindings.fade_set(&[self.current, Some(target)]);
        for h in &handles {
            self.show(h, set, out);
        }
        self.tokens.clear();
        self.current = Some(target);
        self.phase = Phase::Idle;
        out.push_event(CoreEvent::StageSettled { index: target });
    }

    fn render_now(&mut self, target: usize, set: &mut TweenSet, out: &mut Outputs) {
        let handles = self.bindings.fade_set(&[self.rendered, Some(target)]);
        self.mutate(target, out);
        for h in &handles {
            self.show(h, set, out);
        }
        self.tokens.clear();
        self.current = Some(target);
        self.phase = Phase::Idle;
        out.push_event(CoreEvent::StageSettled { index: target });
    }

    fn show(&self, handle: &TargetHandle, set: &mut TweenSet, out: &mut Outputs) {
        let opacity = TweenKey::new(handle, Property::Opacity);
        set.cancel(&opacity);
        if set.current(&opacity).is_some_and(|v| v != 1.0) {
            out.write(handle, Property::Opacity, Value::Scalar(1.0));
        }
        set.note(opacity, 1.0);
        let y = TweenKey::new(handle, Property::TranslateY);
        if set.current(&y).is_some_and(|v| v != 0.0) {
            set.cancel(&y);
            out.write(handle, Property::TranslateY, Value::Scalar(0.0));
            set.note(y, 0.0);
        }
    }

    /// Write every field and state tag of `target` in one batch.
    fn mutate(&mut self, target: usize, out: &mut Outputs) {
        let Some(stage) = self.registry.get(target) else {
            return;
        };
        for row in &self.bindings.fields.rows {
            if let Some(content) = stage.content.get(&row.field) {
                out.write(&row.handle, Property::Content, content.to_value());
            }
        }
        let class = self.bindings.active_class.as_str();
        for (i, h) in self.bindings.indicators.iter().enumerate() {
            out.tag(h, class, i == target);
        }
        for (i, h) in self.bindings.images.iter().enumerate() {
            out.tag(h, class, i == target);
        }
        let from = self.rendered.unwrap_or(target);
        self.rendered = Some(target);
        self.mutations += 1;
        out.push_event(CoreEvent::StageMutated { from, to: target });
    }
}
