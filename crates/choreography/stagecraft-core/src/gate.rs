//! Viewport-width gate for pinned bindings.

/// What the owner must do after a width change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateAction {
    None,
    /// Tear the pinned binding down.
    Destroy,
    /// (Re)establish the pinned binding.
    Create,
}

/// Tracks whether the pinned binding should exist at the current width.
///
/// Widths at or below the breakpoint disable the binding. Repeated evaluations
/// that do not cross the breakpoint return `GateAction::None`.
#[derive(Debug, Clone)]
pub struct ResponsiveGate {
    breakpoint: f64,
    active: Option<bool>,
}

impl ResponsiveGate {
    pub fn new(breakpoint: f64) -> Self {
        Self {
            breakpoint,
            active: None,
        }
    }

    pub fn breakpoint(&self) -> f64 {
        self.breakpoint
    }

    /// `None` until the first evaluation.
    pub fn is_active(&self) -> Option<bool> {
        self.active
    }

    pub fn evaluate(&mut self, viewport_width: f64) -> GateAction {
        let want = viewport_width > self.breakpoint;
        let action = match (self.active, want) {
            (Some(a), w) if a == w => GateAction::None,
            (None, false) => GateAction::None,
            (_, true) => GateAction::Create,
            (Some(true), false) => GateAction::Destroy,
            (Some(false), false) => GateAction::None,
        };
        self.active = Some(want);
        if action != GateAction::None {
            log::debug!("responsive gate at width {viewport_width}: {action:?}");
        }
        action
    }

    /// Forget the last decision so the next evaluation starts fresh.
    pub fn reset(&mut self) {
        self.active = None;
    }
}
