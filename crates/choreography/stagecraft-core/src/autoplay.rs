//! Timer-driven auto-advance.
//!
//! The scheduler only decides *when* a tick is due; each tick becomes an
//! `AdvanceRequest` for `next_index(effective, limit)` and goes through the
//! switcher like any other request.

use crate::config::AutoplayConfig;
use crate::inputs::Interaction;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AutoplayState {
    Running { next_due_ms: f64 },
    Paused,
}

#[derive(Debug)]
pub struct AutoplayScheduler {
    interval_ms: f64,
    pause_on_hover: bool,
    state: AutoplayState,
    pointer_inside: bool,
    focus_inside: bool,
}

impl AutoplayScheduler {
    pub fn new(config: &AutoplayConfig) -> Self {
        Self {
            interval_ms: config.interval_ms.max(1.0),
            pause_on_hover: config.pause_on_hover,
            state: AutoplayState::Paused,
            pointer_inside: false,
            focus_inside: false,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn state(&self) -> AutoplayState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AutoplayState::Running { .. })
    }

    pub fn next_due(&self) -> Option<f64> {
        match self.state {
            AutoplayState::Running { next_due_ms } => Some(next_due_ms),
            AutoplayState::Paused => None,
        }
    }

    /// True while hover/focus holds the timer.
    pub fn is_held(&self) -> bool {
        self.pause_on_hover && (self.pointer_inside || self.focus_inside)
    }

    /// Arm the repeating timer; the first tick is one interval after `now_ms`.
    /// Does nothing while held by hover/focus.
    pub fn start(&mut self, now_ms: f64) {
        if self.is_held() {
            return;
        }
        self.state = AutoplayState::Running {
            next_due_ms: now_ms + self.interval_ms,
        };
    }

    pub fn pause(&mut self) {
        self.state = AutoplayState::Paused;
    }

    /// A manual selection happened: the next tick is measured from `now_ms`.
    /// A held timer stays paused and re-arms when the hold ends.
    pub fn on_manual_select(&mut self, now_ms: f64) {
        self.pause();
        self.start(now_ms);
    }

    /// Returns `Some(running)` when the interaction changed the timer state.
    pub fn on_interaction(&mut self, interaction: Interaction, now_ms: f64) -> Option<bool> {
        if !self.pause_on_hover {
            return None;
        }
        let was_held = self.is_held();
        match interaction {
            Interaction::PointerEnter => self.pointer_inside = true,
            Interaction::PointerLeave => self.pointer_inside = false,
            Interaction::FocusIn => self.focus_inside = true,
            Interaction::FocusOut => self.focus_inside = false,
        }
        match (was_held, self.is_held()) {
            (false, true) => {
                log::debug!("autoplay paused by {interaction:?}");
                self.pause();
                Some(false)
            }
            (true, false) => {
                log::debug!("autoplay resumed by {interaction:?}");
                self.start(now_ms);
                Some(true)
            }
            _ => None,
        }
    }

    /// Due tick times up to `now_ms`, in order. A slow frame may yield several.
    pub fn poll(&mut self, now_ms: f64) -> Vec<f64> {
        let mut due = Vec::new();
        while let AutoplayState::Running { next_due_ms } = self.state {
            if next_due_ms > now_ms {
                break;
            }
            due.push(next_due_ms);
            self.state = AutoplayState::Running {
                next_due_ms: next_due_ms + self.interval_ms,
            };
        }
        due
    }
}
