//! Input contracts: host interaction events and the advance-request bus.
//!
//! Every stage change, whatever its origin, becomes an `AdvanceRequest` queued on
//! the section and consumed only by the stage switcher.

use serde::{Deserialize, Serialize};

/// Pointer/focus transitions on the section root.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    PointerEnter,
    PointerLeave,
    FocusIn,
    FocusOut,
}

/// Who asked for a stage change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceSource {
    /// Initial render at bind time.
    Bind,
    /// A stage cue crossed by the progress source.
    Cue,
    /// Autoplay timer tick.
    Autoplay,
    /// User selection (navigation indicator click).
    Manual,
}

/// One queued "advance requested" event. `target` is unresolved; the wrap policy is
/// applied when the switcher consumes it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub target: i64,
    pub source: AdvanceSource,
}
