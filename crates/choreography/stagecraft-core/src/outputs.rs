//! Output contracts from a section.
//!
//! Outputs carry only the property writes for this frame, keyed by target handle,
//! and a separate list of semantic events. Hosts apply changes in order; all writes
//! of one frame belong together.

use serde::{Deserialize, Serialize};

use crate::binding::TargetHandle;
use crate::inputs::AdvanceSource;
use crate::progress::{Direction, ProgressState};
use crate::value::{Property, Value};

/// One property write.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Change {
    pub target: TargetHandle,
    pub property: Property,
    pub value: Value,
}

/// Discrete semantic signals emitted during a frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum CoreEvent {
    AdvanceRequested {
        target: usize,
        source: AdvanceSource,
    },
    /// Content fields were swapped in one batch.
    StageMutated {
        from: usize,
        to: usize,
    },
    /// Fade-in finished; `index` is now the current stage.
    StageSettled {
        index: usize,
    },
    CueFired {
        label: String,
        direction: Direction,
    },
    PinChanged {
        pinned: bool,
    },
    AutoplayTick {
        at_ms: f64,
    },
    BindingCreated,
    BindingDestroyed,
    /// A measurement was unavailable; the operation retries next frame.
    MeasurementDeferred {
        target: TargetHandle,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
    /// Latest progress emitted by the section's source this frame.
    #[serde(default)]
    pub progress: Option<ProgressState>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
        self.progress = None;
    }

    #[inline]
    pub fn write(&mut self, target: &str, property: Property, value: Value) {
        self.changes.push(Change {
            target: target.to_string(),
            property,
            value,
        });
    }

    #[inline]
    pub fn tag(&mut self, target: &str, class: &str, on: bool) {
        self.write(target, Property::class(class), Value::Flag(on));
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty() && self.progress.is_none()
    }

    /// Last value written to `(target, property)` this frame.
    pub fn last_value(&self, target: &str, property: &Property) -> Option<&Value> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.target == target && &c.property == property)
            .map(|c| &c.value)
    }
}
