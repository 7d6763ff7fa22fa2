use serde::{Deserialize, Serialize};

use stagecraft_core::{Change, CoreEvent, Outputs, ProgressState};

/// A section event tagged with the section that raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEvent {
    pub section: String,
    pub event: CoreEvent,
}

/// Everything one page step produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFrame {
    pub epoch: u64,
    pub now_ms: f64,
    /// Property writes of every section, in section registration order.
    pub changes: Vec<Change>,
    pub events: Vec<PageEvent>,
    /// Progress emitted this frame, per section.
    pub progress: Vec<(String, ProgressState)>,
}

impl PageFrame {
    pub fn new(epoch: u64, now_ms: f64) -> Self {
        Self {
            epoch,
            now_ms,
            changes: Vec::new(),
            events: Vec::new(),
            progress: Vec::new(),
        }
    }

    pub fn merge(&mut self, section: &str, out: &Outputs) {
        self.changes.extend(out.changes.iter().cloned());
        self.events.extend(out.events.iter().map(|event| PageEvent {
            section: section.to_string(),
            event: event.clone(),
        }));
        if let Some(progress) = out.progress {
            self.progress.push((section.to_string(), progress));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Events raised by one section.
    pub fn events_of<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a CoreEvent> {
        self.events
            .iter()
            .filter(move |e| e.section == section)
            .map(|e| &e.event)
    }
}
