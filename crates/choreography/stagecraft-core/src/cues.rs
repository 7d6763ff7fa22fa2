//! Timeline cues resolved against a progress value.
//!
//! Stage cues are not replayed as callbacks. Instead the track answers "which
//! stage does progress `p` sit in" (the last stage cue at or before `p`), so a
//! scroll reversal lands on the earlier stage instead of re-running forward
//! transitions. Signal cues fire for every crossing, in traversal order.

use std::collections::BTreeMap;

use crate::data::{Cue, CueAction, CueAt};
use crate::error::ConfigError;
use crate::progress::Direction;

/// Resolve a timeline position to an offset in [0, 1].
pub fn resolve_at(
    at: &CueAt,
    labels: &BTreeMap<String, f32>,
    owner: &str,
) -> Result<f32, ConfigError> {
    let label = |name: &str| {
        labels
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownLabel {
                cue: owner.to_string(),
                label: name.to_string(),
            })
    };
    let offset = match at {
        CueAt::Offset(o) => *o,
        CueAt::Named(name) => label(name)?,
        CueAt::Relative { label: name, delta } => label(name)? + delta,
    };
    if !(0.0..=1.0).contains(&offset) || !offset.is_finite() {
        return Err(ConfigError::CueOutOfRange {
            cue: owner.to_string(),
            offset,
        });
    }
    Ok(offset)
}

#[derive(Clone, Debug, PartialEq)]
struct ResolvedCue {
    label: String,
    offset: f32,
    action: CueAction,
}

/// Result of moving the playhead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Crossing {
    /// Signal cues crossed, in the order they fire.
    pub signals: Vec<(String, Direction)>,
    /// New effective stage, when it changed.
    pub stage: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct CueTrack {
    // Sorted by offset; ties keep registration order.
    cues: Vec<ResolvedCue>,
    last: Option<f32>,
}

impl CueTrack {
    pub fn build(
        cues: &[Cue],
        labels: &BTreeMap<String, f32>,
        stage_count: usize,
    ) -> Result<Self, ConfigError> {
        let mut resolved = Vec::with_capacity(cues.len());
        for cue in cues {
            let offset = resolve_at(&cue.at, labels, &cue.label)?;
            if let CueAction::Stage(index) = cue.action {
                if index >= stage_count {
                    return Err(ConfigError::CueStageOutOfRange {
                        cue: cue.label.clone(),
                        index,
                        count: stage_count,
                    });
                }
            }
            resolved.push(ResolvedCue {
                label: cue.label.clone(),
                offset,
                action: cue.action.clone(),
            });
        }
        // stable: duplicates keep registration order
        resolved.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Ok(Self {
            cues: resolved,
            last: None,
        })
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Stage in effect at progress `p`: the last stage cue at or before `p`.
    pub fn stage_at(&self, p: f32) -> Option<usize> {
        self.cues
            .iter()
            .take_while(|c| c.offset <= p)
            .filter_map(|c| match c.action {
                CueAction::Stage(i) => Some(i),
                CueAction::Signal => None,
            })
            .last()
    }

    /// Move the playhead to `p` and report what was crossed.
    pub fn advance(&mut self, p: f32) -> Crossing {
        let prev = self.last.replace(p);
        let mut crossing = Crossing::default();
        match prev {
            None => {
                crossing.signals = self
                    .signals()
                    .filter(|c| c.offset <= p)
                    .map(|c| (c.label.clone(), Direction::Forward))
                    .collect();
                crossing.stage = self.stage_at(p);
            }
            Some(a) if p > a => {
                crossing.signals = self
                    .signals()
                    .filter(|c| c.offset > a && c.offset <= p)
                    .map(|c| (c.label.clone(), Direction::Forward))
                    .collect();
                crossing.stage = self.stage_at(p).filter(|s| Some(*s) != self.stage_at(a));
            }
            Some(a) if p < a => {
                crossing.signals = self
                    .signals()
                    .rev()
                    .filter(|c| c.offset > p && c.offset <= a)
                    .map(|c| (c.label.clone(), Direction::Backward))
                    .collect();
                crossing.stage = self.stage_at(p).filter(|s| Some(*s) != self.stage_at(a));
            }
            Some(_) => {}
        }
        crossing
    }

    /// Forget the playhead; the next `advance` behaves like the first one.
    pub fn reset(&mut self) {
        self.last = None;
    }

    fn signals(&self) -> impl DoubleEndedIterator<Item = &ResolvedCue> + '_ {
        self.cues
            .iter()
            .filter(|c| matches!(c.action, CueAction::Signal))
    }
}
