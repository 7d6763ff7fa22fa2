//! Ordered, immutable stage storage and the wrap policy.
//!
//! The wrap limit is the single source of truth for every index computation in a
//! section (autoplay, manual selection, cue targets): when the page exposes a
//! navigation indicator set, the limit is `min(stage_count, indicator_count)`;
//! otherwise it is the stage count. Indices at or beyond the limit wrap instead of
//! overrunning either array.

use std::sync::Arc;

use crate::data::Stage;
use crate::error::RegistryError;

pub struct StageRegistry;

impl StageRegistry {
    /// Validate and freeze a stage list.
    ///
    /// `indicator_count` is the number of resolved navigation indicators, or `None`
    /// when the section has none.
    pub fn register(
        stages: Vec<Stage>,
        indicator_count: Option<usize>,
    ) -> Result<RegistryHandle, RegistryError> {
        if stages.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (position, stage) in stages.iter().enumerate() {
            if stage.index != position {
                return Err(RegistryError::NonContiguous {
                    position,
                    index: stage.index,
                });
            }
            if let Some(g) = stage.gauge {
                if !(0.0..=100.0).contains(&g) {
                    return Err(RegistryError::GaugeOutOfRange {
                        index: stage.index,
                        value: g,
                    });
                }
            }
        }
        let indicator_count = indicator_count.filter(|n| *n > 0);
        if let Some(n) = indicator_count {
            if n != stages.len() {
                log::debug!(
                    "stage count {} differs from indicator count {}; wrapping at {}",
                    stages.len(),
                    n,
                    n.min(stages.len())
                );
            }
        }
        Ok(RegistryHandle {
            stages: stages.into(),
            indicator_count,
        })
    }
}

/// Cheap, cloneable read-only view over registered stages.
#[derive(Clone, Debug)]
pub struct RegistryHandle {
    stages: Arc<[Stage]>,
    indicator_count: Option<usize>,
}

impl RegistryHandle {
    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn indicator_count(&self) -> Option<usize> {
        self.indicator_count
    }

    /// Number of addressable stages after reconciling with the indicator count.
    pub fn limit(&self) -> usize {
        match self.indicator_count {
            Some(n) => n.min(self.stages.len()),
            None => self.stages.len(),
        }
    }

    /// Map any requested index (negative or past the end) onto `0..limit`.
    pub fn resolve(&self, requested: i64) -> usize {
        let limit = self.limit().max(1) as i64;
        requested.rem_euclid(limit) as usize
    }

    /// Index that follows `current` under the wrap policy.
    pub fn next_index(&self, current: usize) -> usize {
        next_index(current, self.limit())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }
}

/// `(current + 1) mod limit`, always in `0..limit` for `limit >= 1`.
#[inline]
pub fn next_index(current: usize, limit: usize) -> usize {
    if limit <= 1 {
        return 0;
    }
    (current % limit + 1) % limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages(n: usize) -> Vec<Stage> {
        (0..n)
            .map(|index| Stage {
                index,
                content: Default::default(),
                metrics: Vec::new(),
                gauge: None,
            })
            .collect()
    }

    #[test]
    fn rejects_gaps_and_empty() {
        assert!(matches!(
            StageRegistry::register(Vec::new(), None),
            Err(RegistryError::Empty)
        ));
        let mut s = stages(3);
        s[2].index = 5;
        assert!(matches!(
            StageRegistry::register(s, None),
            Err(RegistryError::NonContiguous {
                position: 2,
                index: 5
            })
        ));
    }

    #[test]
    fn limit_is_smaller_of_stage_and_indicator_counts() {
        let reg = StageRegistry::register(stages(4), Some(6)).unwrap();
        assert_eq!(reg.limit(), 4);
        let reg = StageRegistry::register(stages(4), Some(3)).unwrap();
        assert_eq!(reg.limit(), 3);
        assert_eq!(reg.resolve(3), 0);
        assert_eq!(reg.resolve(-1), 2);
        let reg = StageRegistry::register(stages(4), None).unwrap();
        assert_eq!(reg.limit(), 4);
        let reg = StageRegistry::register(stages(4), Some(0)).unwrap();
        assert_eq!(reg.limit(), 4);
    }

    #[test]
    fn next_index_wraps_for_every_limit() {
        for limit in 1..8 {
            for current in 0..limit {
                let n = next_index(current, limit);
                assert!(n < limit);
                if current == limit - 1 {
                    assert_eq!(n, 0);
                }
            }
        }
    }
}
