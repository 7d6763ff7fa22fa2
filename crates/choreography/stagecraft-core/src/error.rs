//! Setup-time errors. Runtime failures never surface; they degrade to "do nothing".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("stage registry is empty")]
    Empty,
    #[error("stage at position {position} has index {index}; indices must be contiguous from 0")]
    NonContiguous { position: usize, index: usize },
    #[error("stage {index} gauge value {value} is outside [0, 100]")]
    GaugeOutOfRange { index: usize, value: f32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("section config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cue '{cue}' references unknown timeline label '{label}'")]
    UnknownLabel { cue: String, label: String },
    #[error("cue '{cue}' resolves to offset {offset}, outside [0, 1]")]
    CueOutOfRange { cue: String, offset: f32 },
    #[error("cue '{cue}' targets stage {index} but only {count} stages exist")]
    CueStageOutOfRange {
        cue: String,
        index: usize,
        count: usize,
    },
    #[error("scrub on '{target}' has span [{start}, {end}], expected 0 <= start <= end <= 1")]
    InvalidScrubSpan { target: String, start: f32, end: f32 },
    #[error("autoplay interval must be positive")]
    ZeroInterval,
}

#[derive(Debug, Error)]
pub enum BindError {
    #[error("required element '{0}' is not present")]
    MissingElement(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
