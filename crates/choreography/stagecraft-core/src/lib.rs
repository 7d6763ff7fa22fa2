//! Stagecraft core (host-agnostic)
//!
//! Drives multi-part narrative sections: a continuous driver (pinned scroll or
//! an autoplay timer) is mapped onto a few discrete stages, each stage swapping
//! content across several elements while continuous visuals (path draw-in,
//! counters, gauge arcs) animate alongside. The core never touches a document;
//! hosts resolve element references to handles and apply the returned `Outputs`.

pub mod autoplay;
pub mod binding;
pub mod choreographer;
pub mod config;
pub mod cues;
pub mod data;
pub mod error;
pub mod gate;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod outputs;
pub mod progress;
pub mod registry;
pub mod scrub;
pub mod side_channel;
pub mod switcher;
pub mod tween;
pub mod value;

// Re-exports for consumers (adapters)
pub use autoplay::{AutoplayScheduler, AutoplayState};
pub use binding::{ElementGroup, LayoutProbe, NoLayout, Rect, TargetHandle, TargetResolver};
pub use choreographer::Choreographer;
pub use config::{AutoplayConfig, ChartConfig, GaugeConfig, MetricsConfig, PinnedConfig, SectionConfig};
pub use cues::{CueTrack, Crossing};
pub use data::{Content, Cue, CueAction, CueAt, Metric, Stage};
pub use error::{BindError, ConfigError, RegistryError};
pub use gate::{GateAction, ResponsiveGate};
pub use ids::{CancelToken, IdAllocator};
pub use inputs::{AdvanceRequest, AdvanceSource, Interaction};
pub use interp::Ease;
pub use outputs::{Change, CoreEvent, Outputs};
pub use progress::{Direction, Extent, ProgressSource, ProgressState, SourceKind};
pub use registry::{RegistryHandle, StageRegistry};
pub use scrub::{ScrubKind, ScrubSpec};
pub use switcher::Phase;
pub use tween::counter::{CounterOrigin, CounterState, Precision};
pub use tween::{TweenKey, TweenSet, TweenSpec};
pub use value::{Property, Value};
