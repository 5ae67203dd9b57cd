pub mod metrics;
pub mod playback;

pub use metrics::{derive, DerivedMetrics, MetricsPolicy};
pub use playback::{PlaybackEngine, PlaybackFrame, PlaybackPhase, PlaybackState};
