//! Analysis lifecycle tracking.
//!
//! One [`tracker::AnalysisTracker`] per tracked DICOM file: it polls
//! the backend while a run is active, pulls the full result exactly
//! once per completed run, and exposes a snapshot the view projection
//! turns into a single render state. [`registry::TrackerRegistry`]
//! owns the trackers and maps HTTP activation/deactivation onto them.

pub mod registry;
pub mod tracker;
pub mod view;

pub use registry::TrackerRegistry;
pub use tracker::{AnalysisTracker, TrackerSnapshot};
pub use view::{ProgressPhase, ViewState};
