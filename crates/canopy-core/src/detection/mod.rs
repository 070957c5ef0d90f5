pub mod classify;
pub mod components;
pub mod config;
pub mod morphology;

pub use classify::{classify, classify_band};
pub use components::{filter_by_size, label_components, AlertMask, ComponentLabels, ComponentStats};
pub use config::{Connectivity, ThresholdConfig};
pub use morphology::erode;
