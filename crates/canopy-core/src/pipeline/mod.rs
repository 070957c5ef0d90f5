pub mod config;
mod orchestrator;
mod summary;
mod types;

pub use config::{
    validate_max_cloud_cover, validate_pixel_size, AnalysisRequest, Preset, SceneFilterConfig,
};
pub use orchestrator::{analysis_grid, run_analysis, run_analysis_reported};
pub use summary::{summarize, AlertSummary, ProtectedOverlap};
pub use types::{AnalysisOutput, PipelineStage, ProgressReporter};
