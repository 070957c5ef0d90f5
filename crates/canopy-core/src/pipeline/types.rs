use crate::composite::CompositeImage;
use crate::detection::AlertMask;
use crate::display::DisplayHints;
use crate::region::Region;

use super::summary::AlertSummary;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    ResolvingRegion,
    Fetching,
    Compositing,
    Classifying,
    Eroding,
    FilteringPatches,
    Summarizing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validating => write!(f, "Validating config"),
            Self::ResolvingRegion => write!(f, "Resolving region"),
            Self::Fetching => write!(f, "Fetching scenes"),
            Self::Compositing => write!(f, "Compositing"),
            Self::Classifying => write!(f, "Classifying change"),
            Self::Eroding => write!(f, "Eroding"),
            Self::FilteringPatches => write!(f, "Filtering patches"),
            Self::Summarizing => write!(f, "Summarizing"),
        }
    }
}

/// Everything handed to the visualization collaborator after a run.
#[derive(Clone, Debug)]
pub struct AnalysisOutput {
    pub region: Region,
    pub baseline: CompositeImage,
    pub current: CompositeImage,
    pub alerts: AlertMask,
    pub summary: AlertSummary,
    pub hints: DisplayHints,
}

impl AnalysisOutput {
    /// True if either window produced no usable data, so the (all-false)
    /// alert mask reflects missing data rather than absence of change.
    pub fn is_no_data(&self) -> bool {
        self.baseline.is_no_data() || self.current.is_no_data()
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., scene count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_analysis` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
