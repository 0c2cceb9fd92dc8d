use crate::AnalysisRequest;

/// IO the shell performs on behalf of [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunAnalysis {
        request: AnalysisRequest,
        mode: AnalysisMode,
    },
    CancelAnalysis,
    FetchJob { url: String },
    LoadHistory { limit: usize },
    CheckHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// `/analyze/stream` with step-by-step progress.
    Streaming,
    /// `/analyze`, single response.
    Blocking,
}
