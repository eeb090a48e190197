/// Everything that can stop a fetch cycle short of a rendered analysis.
///
/// The `Display` text is what the error view shows, so it is kept user-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// The profile backend answered but had no usable loan application.
    #[error("No loan application data found")]
    ProfileUnavailable,
    /// The request could not complete, or the backend answered with something unusable.
    #[error("{0}")]
    Transport(String),
    /// The analysis service answered with a non-2xx status.
    #[error("Failed to fetch analysis")]
    AnalysisRequestFailed,
    /// The analysis service answered 2xx with a body that is not `{ "message": string }`.
    #[error("{0}")]
    AnalysisParse(String),
}

impl FlowError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}
