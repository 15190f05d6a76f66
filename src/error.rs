/// Fatal pipeline failures surfaced to the caller.
///
/// Per-item failures (one URL, one search query) and degraded stage results
/// never show up here; they are contained inside the stages and logged.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required input was empty before any stage ran.
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    /// The stage-transition budget was exhausted, which signals a structural
    /// problem in the stage graph rather than bad data.
    #[error("stage budget of {0} transitions exceeded")]
    BudgetExceeded(usize),
}
