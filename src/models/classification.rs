use serde::{Deserialize, Serialize};

/// Classification of a fetched page's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageClassification {
    /// A detailed description of a single job.
    JobDescription,
    /// A listing of multiple jobs with links to details.
    JobBoard,
    /// Anything else: company homepage, blog article, error page.
    Irrelevant,
}

/// Classification mode, a stage parameter rather than a job attribute.
///
/// `Strict` is used for URLs already known to come from a curated job-board
/// extraction step, where only `JobDescription` and `Irrelevant` make sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyMode {
    Broad,
    Strict,
}

impl PageClassification {
    /// Collapse answers the given mode rules out. Strict mode never reports
    /// a job board; such an answer degrades to `Irrelevant`.
    pub fn constrain(self, mode: ClassifyMode) -> PageClassification {
        match (mode, self) {
            (ClassifyMode::Strict, PageClassification::JobBoard) => PageClassification::Irrelevant,
            (_, classification) => classification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_mode_never_yields_a_job_board() {
        assert_eq!(
            PageClassification::JobBoard.constrain(ClassifyMode::Strict),
            PageClassification::Irrelevant
        );
        assert_eq!(
            PageClassification::JobBoard.constrain(ClassifyMode::Broad),
            PageClassification::JobBoard
        );
        assert_eq!(
            PageClassification::JobDescription.constrain(ClassifyMode::Strict),
            PageClassification::JobDescription
        );
        assert_eq!(
            PageClassification::Irrelevant.constrain(ClassifyMode::Strict),
            PageClassification::Irrelevant
        );
    }
}
