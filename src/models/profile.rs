use std::collections::BTreeSet;

/// Seniority tiers in ascending order. `NotSpecified` sits outside the
/// ordering and is handled separately by the experience-match signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    Internship,
    EntryLevel,
    MidLevel,
    Senior,
    Lead,
    NotSpecified,
}

impl ExperienceLevel {
    /// Full span between the lowest and highest tier.
    pub const MAX_TIER_SPAN: u32 = 4;

    /// Ordinal position within the tier order; `None` for `NotSpecified`.
    pub fn ordinal(self) -> Option<u32> {
        match self {
            ExperienceLevel::Internship => Some(0),
            ExperienceLevel::EntryLevel => Some(1),
            ExperienceLevel::MidLevel => Some(2),
            ExperienceLevel::Senior => Some(3),
            ExperienceLevel::Lead => Some(4),
            ExperienceLevel::NotSpecified => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "internship",
            ExperienceLevel::EntryLevel => "entry-level",
            ExperienceLevel::MidLevel => "mid-level",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::NotSpecified => "not specified",
        }
    }
}

/// Features derived from one free-text document (a resume or a job
/// description). Produced fresh per text and never cached across texts.
#[derive(Debug, Clone)]
pub struct ParsedProfile {
    pub skills: BTreeSet<String>,
    pub experience_level: ExperienceLevel,
    pub normalized_text: String,
}
