// Signal extraction from free text: normalization, skill phrase matching,
// and experience-tier detection.

use std::collections::BTreeSet;

use crate::models::profile::{ExperienceLevel, ParsedProfile};

/// Built-in skill lexicon, lowercase and punctuation-free except for the
/// symbols the normalizer preserves. Multi-word phrases are matched whole.
const SKILL_LEXICON: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "c++",
    "c#",
    "go",
    "rust",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "scala",
    "r",
    "matlab",
    "sql",
    "nosql",
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "elasticsearch",
    "html",
    "css",
    "react",
    "angular",
    "vue",
    "nextjs",
    "nodejs",
    "express",
    "django",
    "flask",
    "fastapi",
    "spring",
    "rails",
    "dotnet",
    "graphql",
    "rest",
    "grpc",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "terraform",
    "ansible",
    "jenkins",
    "git",
    "ci/cd",
    "linux",
    "bash",
    "machine learning",
    "deep learning",
    "data science",
    "data analysis",
    "data engineering",
    "natural language processing",
    "computer vision",
    "tensorflow",
    "pytorch",
    "keras",
    "scikit-learn",
    "pandas",
    "numpy",
    "spark",
    "hadoop",
    "kafka",
    "airflow",
    "tableau",
    "power bi",
    "excel",
    "statistics",
    "etl",
    "big data",
    "microservices",
    "distributed systems",
    "system design",
    "api design",
    "unit testing",
    "test automation",
    "selenium",
    "agile",
    "scrum",
    "jira",
    "project management",
    "product management",
    "communication",
    "leadership",
    "problem solving",
    "cybersecurity",
    "penetration testing",
    "network security",
    "cryptography",
    "blockchain",
    "ios",
    "android",
    "react native",
    "flutter",
    "embedded systems",
    "firmware",
    "devops",
    "sre",
    "observability",
    "prometheus",
    "grafana",
];

/// Keyword probes per tier, checked in order with internship first. Probes
/// are matched whole-word against the normalized text, so inflected forms
/// ("interns", "students") are listed explicitly.
const EXPERIENCE_PROBES: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Internship,
        &[
            "intern",
            "interns",
            "internship",
            "internships",
            "collegiate",
            "student",
            "students",
        ],
    ),
    (
        ExperienceLevel::EntryLevel,
        &["entry level", "junior", "new grad"],
    ),
    (ExperienceLevel::MidLevel, &["mid level", "3+ years"]),
    (ExperienceLevel::Senior, &["senior", "5+ years", "sr"]),
    (ExperienceLevel::Lead, &["lead", "staff", "principal"]),
];

/// Lowercase, replace punctuation with spaces (keeping `+` and `#` so
/// "c++" and "c#" survive), and collapse runs of whitespace.
pub fn preprocess_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for c in text.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_alphanumeric() || c == '+' || c == '#' || c == '/' || c == '-' {
            // Hyphenated terms split into words so "entry-level" matches
            // the "entry level" probe.
            if c == '-' || c == '/' {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            } else {
                out.push(c);
                last_was_space = false;
            }
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

fn contains_phrase(text: &str, phrase: &str) -> bool {
    let padded = format!(" {text} ");
    padded.contains(&format!(" {phrase} "))
}

fn extract_skills(normalized: &str) -> BTreeSet<String> {
    SKILL_LEXICON
        .iter()
        .filter(|skill| contains_phrase(normalized, &preprocess_text(skill)))
        .map(|skill| skill.to_string())
        .collect()
}

fn detect_experience_level(normalized: &str) -> ExperienceLevel {
    for (level, probes) in EXPERIENCE_PROBES {
        if probes.iter().any(|p| contains_phrase(normalized, p)) {
            return *level;
        }
    }
    ExperienceLevel::NotSpecified
}

/// Derive a profile from one free-text document. Never cached: the same
/// call on different texts must never see stale features.
pub fn parse_profile(text: &str) -> ParsedProfile {
    let normalized_text = preprocess_text(text);
    let skills = extract_skills(&normalized_text);
    let experience_level = detect_experience_level(&normalized_text);
    ParsedProfile {
        skills,
        experience_level,
        normalized_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_lowercases_and_collapses() {
        assert_eq!(
            preprocess_text("  Senior C++ / C# Engineer,  remote!  "),
            "senior c++ c# engineer remote"
        );
        assert_eq!(preprocess_text("entry-level dev"), "entry level dev");
    }

    #[test]
    fn extracts_known_skill_phrases() {
        let profile = parse_profile(
            "Built pipelines with Python, TensorFlow and machine learning on AWS.",
        );
        for skill in ["python", "tensorflow", "machine learning", "aws"] {
            assert!(profile.skills.contains(skill), "missing {skill}");
        }
        assert!(!profile.skills.contains("java"));
    }

    #[test]
    fn whole_word_matching_avoids_substrings() {
        // "r" the language must not match inside other words.
        let profile = parse_profile("Remarkable developer");
        assert!(!profile.skills.contains("r"));
    }

    #[test]
    fn detects_experience_tiers_with_internship_priority() {
        assert_eq!(
            parse_profile("Senior engineer mentoring interns").experience_level,
            ExperienceLevel::Internship
        );
        assert_eq!(
            parse_profile("Summer internships for students").experience_level,
            ExperienceLevel::Internship
        );
        assert_eq!(
            parse_profile("Senior backend engineer, 5+ years").experience_level,
            ExperienceLevel::Senior
        );
        assert_eq!(
            parse_profile("Junior developer position").experience_level,
            ExperienceLevel::EntryLevel
        );
        assert_eq!(
            parse_profile("Staff platform role").experience_level,
            ExperienceLevel::Lead
        );
        assert_eq!(
            parse_profile("A plain description").experience_level,
            ExperienceLevel::NotSpecified
        );
    }
}
