//! Keyword heuristics over syllabus text.

use serde::{Deserialize, Serialize};

/// Entries kept per section.
pub const MAX_SECTION_ENTRIES: usize = 20;

/// Characters of the source kept in `raw_content`.
pub const RAW_CONTENT_CHARS: usize = 2000;

/// Sections recognized in a syllabus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Topics,
    Prerequisites,
    LearningOutcomes,
    Schedule,
}

impl Section {
    /// Keywords per section, checked in order. The first section with a
    /// matching keyword wins.
    const KEYWORDS: &'static [(Section, &'static [&'static str])] = &[
        (
            Section::Topics,
            &["topics", "outline", "content", "syllabus", "curriculum"],
        ),
        (
            Section::Prerequisites,
            &["prerequisites", "requirements", "required"],
        ),
        (
            Section::LearningOutcomes,
            &["outcomes", "objectives", "goals", "learning"],
        ),
        (
            Section::Schedule,
            &["schedule", "timeline", "week", "module", "unit"],
        ),
    ];

    fn detect(line_lower: &str) -> Option<Self> {
        Self::KEYWORDS
            .iter()
            .find(|(_, keys)| keys.iter().any(|key| line_lower.contains(key)))
            .map(|(section, _)| *section)
    }
}

/// Sections pulled out of a syllabus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyllabusStructure {
    pub topics: Vec<String>,
    pub prerequisites: Vec<String>,
    pub learning_outcomes: Vec<String>,
    pub schedule: Vec<String>,
    pub raw_content: String,
}

impl SyllabusStructure {
    fn section_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::Topics => &mut self.topics,
            Section::Prerequisites => &mut self.prerequisites,
            Section::LearningOutcomes => &mut self.learning_outcomes,
            Section::Schedule => &mut self.schedule,
        }
    }
}

/// Split syllabus text into keyword sections.
///
/// A line containing a section keyword switches the current section and is
/// itself recorded. Non-blank lines are appended to the current section
/// without duplicates; each section keeps at most [`MAX_SECTION_ENTRIES`].
pub fn parse_syllabus_structure(content: &str) -> SyllabusStructure {
    let mut structure = SyllabusStructure {
        raw_content: content.chars().take(RAW_CONTENT_CHARS).collect(),
        ..Default::default()
    };

    let mut current = None;
    for line in content.split('\n') {
        let trimmed = line.trim();
        if let Some(section) = Section::detect(&trimmed.to_lowercase()) {
            current = Some(section);
        }

        let Some(section) = current else { continue };
        if trimmed.is_empty() {
            continue;
        }

        let entries = structure.section_mut(section);
        if !entries.iter().any(|entry| entry == trimmed) {
            entries.push(trimmed.to_string());
        }
    }

    for section in [
        &mut structure.topics,
        &mut structure.prerequisites,
        &mut structure.learning_outcomes,
        &mut structure.schedule,
    ] {
        section.truncate(MAX_SECTION_ENTRIES);
    }

    structure
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_detected() {
        let text = "Intro to Deep Nets\n\
                    Course Outline\n\
                    Neural networks\n\
                    \n\
                    Prerequisites\n\
                    Linear algebra\n\
                    Objectives\n\
                    Train a CNN\n\
                    Schedule\n\
                    Week 1: MLPs\n";
        let structure = parse_syllabus_structure(text);

        // Lines before the first keyword are skipped
        assert_eq!(structure.topics, vec!["Course Outline", "Neural networks"]);
        assert_eq!(structure.prerequisites, vec!["Prerequisites", "Linear algebra"]);
        assert_eq!(structure.learning_outcomes, vec!["Objectives", "Train a CNN"]);
        assert_eq!(structure.schedule, vec!["Schedule", "Week 1: MLPs"]);
    }

    #[test]
    fn test_first_matching_section_wins() {
        // "learning" and "week" both appear; outcomes come before schedule
        let structure = parse_syllabus_structure("Learning goals for week 3");
        assert_eq!(structure.learning_outcomes, vec!["Learning goals for week 3"]);
        assert!(structure.schedule.is_empty());
    }

    #[test]
    fn test_duplicates_dropped_and_capped() {
        let mut text = String::from("Topics\nrepeat\nrepeat\n");
        for i in 0..30 {
            text.push_str(&format!("item {}\n", i));
        }
        let structure = parse_syllabus_structure(&text);
        assert_eq!(structure.topics.len(), MAX_SECTION_ENTRIES);
        assert_eq!(
            structure.topics.iter().filter(|t| *t == "repeat").count(),
            1
        );
    }

    #[test]
    fn test_raw_content_is_prefix() {
        let text = "é".repeat(3000);
        let structure = parse_syllabus_structure(&text);
        assert_eq!(structure.raw_content.chars().count(), RAW_CONTENT_CHARS);

        let short = parse_syllabus_structure("tiny");
        assert_eq!(short.raw_content, "tiny");
    }
}
