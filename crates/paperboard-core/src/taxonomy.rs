//! Fixed classification vocabularies: paper categories, research fields, and
//! the task list under each field.

use std::fmt;

/// Classification category. A paper may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Empirical,
    Survey,
    Benchmark,
    Technical,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Empirical,
            Category::Survey,
            Category::Benchmark,
            Category::Technical,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empirical => "Empirical",
            Self::Survey => "Survey",
            Self::Benchmark => "Benchmark",
            Self::Technical => "Technical",
        }
    }

    /// Case-insensitive parse of the display name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Research field. A paper has at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResearchField {
    RequirementsDesign,
    CodingAssistant,
    SoftwareTesting,
    AiOps,
    Maintenance,
    QualityManagement,
    VersionControl,
}

impl ResearchField {
    pub fn all() -> &'static [ResearchField] {
        &[
            ResearchField::RequirementsDesign,
            ResearchField::CodingAssistant,
            ResearchField::SoftwareTesting,
            ResearchField::AiOps,
            ResearchField::Maintenance,
            ResearchField::QualityManagement,
            ResearchField::VersionControl,
        ]
    }

    /// The exact string stored in the `field` key of a record.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequirementsDesign => "Requirements & Design",
            Self::CodingAssistant => "Coding Assistant",
            Self::SoftwareTesting => "Software Testing",
            Self::AiOps => "AIOps",
            Self::Maintenance => "Maintenance",
            Self::QualityManagement => "Quality Management",
            Self::VersionControl => "Version Control & Collaboration",
        }
    }

    /// Case-insensitive parse of the stored name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
    }

    /// Predefined tasks for this field, in display order.
    ///
    /// Spellings match the upstream data verbatim (including
    /// `"Specification &Validation"`), since task filtering is exact equality.
    pub fn tasks(self) -> &'static [&'static str] {
        match self {
            Self::RequirementsDesign => &[
                "Elicitation",
                "Analysis",
                "Specification &Validation",
                "Management",
            ],
            Self::CodingAssistant => &[
                "Code Pre-Training",
                "Code Instruction-Tuning",
                "Code Alignment",
                "Code Prompting",
                "Code Completion",
                "Code Summarization",
                "Code Editing",
                "Code Translation",
                "Code Reasoning",
                "Code Retrieval",
                "Code Understanding",
                "Code Performance Optimization",
                "Code Representation Learning",
            ],
            Self::SoftwareTesting => &[
                "Test Generation",
                "Assertion generation",
                "GUI test",
                "Testing automation",
                "Testing prediction",
                "Testing Repair",
            ],
            Self::AiOps => &["Log Statement Generation", "Log Parsing"],
            Self::Maintenance => &["Code Review", "Clone Detection", "Refactoring"],
            Self::QualityManagement => &[
                "Defect Prediction",
                "Bug Localization",
                "Bug Repair",
                "Vulnerability Detection",
                "Vulnerability Repair",
            ],
            Self::VersionControl => &["Git VCS"],
        }
    }
}

impl fmt::Display for ResearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
