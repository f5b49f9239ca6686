//! Built-in option lists offered by the wizard.

use crate::error::{AlfError, Result};
use crate::plan::Standard;
use crate::policy::DefaultPolicy;
use crate::rubric::Rubric;
use crate::types::StandardFramework;
use crate::types::StandardFramework::{C3, CcssEla, CcssMath, Iste, Ngss};
use serde::Serialize;
use serde_json::json;

// ---------------------------------------------------------------------------
// Simple option tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub label: &'static str,
}

const fn entry(key: &'static str, label: &'static str) -> CatalogEntry {
    CatalogEntry { key, label }
}

pub const SUBJECTS: &[CatalogEntry] = &[
    entry("science", "Science"),
    entry("math", "Mathematics"),
    entry("ela", "English Language Arts"),
    entry("social_studies", "Social Studies"),
    entry("engineering", "Engineering and Design"),
    entry("computer_science", "Computer Science"),
    entry("art", "Visual Arts"),
    entry("music", "Music"),
    entry("health", "Health and Wellness"),
    entry("world_languages", "World Languages"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeBand {
    pub key: &'static str,
    pub label: &'static str,
    pub grades: &'static [&'static str],
}

pub const GRADE_BANDS: &[GradeBand] = &[
    GradeBand {
        key: "k-2",
        label: "Early elementary",
        grades: &["K", "1", "2"],
    },
    GradeBand {
        key: "3-5",
        label: "Upper elementary",
        grades: &["3", "4", "5"],
    },
    GradeBand {
        key: "6-8",
        label: "Middle school",
        grades: &["6", "7", "8"],
    },
    GradeBand {
        key: "9-12",
        label: "High school",
        grades: &["9", "10", "11", "12"],
    },
];

pub const TECHNOLOGY: &[CatalogEntry] = &[
    entry("chromebooks", "Chromebooks (1:1)"),
    entry("shared_laptops", "Shared laptop cart"),
    entry("tablets", "Tablets"),
    entry("projector", "Projector or display"),
    entry("3d_printer", "3D printer"),
    entry("microcontrollers", "Microcontroller kits"),
    entry("cameras", "Cameras or video recorders"),
    entry("sensors", "Data-logging sensors"),
];

pub const MATERIALS: &[CatalogEntry] = &[
    entry("cardboard", "Cardboard and tape"),
    entry("art_supplies", "Art supplies"),
    entry("lab_equipment", "Basic lab equipment"),
    entry("hand_tools", "Hand tools"),
    entry("chart_paper", "Chart paper and markers"),
    entry("library", "Library or book collection"),
    entry("outdoor_space", "Outdoor space or garden"),
];

/// Find a grade band containing `grade` (e.g. `"7"` or `"K"`).
pub fn grade_band_for(grade: &str) -> Option<&'static GradeBand> {
    let grade = grade.trim();
    GRADE_BANDS
        .iter()
        .find(|b| b.grades.iter().any(|g| g.eq_ignore_ascii_case(grade)))
}

// ---------------------------------------------------------------------------
// Rubric templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RubricTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub scale_label: &'static str,
    pub criteria: &'static [&'static str],
}

pub const RUBRIC_TEMPLATES: &[RubricTemplate] = &[
    RubricTemplate {
        key: "presentation",
        name: "Public presentation",
        scale_label: "1-4",
        criteria: &["Content knowledge", "Organization", "Delivery", "Audience engagement"],
    },
    RubricTemplate {
        key: "collaboration",
        name: "Collaboration",
        scale_label: "1-4",
        criteria: &["Shared responsibility", "Contributing ideas", "Resolving disagreement"],
    },
    RubricTemplate {
        key: "design_process",
        name: "Design process",
        scale_label: "1-5",
        criteria: &["Defining the problem", "Prototyping", "Testing and iteration", "Reflection"],
    },
    RubricTemplate {
        key: "research",
        name: "Research and inquiry",
        scale_label: "1-3",
        criteria: &["Asking questions", "Evaluating sources", "Drawing conclusions"],
    },
];

impl RubricTemplate {
    /// A normalised rubric with fresh ids and the scale's default levels.
    pub fn instantiate(&self) -> Rubric {
        let criteria: Vec<_> = self.criteria.iter().map(|name| json!({ "name": name })).collect();
        Rubric::from_value(&json!({
            "name": self.name,
            "scaleLabel": self.scale_label,
            "criteria": criteria,
        }))
    }
}

pub fn rubric_template(key: &str) -> Result<&'static RubricTemplate> {
    RUBRIC_TEMPLATES
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| AlfError::UnknownTemplate(key.to_string()))
}

// ---------------------------------------------------------------------------
// Standards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StandardEntry {
    pub framework: StandardFramework,
    pub code: &'static str,
    pub label: &'static str,
}

const fn std_entry(
    framework: StandardFramework,
    code: &'static str,
    label: &'static str,
) -> StandardEntry {
    StandardEntry {
        framework,
        code,
        label,
    }
}

pub const STANDARDS: &[StandardEntry] = &[
    std_entry(Ngss, "5-ESS3-1", "Communities protecting Earth's resources and environment"),
    std_entry(Ngss, "MS-LS2-1", "Resource availability and its effect on populations"),
    std_entry(Ngss, "MS-ESS3-3", "Design a method to monitor and minimize human impact"),
    std_entry(Ngss, "MS-PS3-3", "Design a device that minimizes or maximizes thermal energy transfer"),
    std_entry(Ngss, "MS-ETS1-1", "Define criteria and constraints of a design problem"),
    std_entry(Ngss, "HS-ESS3-4", "Evaluate solutions that reduce human impact on natural systems"),
    std_entry(CcssMath, "6.SP.B.5", "Summarize numerical data sets in relation to their context"),
    std_entry(CcssMath, "7.RP.A.2", "Recognize and represent proportional relationships"),
    std_entry(CcssMath, "7.SP.B.4", "Use measures of center and variability to compare populations"),
    std_entry(CcssMath, "HSS-ID.B.6", "Represent data on two quantitative variables on a scatter plot"),
    std_entry(CcssEla, "W.7.1", "Write arguments to support claims with clear reasons"),
    std_entry(CcssEla, "W.7.7", "Conduct short research projects to answer a question"),
    std_entry(CcssEla, "SL.7.4", "Present claims and findings with pertinent evidence"),
    std_entry(CcssEla, "RI.7.7", "Compare a text to an audio, video or multimedia version"),
    std_entry(C3, "D2.Geo.2.6-8", "Use maps to explain relationships between locations"),
    std_entry(C3, "D2.Civ.10.6-8", "Explain the relevance of personal interests to public issues"),
    std_entry(C3, "D4.7.6-8", "Assess options for action to address local problems"),
    std_entry(Iste, "1.1", "Empowered Learner"),
    std_entry(Iste, "1.3", "Knowledge Constructor"),
    std_entry(Iste, "1.4", "Innovative Designer"),
    std_entry(Iste, "1.6", "Creative Communicator"),
    std_entry(Iste, "1.7", "Global Collaborator"),
];

impl StandardEntry {
    /// Normalised [`Standard`] for this entry with policy defaults.
    pub fn to_standard(&self, policy: &DefaultPolicy) -> Standard {
        Standard::from_value(
            &json!({
                "framework": self.framework.as_str(),
                "code": self.code,
                "label": self.label,
            }),
            policy,
        )
    }
}

/// Case-insensitive substring search over code and label, optionally
/// restricted to one framework. An empty query matches everything.
pub fn search_standards(
    framework: Option<StandardFramework>,
    query: &str,
) -> Vec<&'static StandardEntry> {
    let needle = query.trim().to_lowercase();
    STANDARDS
        .iter()
        .filter(|s| framework.map_or(true, |f| s.framework == f))
        .filter(|s| {
            needle.is_empty()
                || s.code.to_lowercase().contains(&needle)
                || s.label.to_lowercase().contains(&needle)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
