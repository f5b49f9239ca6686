use crate::error::AlfError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// WizardStep
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Subjects,
    Grade,
    Materials,
    Vision,
    Standards,
    Phases,
    Rubrics,
    Logistics,
    Review,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::Subjects,
            WizardStep::Grade,
            WizardStep::Materials,
            WizardStep::Vision,
            WizardStep::Standards,
            WizardStep::Phases,
            WizardStep::Rubrics,
            WizardStep::Logistics,
            WizardStep::Review,
        ]
    }

    pub fn first() -> WizardStep {
        WizardStep::Subjects
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<WizardStep> {
        WizardStep::all().get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<WizardStep> {
        self.index()
            .checked_sub(1)
            .and_then(|i| WizardStep::all().get(i).copied())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Subjects => "subjects",
            WizardStep::Grade => "grade",
            WizardStep::Materials => "materials",
            WizardStep::Vision => "vision",
            WizardStep::Standards => "standards",
            WizardStep::Phases => "phases",
            WizardStep::Rubrics => "rubrics",
            WizardStep::Logistics => "logistics",
            WizardStep::Review => "review",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Subjects => "Subject selection",
            WizardStep::Grade => "Age and grade",
            WizardStep::Materials => "Materials and time",
            WizardStep::Vision => "Vision and goals",
            WizardStep::Standards => "Standards alignment",
            WizardStep::Phases => "Phases and milestones",
            WizardStep::Rubrics => "Artifacts and rubrics",
            WizardStep::Logistics => "Logistics",
            WizardStep::Review => "Review and export",
        }
    }

    /// Top-level wizard record keys this step writes on submit.
    ///
    /// The first three steps each edit a slice of `projectContext`; their
    /// patches are merged field-by-field into that object.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            WizardStep::Subjects | WizardStep::Grade | WizardStep::Materials => {
                &["projectContext"]
            }
            WizardStep::Vision => &[
                "bigIdea",
                "essentialQuestion",
                "motivation",
                "learningGoals",
                "successCriteria",
            ],
            WizardStep::Standards => &["standards"],
            WizardStep::Phases => &["phases", "milestones"],
            WizardStep::Rubrics => &["artifacts", "rubrics"],
            WizardStep::Logistics => &[
                "differentiation",
                "evidencePlan",
                "communications",
                "exhibition",
                "riskManagement",
            ],
            WizardStep::Review => &[],
        }
    }

    /// The `projectContext` keys owned by the context steps.
    pub fn context_fields(self) -> &'static [&'static str] {
        match self {
            WizardStep::Subjects => &["subjects"],
            WizardStep::Grade => &[
                "gradeLevel",
                "studentCount",
                "specialPopulations",
                "classroomPolicies",
            ],
            WizardStep::Materials => &[
                "timeWindow",
                "cadence",
                "availableTech",
                "availableMaterials",
                "constraints",
                "tier",
                "confidence",
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WizardStep {
    type Err = AlfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WizardStep::all()
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| AlfError::UnknownStep(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
