use crate::coerce::{
    collection, count_or, field, string_list, string_or, tier_or, unit_interval_or,
};
use crate::logistics::{
    CommunicationPlan, DifferentiationStrategy, EvidencePlan, ExhibitionPlan, RiskPlan,
};
use crate::plan::{Artifact, Milestone, Phase, Standard};
use crate::policy::DefaultPolicy;
use crate::rubric::Rubric;
use crate::types::{EntityKind, Tier};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ProjectContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub grade_level: String,
    pub subjects: Vec<String>,
    pub student_count: u32,
    pub time_window: String,
    pub cadence: String,
    pub available_tech: Vec<String>,
    pub available_materials: Vec<String>,
    pub constraints: Vec<String>,
    pub special_populations: String,
    pub classroom_policies: String,
    pub tier: Tier,
    pub confidence: f64,
}

impl ProjectContext {
    pub fn blank(policy: &DefaultPolicy) -> Self {
        Self::from_value(&Value::Null, policy)
    }

    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            grade_level: string_or(v, "gradeLevel", ""),
            subjects: string_list(v, "subjects"),
            student_count: count_or(v, "studentCount", 0),
            time_window: string_or(v, "timeWindow", ""),
            cadence: string_or(v, "cadence", ""),
            available_tech: string_list(v, "availableTech"),
            available_materials: string_list(v, "availableMaterials"),
            constraints: string_list(v, "constraints"),
            special_populations: string_or(v, "specialPopulations", ""),
            classroom_policies: string_or(v, "classroomPolicies", ""),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::ProjectContext)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

// ---------------------------------------------------------------------------
// WizardData
// ---------------------------------------------------------------------------

/// The record every wizard step writes into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_context: Option<ProjectContext>,
    #[serde(default)]
    pub big_idea: String,
    #[serde(default)]
    pub essential_question: String,
    #[serde(default)]
    pub motivation: String,
    #[serde(default)]
    pub learning_goals: Vec<String>,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub standards: Vec<Standard>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub rubrics: Vec<Rubric>,
    #[serde(default)]
    pub differentiation: Vec<DifferentiationStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_plan: Option<EvidencePlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communications: Option<CommunicationPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhibition: Option<ExhibitionPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_management: Option<RiskPlan>,
}

/// Non-blank strings in order; blanks and non-strings are dropped.
fn statements(v: &Value, key: &str) -> Vec<String> {
    match field(v, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// A nested plan is only present when the stored value is an object.
fn nested<T>(v: &Value, key: &str, normalize: impl FnOnce(&Value) -> T) -> Option<T> {
    match field(v, key) {
        Some(obj @ Value::Object(_)) => Some(normalize(obj)),
        _ => None,
    }
}

impl WizardData {
    /// Build a fully typed record from any JSON value. Never fails: fields that
    /// are missing or have the wrong shape take their defaults.
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            project_context: nested(v, "projectContext", |c| {
                ProjectContext::from_value(c, policy)
            }),
            big_idea: string_or(v, "bigIdea", ""),
            essential_question: string_or(v, "essentialQuestion", ""),
            motivation: string_or(v, "motivation", ""),
            learning_goals: statements(v, "learningGoals"),
            success_criteria: statements(v, "successCriteria"),
            standards: collection(v, "standards", |s| Standard::from_value(s, policy)),
            phases: collection(v, "phases", |p| Phase::from_value(p, policy)),
            milestones: collection(v, "milestones", |m| Milestone::from_value(m, policy)),
            artifacts: collection(v, "artifacts", |a| Artifact::from_value(a, policy)),
            rubrics: collection(v, "rubrics", Rubric::from_value),
            differentiation: collection(v, "differentiation", |d| {
                DifferentiationStrategy::from_value(d, policy)
            }),
            evidence_plan: nested(v, "evidencePlan", |e| EvidencePlan::from_value(e, policy)),
            communications: nested(v, "communications", |c| {
                CommunicationPlan::from_value(c, policy)
            }),
            exhibition: nested(v, "exhibition", |e| ExhibitionPlan::from_value(e, policy)),
            risk_management: nested(v, "riskManagement", |r| RiskPlan::from_value(r, policy)),
        }
    }

    /// Re-run normalization over an already typed record.
    pub fn normalized(&self, policy: &DefaultPolicy) -> Self {
        match serde_json::to_value(self) {
            Ok(v) => Self::from_value(&v, policy),
            Err(_) => self.clone(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn context(&self) -> Option<&ProjectContext> {
        self.project_context.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
