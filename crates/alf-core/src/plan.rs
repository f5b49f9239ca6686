use crate::coerce::{
    enum_or, id_or_generate, opt_string, string_list, string_or, text_rows, tier_or,
    unit_interval_or,
};
use crate::policy::DefaultPolicy;
use crate::types::{EntityKind, StandardFramework, Tier};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A reference id that is absent, null, or blank is no reference at all.
fn reference(v: &Value, key: &str) -> Option<String> {
    opt_string(v, key).filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Standard
// ---------------------------------------------------------------------------

/// An aligned standard. `code` is the key within its framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    pub framework: StandardFramework,
    pub code: String,
    pub label: String,
    pub rationale: String,
    pub tier: Tier,
    pub confidence: f64,
}

impl Standard {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            framework: enum_or(
                v,
                "framework",
                StandardFramework::parse,
                StandardFramework::Custom,
            ),
            code: string_or(v, "code", ""),
            label: string_or(v, "label", ""),
            rationale: string_or(v, "rationale", ""),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Standard)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }

    /// Unique key across frameworks: `"{framework}:{code}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.framework, self.code)
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub goals: Vec<String>,
    pub tier: Tier,
    pub confidence: f64,
}

impl Phase {
    pub fn blank(policy: &DefaultPolicy) -> Self {
        Self::from_value(&Value::Null, policy)
    }

    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            id: id_or_generate(v, EntityKind::Phase.id_prefix()),
            name: string_or(v, "name", ""),
            description: string_or(v, "description", ""),
            start_date: string_or(v, "startDate", ""),
            end_date: string_or(v, "endDate", ""),
            goals: text_rows(v, "goals"),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Phase)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

// ---------------------------------------------------------------------------
// Milestone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    /// Soft reference into `phases`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    pub name: String,
    pub due_date: String,
    pub evidence: Vec<String>,
    pub owner: String,
    pub tier: Tier,
    pub confidence: f64,
}

impl Milestone {
    pub fn blank(policy: &DefaultPolicy) -> Self {
        Self::from_value(&Value::Null, policy)
    }

    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            id: id_or_generate(v, EntityKind::Milestone.id_prefix()),
            phase_id: reference(v, "phaseId"),
            name: string_or(v, "name", ""),
            due_date: string_or(v, "dueDate", ""),
            evidence: text_rows(v, "evidence"),
            owner: string_or(v, "owner", ""),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Milestone)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Soft reference into `milestones`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    /// Soft references into `rubrics`.
    pub rubric_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemplar: Option<String>,
    pub tier: Tier,
    pub confidence: f64,
}

impl Artifact {
    pub fn blank(policy: &DefaultPolicy) -> Self {
        Self::from_value(&Value::Null, policy)
    }

    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            id: id_or_generate(v, EntityKind::Artifact.id_prefix()),
            name: string_or(v, "name", ""),
            description: string_or(v, "description", ""),
            milestone_id: reference(v, "milestoneId"),
            rubric_ids: string_list(v, "rubricIds"),
            exemplar: opt_string(v, "exemplar"),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Artifact)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }

    pub fn is_assessed(&self) -> bool {
        !self.rubric_ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standard_unknown_framework_is_custom() {
        let s = Standard::from_value(
            &json!({"framework": "state-2019", "code": "SCI.1"}),
            &DefaultPolicy::default(),
        );
        assert_eq!(s.framework, StandardFramework::Custom);
        assert_eq!(s.key(), "custom:SCI.1");
        assert_eq!(s.tier, Tier::Core);
    }

    #[test]
    fn phase_defaults_use_core_tier() {
        let p = Phase::from_value(&json!({"tier": "bogus"}), &DefaultPolicy::default());
        assert_eq!(p.tier, Tier::Core);
        assert_eq!(p.goals, vec![String::new()]);
        assert!(p.id.starts_with("phase-"));
    }

    #[test]
    fn artifact_defaults_use_scaffold_tier() {
        let a = Artifact::from_value(&json!({"tier": 3}), &DefaultPolicy::default());
        assert_eq!(a.tier, Tier::Scaffold);
        assert!(a.rubric_ids.is_empty());
        assert!(!a.is_assessed());
    }

    #[test]
    fn blank_references_are_none() {
        let m = Milestone::from_value(&json!({"phaseId": "  "}), &DefaultPolicy::default());
        assert_eq!(m.phase_id, None);
        let a = Artifact::from_value(
            &json!({"milestoneId": "ms-1", "rubricIds": ["r1", "r1", "r2"]}),
            &DefaultPolicy::default(),
        );
        assert_eq!(a.milestone_id.as_deref(), Some("ms-1"));
        assert_eq!(a.rubric_ids, vec!["r1", "r2"]);
    }

    #[test]
    fn milestone_keeps_stored_id_and_evidence() {
        let m = Milestone::from_value(
            &json!({"id": "ms-keep", "evidence": ["photo log", "exit ticket"], "confidence": 0.9}),
            &DefaultPolicy::default(),
        );
        assert_eq!(m.id, "ms-keep");
        assert_eq!(m.evidence.len(), 2);
        assert_eq!(m.confidence, 0.9);
    }
}
