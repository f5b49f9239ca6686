use crate::coerce::{
    enum_or, id_or_generate, opt_string, row_list, string_list, string_or, tier_or,
    unit_interval_or,
};
use crate::policy::DefaultPolicy;
use crate::types::{EntityKind, Likelihood, Tier};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Differentiation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferentiationStrategy {
    pub id: String,
    /// Who the strategy serves, e.g. "multilingual learners".
    pub population: String,
    pub strategy: String,
    pub tier: Tier,
    pub confidence: f64,
}

impl DifferentiationStrategy {
    pub fn blank(policy: &DefaultPolicy) -> Self {
        Self::from_value(&Value::Null, policy)
    }

    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            id: id_or_generate(v, EntityKind::Differentiation.id_prefix()),
            population: string_or(v, "population", ""),
            strategy: string_or(v, "strategy", ""),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Differentiation)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

// ---------------------------------------------------------------------------
// Evidence plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: String,
    pub name: String,
    /// Soft reference into `milestones`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    pub method: String,
    pub tier: Tier,
    pub confidence: f64,
}

impl Checkpoint {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            id: id_or_generate(v, EntityKind::Checkpoint.id_prefix()),
            name: string_or(v, "name", ""),
            milestone_id: opt_string(v, "milestoneId").filter(|s| !s.trim().is_empty()),
            method: string_or(v, "method", ""),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Checkpoint)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePlan {
    pub checkpoints: Vec<Checkpoint>,
    pub notes: String,
}

impl EvidencePlan {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            checkpoints: row_list(
                v,
                "checkpoints",
                |item| Checkpoint::from_value(item, policy),
                || Checkpoint::from_value(&Value::Null, policy),
            ),
            notes: string_or(v, "notes", ""),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationUpdate {
    pub id: String,
    pub audience: String,
    pub message: String,
    pub timing: String,
    pub tier: Tier,
    pub confidence: f64,
}

impl CommunicationUpdate {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            id: id_or_generate(v, EntityKind::Communication.id_prefix()),
            audience: string_or(v, "audience", ""),
            message: string_or(v, "message", ""),
            timing: string_or(v, "timing", ""),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Communication)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPlan {
    pub cadence: String,
    pub channels: Vec<String>,
    pub updates: Vec<CommunicationUpdate>,
}

impl CommunicationPlan {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            cadence: string_or(v, "cadence", ""),
            channels: string_list(v, "channels"),
            updates: row_list(
                v,
                "updates",
                |item| CommunicationUpdate::from_value(item, policy),
                || CommunicationUpdate::from_value(&Value::Null, policy),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Exhibition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionRole {
    pub id: String,
    pub name: String,
    pub responsibility: String,
}

impl ExhibitionRole {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: id_or_generate(v, "role"),
            name: string_or(v, "name", ""),
            responsibility: string_or(v, "responsibility", ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionPlan {
    pub format: String,
    pub venue: String,
    pub date: String,
    pub audience: Vec<String>,
    pub roles: Vec<ExhibitionRole>,
    pub tier: Tier,
    pub confidence: f64,
}

impl ExhibitionPlan {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            format: string_or(v, "format", ""),
            venue: string_or(v, "venue", ""),
            date: string_or(v, "date", ""),
            audience: string_list(v, "audience"),
            roles: row_list(v, "roles", ExhibitionRole::from_value, || {
                ExhibitionRole::from_value(&Value::Null)
            }),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Exhibition)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

// ---------------------------------------------------------------------------
// Risk register
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: String,
    pub description: String,
    pub likelihood: Likelihood,
    pub mitigation: String,
    pub owner: String,
    pub tier: Tier,
    pub confidence: f64,
}

impl Risk {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            id: id_or_generate(v, EntityKind::Risk.id_prefix()),
            description: string_or(v, "description", ""),
            likelihood: enum_or(v, "likelihood", Likelihood::parse, Likelihood::Medium),
            mitigation: string_or(v, "mitigation", ""),
            owner: string_or(v, "owner", ""),
            tier: tier_or(v, "tier", policy.tier_for(EntityKind::Risk)),
            confidence: unit_interval_or(v, "confidence", policy.confidence()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPlan {
    pub risks: Vec<Risk>,
}

impl RiskPlan {
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        Self {
            risks: row_list(
                v,
                "risks",
                |item| Risk::from_value(item, policy),
                || Risk::from_value(&Value::Null, policy),
            ),
        }
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
    fn evidence_plan_from_garbage_has_one_checkpoint() {
        let plan = EvidencePlan::from_value(&json!("garbage"), &DefaultPolicy::default());
        assert_eq!(plan.checkpoints.len(), 1);
        assert_eq!(plan.checkpoints[0].tier, Tier::Core);
        assert!(plan.notes.is_empty());
    }

    #[test]
    fn risk_likelihood_falls_back_to_medium() {
        let plan = RiskPlan::from_value(
            &json!({"risks": [{"description": "field trip cancelled", "likelihood": "certain"}]}),
            &DefaultPolicy::default(),
        );
        assert_eq!(plan.risks[0].likelihood, Likelihood::Medium);
        assert_eq!(plan.risks[0].tier, Tier::Scaffold);
    }

    #[test]
    fn exhibition_keeps_audience_set() {
        let plan = ExhibitionPlan::from_value(
            &json!({"format": "gallery walk", "audience": ["parents", "parents", "city council"]}),
            &DefaultPolicy::default(),
        );
        assert_eq!(plan.audience, vec!["parents", "city council"]);
        assert_eq!(plan.roles.len(), 1);
    }

    #[test]
    fn communication_updates_keep_ids() {
        let plan = CommunicationPlan::from_value(
            &json!({"updates": [{"id": "comm-a", "audience": "families"}, {}]}),
            &DefaultPolicy::default(),
        );
        assert_eq!(plan.updates[0].id, "comm-a");
        assert!(plan.updates[1].id.starts_with("comm-"));
    }
}
