use crate::ids::generate_id;
use crate::model::WizardData;
use crate::types::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

// ---------------------------------------------------------------------------
// ModelIndex
// ---------------------------------------------------------------------------

/// Id → position lookups over the record's entity collections.
#[derive(Debug, Default)]
pub struct ModelIndex<'a> {
    pub phases: HashMap<&'a str, usize>,
    pub milestones: HashMap<&'a str, usize>,
    pub rubrics: HashMap<&'a str, usize>,
    pub standard_codes: HashSet<&'a str>,
}

impl<'a> ModelIndex<'a> {
    /// First occurrence wins when ids collide.
    pub fn build(data: &'a WizardData) -> Self {
        fn positions<'s>(ids: impl Iterator<Item = &'s str>) -> HashMap<&'s str, usize> {
            let mut map = HashMap::new();
            for (i, id) in ids.enumerate() {
                map.entry(id).or_insert(i);
            }
            map
        }
        Self {
            phases: positions(data.phases.iter().map(|p| p.id.as_str())),
            milestones: positions(data.milestones.iter().map(|m| m.id.as_str())),
            rubrics: positions(data.rubrics.iter().map(|r| r.id.as_str())),
            standard_codes: data
                .standards
                .iter()
                .map(|s| s.code.as_str())
                .filter(|c| !c.trim().is_empty())
                .collect(),
        }
    }

    pub fn phase(&self, id: &str) -> Option<usize> {
        self.phases.get(id).copied()
    }

    pub fn milestone(&self, id: &str) -> Option<usize> {
        self.milestones.get(id).copied()
    }

    pub fn rubric(&self, id: &str) -> Option<usize> {
        self.rubrics.get(id).copied()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Report only; the record is left untouched.
    Flag,
    /// Clear dangling references and re-id duplicates.
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingRef {
    /// Owning collection, e.g. `milestones`.
    pub collection: String,
    pub owner_id: String,
    /// Reference field, e.g. `phaseId`.
    pub field: String,
    pub target: String,
}

impl fmt::Display for DanglingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}].{} -> '{}'",
            self.collection, self.owner_id, self.field, self.target
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateId {
    pub collection: String,
    pub id: String,
    /// Replacement id, set only in drop mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reassigned: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub dangling: Vec<DanglingRef>,
    pub duplicates: Vec<DuplicateId>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.duplicates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

fn dangling(collection: &str, owner_id: &str, field: &str, target: &str) -> DanglingRef {
    DanglingRef {
        collection: collection.to_string(),
        owner_id: owner_id.to_string(),
        field: field.to_string(),
        target: target.to_string(),
    }
}

/// Find references whose target does not exist. Duplicate ids are not
/// considered here; run [`dedupe_ids`] first when they matter.
pub fn find_dangling(data: &WizardData) -> Vec<DanglingRef> {
    let index = ModelIndex::build(data);
    let mut out = Vec::new();

    for m in &data.milestones {
        if let Some(pid) = &m.phase_id {
            if index.phase(pid).is_none() {
                out.push(dangling("milestones", &m.id, "phaseId", pid));
            }
        }
    }
    for a in &data.artifacts {
        if let Some(mid) = &a.milestone_id {
            if index.milestone(mid).is_none() {
                out.push(dangling("artifacts", &a.id, "milestoneId", mid));
            }
        }
        for rid in &a.rubric_ids {
            if index.rubric(rid).is_none() {
                out.push(dangling("artifacts", &a.id, "rubricIds", rid));
            }
        }
    }
    for r in &data.rubrics {
        let collection = format!("rubrics[{}].criteria", r.id);
        for c in &r.criteria {
            for code in &c.standards_alignment {
                if !index.standard_codes.contains(code.as_str()) {
                    out.push(dangling(&collection, &c.id, "standardsAlignment", code));
                }
            }
        }
    }
    if let Some(plan) = &data.evidence_plan {
        for c in &plan.checkpoints {
            if let Some(mid) = &c.milestone_id {
                if index.milestone(mid).is_none() {
                    out.push(dangling("evidencePlan.checkpoints", &c.id, "milestoneId", mid));
                }
            }
        }
    }
    out
}

fn dedupe<'a>(
    collection: &str,
    prefix: &str,
    ids: impl Iterator<Item = &'a mut String>,
    mode: ReconcileMode,
    out: &mut Vec<DuplicateId>,
) {
    let mut seen: HashSet<String> = HashSet::new();
    for id in ids {
        if seen.insert(id.clone()) {
            continue;
        }
        let reassigned = match mode {
            ReconcileMode::Flag => None,
            ReconcileMode::Drop => {
                let mut fresh = generate_id(prefix);
                while seen.contains(&fresh) {
                    fresh = generate_id(prefix);
                }
                seen.insert(fresh.clone());
                Some(fresh)
            }
        };
        out.push(DuplicateId {
            collection: collection.to_string(),
            id: id.clone(),
            reassigned: reassigned.clone(),
        });
        if let Some(fresh) = reassigned {
            *id = fresh;
        }
    }
}

/// Report (and in drop mode, re-id) later entities that reuse an earlier id.
/// References keep pointing at the first entity with that id.
pub fn dedupe_ids(data: &mut WizardData, mode: ReconcileMode) -> Vec<DuplicateId> {
    let mut out = Vec::new();
    dedupe(
        "phases",
        EntityKind::Phase.id_prefix(),
        data.phases.iter_mut().map(|p| &mut p.id),
        mode,
        &mut out,
    );
    dedupe(
        "milestones",
        EntityKind::Milestone.id_prefix(),
        data.milestones.iter_mut().map(|m| &mut m.id),
        mode,
        &mut out,
    );
    dedupe(
        "artifacts",
        EntityKind::Artifact.id_prefix(),
        data.artifacts.iter_mut().map(|a| &mut a.id),
        mode,
        &mut out,
    );
    dedupe(
        "rubrics",
        "rubric",
        data.rubrics.iter_mut().map(|r| &mut r.id),
        mode,
        &mut out,
    );
    dedupe(
        "differentiation",
        EntityKind::Differentiation.id_prefix(),
        data.differentiation.iter_mut().map(|d| &mut d.id),
        mode,
        &mut out,
    );
    for r in &mut data.rubrics {
        dedupe(
            &format!("rubrics[{}].criteria", r.id),
            "crit",
            r.criteria.iter_mut().map(|c| &mut c.id),
            mode,
            &mut out,
        );
    }
    if let Some(plan) = &mut data.evidence_plan {
        dedupe(
            "evidencePlan.checkpoints",
            EntityKind::Checkpoint.id_prefix(),
            plan.checkpoints.iter_mut().map(|c| &mut c.id),
            mode,
            &mut out,
        );
    }
    if let Some(plan) = &mut data.communications {
        dedupe(
            "communications.updates",
            EntityKind::Communication.id_prefix(),
            plan.updates.iter_mut().map(|u| &mut u.id),
            mode,
            &mut out,
        );
    }
    if let Some(plan) = &mut data.exhibition {
        dedupe(
            "exhibition.roles",
            "role",
            plan.roles.iter_mut().map(|r| &mut r.id),
            mode,
            &mut out,
        );
    }
    if let Some(plan) = &mut data.risk_management {
        dedupe(
            "riskManagement.risks",
            EntityKind::Risk.id_prefix(),
            plan.risks.iter_mut().map(|r| &mut r.id),
            mode,
            &mut out,
        );
    }
    out
}

fn clear_dangling(data: &mut WizardData, found: &[DanglingRef]) {
    let is_dangling = |collection: &str, owner: &str, field: &str, target: &str| {
        found.iter().any(|d| {
            d.collection == collection && d.owner_id == owner && d.field == field && d.target == target
        })
    };

    for m in &mut data.milestones {
        if let Some(pid) = m.phase_id.clone() {
            if is_dangling("milestones", &m.id, "phaseId", &pid) {
                tracing::debug!(milestone = %m.id, phase = %pid, "dropping dangling phase reference");
                m.phase_id = None;
            }
        }
    }
    for a in &mut data.artifacts {
        if let Some(mid) = a.milestone_id.clone() {
            if is_dangling("artifacts", &a.id, "milestoneId", &mid) {
                tracing::debug!(artifact = %a.id, milestone = %mid, "dropping dangling milestone reference");
                a.milestone_id = None;
            }
        }
        let owner = a.id.clone();
        a.rubric_ids
            .retain(|rid| !is_dangling("artifacts", &owner, "rubricIds", rid));
    }
    for r in &mut data.rubrics {
        let collection = format!("rubrics[{}].criteria", r.id);
        for c in &mut r.criteria {
            let owner = c.id.clone();
            c.standards_alignment
                .retain(|code| !is_dangling(&collection, &owner, "standardsAlignment", code));
        }
    }
    if let Some(plan) = &mut data.evidence_plan {
        for c in &mut plan.checkpoints {
            if let Some(mid) = c.milestone_id.clone() {
                if is_dangling("evidencePlan.checkpoints", &c.id, "milestoneId", &mid) {
                    c.milestone_id = None;
                }
            }
        }
    }
}

/// One reconciliation pass over the record's soft references.
pub fn reconcile(data: &mut WizardData, mode: ReconcileMode) -> ReconcileReport {
    let duplicates = dedupe_ids(data, mode);
    let found = find_dangling(data);
    if mode == ReconcileMode::Drop && !found.is_empty() {
        clear_dangling(data, &found);
    }
    ReconcileReport {
        dangling: found,
        duplicates,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DefaultPolicy;
    use serde_json::json;

    fn data(v: serde_json::Value) -> WizardData {
        WizardData::from_value(&v, &DefaultPolicy::default())
    }

    fn linked() -> WizardData {
        data(json!({
            "standards": [{"framework": "ngss", "code": "MS-ESS3-2"}],
            "phases": [{"id": "p1", "name": "Launch"}],
            "milestones": [
                {"id": "m1", "phaseId": "p1", "name": "Survey"},
                {"id": "m2", "phaseId": "p-gone", "name": "Pitch"}
            ],
            "artifacts": [
                {"id": "a1", "name": "Map", "milestoneId": "m1", "rubricIds": ["r1", "r-gone"]},
                {"id": "a2", "name": "Poster", "milestoneId": "m-gone"}
            ],
            "rubrics": [{"id": "r1", "criteria": [
                {"id": "c1", "name": "Accuracy", "standardsAlignment": ["MS-ESS3-2", "XX-1"]}
            ]}],
            "evidencePlan": {"checkpoints": [{"id": "k1", "name": "Draft", "milestoneId": "m9"}]}
        }))
    }

    #[test]
    fn index_lookups() {
        let d = linked();
        let index = ModelIndex::build(&d);
        assert_eq!(index.phase("p1"), Some(0));
        assert_eq!(index.milestone("m2"), Some(1));
        assert_eq!(index.rubric("r-gone"), None);
        assert!(index.standard_codes.contains("MS-ESS3-2"));
    }

    #[test]
    fn flag_mode_reports_without_changes() {
        let mut d = linked();
        let before = d.clone();
        let report = reconcile(&mut d, ReconcileMode::Flag);
        assert_eq!(d, before);
        let targets: Vec<_> = report.dangling.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["p-gone", "r-gone", "m-gone", "XX-1", "m9"]);
        assert!(report.duplicates.is_empty());
        assert!(!report.is_clean());
    }

    #[test]
    fn drop_mode_clears_dangling_refs() {
        let mut d = linked();
        let report = reconcile(&mut d, ReconcileMode::Drop);
        assert_eq!(report.dangling.len(), 5);
        assert_eq!(d.milestones[0].phase_id.as_deref(), Some("p1"));
        assert_eq!(d.milestones[1].phase_id, None);
        assert_eq!(d.artifacts[0].rubric_ids, vec!["r1"]);
        assert_eq!(d.artifacts[1].milestone_id, None);
        assert_eq!(d.rubrics[0].criteria[0].standards_alignment, vec!["MS-ESS3-2"]);
        assert_eq!(d.evidence_plan.as_ref().unwrap().checkpoints[0].milestone_id, None);
        assert!(reconcile(&mut d, ReconcileMode::Flag).is_clean());
    }

    #[test]
    fn duplicates_are_reassigned_in_drop_mode() {
        let mut d = data(json!({"phases": [
            {"id": "p1", "name": "A"},
            {"id": "p1", "name": "B"},
            {"id": "p2", "name": "C"}
        ]}));
        let flagged = reconcile(&mut d.clone(), ReconcileMode::Flag);
        assert_eq!(flagged.duplicates.len(), 1);
        assert_eq!(flagged.duplicates[0].reassigned, None);

        let report = reconcile(&mut d, ReconcileMode::Drop);
        assert_eq!(report.duplicates.len(), 1);
        let fresh = report.duplicates[0].reassigned.clone().unwrap();
        assert_eq!(d.phases[0].id, "p1");
        assert_eq!(d.phases[1].id, fresh);
        assert!(fresh.starts_with("phase-"));
    }

    #[test]
    fn nested_duplicates_are_reassigned_in_drop_mode() {
        let mut d = data(json!({
            "rubrics": [{"id": "r1", "criteria": [
                {"id": "c1", "name": "Accuracy"},
                {"id": "c1", "name": "Clarity"}
            ]}],
            "evidencePlan": {"checkpoints": [
                {"id": "k1", "name": "Draft"},
                {"id": "k1", "name": "Final"}
            ]},
            "communications": {"updates": [{"id": "u1"}, {"id": "u1"}]},
            "exhibition": {"roles": [{"id": "host"}, {"id": "host"}]},
            "riskManagement": {"risks": [
                {"id": "rk", "description": "Rain"},
                {"id": "rk", "description": "Absences"}
            ]}
        }));

        let flagged = reconcile(&mut d.clone(), ReconcileMode::Flag);
        let collections: Vec<_> = flagged.duplicates.iter().map(|x| x.collection.as_str()).collect();
        assert_eq!(
            collections,
            vec![
                "rubrics[r1].criteria",
                "evidencePlan.checkpoints",
                "communications.updates",
                "exhibition.roles",
                "riskManagement.risks",
            ]
        );

        let report = reconcile(&mut d, ReconcileMode::Drop);
        assert_eq!(report.duplicates.len(), 5);
        let criteria = &d.rubrics[0].criteria;
        assert_eq!(criteria[0].id, "c1");
        assert_ne!(criteria[1].id, "c1");
        assert!(criteria[1].id.starts_with("crit-"));
        let checkpoints = &d.evidence_plan.as_ref().unwrap().checkpoints;
        assert_ne!(checkpoints[0].id, checkpoints[1].id);
        let risks = &d.risk_management.as_ref().unwrap().risks;
        assert_ne!(risks[0].id, risks[1].id);
        assert!(reconcile(&mut d, ReconcileMode::Flag).duplicates.is_empty());
    }

    #[test]
    fn criterion_references_are_scoped_to_their_rubric() {
        let mut d = data(json!({
            "standards": [{"framework": "ngss", "code": "MS-LS2-1"}],
            "rubrics": [
                {"id": "r1", "criteria": [{"id": "c1", "name": "A", "standardsAlignment": ["XX-9"]}]},
                {"id": "r2", "criteria": [{"id": "c1", "name": "B", "standardsAlignment": ["XX-9", "MS-LS2-1"]}]}
            ]
        }));
        let report = reconcile(&mut d, ReconcileMode::Drop);
        assert!(report.duplicates.is_empty());
        let owners: Vec<_> = report.dangling.iter().map(|x| x.to_string()).collect();
        assert_eq!(
            owners,
            vec![
                "rubrics[r1].criteria[c1].standardsAlignment -> 'XX-9'",
                "rubrics[r2].criteria[c1].standardsAlignment -> 'XX-9'",
            ]
        );
        assert!(d.rubrics[0].criteria[0].standards_alignment.is_empty());
        assert_eq!(d.rubrics[1].criteria[0].standards_alignment, vec!["MS-LS2-1"]);
    }

    #[test]
    fn dangling_display() {
        let r = dangling("artifacts", "a1", "rubricIds", "r9");
        assert_eq!(r.to_string(), "artifacts[a1].rubricIds -> 'r9'");
    }
}
