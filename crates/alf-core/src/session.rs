use crate::config::Config;
use crate::error::{AlfError, Result};
use crate::logistics::DifferentiationStrategy;
use crate::model::{ProjectContext, WizardData};
use crate::paths;
use crate::plan::{Artifact, Milestone, Phase, Standard};
use crate::policy::DefaultPolicy;
use crate::reconcile::{reconcile, ReconcileMode, ReconcileReport};
use crate::rubric::Rubric;
use crate::steps::WizardStep;
use crate::validation::validate_step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// Step drafts
// ---------------------------------------------------------------------------

fn with_blank_row(rows: Value, blank: impl FnOnce() -> Value) -> Value {
    match rows {
        Value::Array(items) if items.is_empty() => Value::Array(vec![blank()]),
        Value::Array(items) => Value::Array(items),
        _ => Value::Array(vec![blank()]),
    }
}

fn to_json<T: Serialize>(v: &T) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

/// The step's working copy: the keys it owns, normalised, with one blank row
/// in each empty editable list. Submitting a draft unchanged is valid input.
pub fn draft_for(step: WizardStep, data: &WizardData, policy: &DefaultPolicy) -> Value {
    let mut draft = Map::new();

    if !step.context_fields().is_empty() {
        let ctx = match data.context() {
            Some(ctx) => to_json(ctx),
            None => to_json(&ProjectContext::blank(policy)),
        };
        let mut slice = Map::new();
        for key in step.context_fields() {
            if let Some(v) = ctx.get(*key) {
                slice.insert((*key).to_string(), v.clone());
            }
        }
        draft.insert("projectContext".to_string(), Value::Object(slice));
        return Value::Object(draft);
    }

    let model = data.normalized(policy).to_value();
    for key in step.fields() {
        let current = model.get(*key).cloned().unwrap_or(Value::Null);
        let value = match *key {
            "learningGoals" | "successCriteria" => {
                with_blank_row(current, || Value::String(String::new()))
            }
            "phases" => with_blank_row(current, || to_json(&Phase::blank(policy))),
            "milestones" => with_blank_row(current, || to_json(&Milestone::blank(policy))),
            "artifacts" => with_blank_row(current, || to_json(&Artifact::blank(policy))),
            "rubrics" => with_blank_row(current, || to_json(&Rubric::blank())),
            "differentiation" => {
                with_blank_row(current, || to_json(&DifferentiationStrategy::blank(policy)))
            }
            _ => current,
        };
        draft.insert((*key).to_string(), value);
    }
    Value::Object(draft)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    pub current_step: WizardStep,
    pub data: WizardData,
    pub updated_at: DateTime<Utc>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::first(),
            data: WizardData::default(),
            updated_at: Utc::now(),
        }
    }

    /// Rebuild a session from loosely shaped JSON. Never fails.
    pub fn from_value(v: &Value, policy: &DefaultPolicy) -> Self {
        let current_step = match v.get("currentStep") {
            None | Some(Value::Null) => WizardStep::first(),
            Some(raw) => match raw.as_str().map(str::parse::<WizardStep>) {
                Some(Ok(step)) => step,
                _ => {
                    tracing::warn!(value = %raw, "unknown current step, restarting at the first step");
                    WizardStep::first()
                }
            },
        };
        let updated_at = v
            .get("updatedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        Self {
            current_step,
            data: WizardData::from_value(v.get("data").unwrap_or(&Value::Null), policy),
            updated_at,
        }
    }

    /// Start a session from an exported or hand-written wizard record.
    /// Dangling references are reported, not removed.
    pub fn import(record: &Value, policy: &DefaultPolicy) -> (Self, ReconcileReport) {
        let mut data = WizardData::from_value(record, policy);
        let report = reconcile(&mut data, ReconcileMode::Flag);
        for d in &report.dangling {
            tracing::warn!(reference = %d, "dangling reference in imported record");
        }
        let session = Self {
            data,
            ..Self::new()
        };
        (session, report)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path, policy: &DefaultPolicy) -> Result<Self> {
        let path = paths::session_path(root);
        if !path.exists() {
            return Err(AlfError::NotInitialized);
        }
        let text = std::fs::read_to_string(&path)?;
        let raw: Value = serde_json::from_str(&text)?;
        Ok(Self::from_value(&raw, policy))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::session_path(root);
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        tracing::info!(step = %self.current_step, "saved session");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn draft(&self, policy: &DefaultPolicy) -> Value {
        draft_for(self.current_step, &self.data, policy)
    }

    /// Merge `patch` into the model, validate the current step and advance.
    ///
    /// Only keys the current step owns are merged. On validation failure the
    /// model and step are left as they were.
    pub fn submit(&mut self, patch: &Value, config: &Config) -> Result<WizardStep> {
        let step = self.current_step;
        let Some(fields) = patch.as_object() else {
            return Err(AlfError::InvalidPatch("expected a JSON object".to_string()));
        };

        let mut merged = match self.data.to_value() {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        for (key, value) in fields {
            if !step.fields().contains(&key.as_str()) {
                tracing::warn!(step = %step, key = %key, "ignoring field not owned by step");
                continue;
            }
            if key == "projectContext" {
                merge_context(&mut merged, step, value, &config.policy())?;
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }

        let candidate = WizardData::from_value(&Value::Object(merged), &config.policy());
        let errors = validate_step(step, &candidate, config);
        if !errors.is_empty() {
            tracing::debug!(step = %step, errors = errors.len(), "step rejected");
            return Err(AlfError::Validation {
                step: step.to_string(),
                errors,
            });
        }

        self.data = candidate;
        self.updated_at = Utc::now();
        if let Some(next) = step.next() {
            self.current_step = next;
        }
        tracing::info!(from = %step, to = %self.current_step, "step submitted");
        Ok(self.current_step)
    }

    /// Reconcile the model's soft references. In drop mode a report with
    /// findings means the model changed.
    pub fn reconcile(&mut self, mode: ReconcileMode) -> ReconcileReport {
        let report = reconcile(&mut self.data, mode);
        if mode == ReconcileMode::Drop && !report.is_clean() {
            self.updated_at = Utc::now();
        }
        report
    }

    /// Append a rubric, e.g. one instantiated from a catalog template.
    pub fn add_rubric(&mut self, rubric: Rubric) {
        self.data.rubrics.push(rubric);
        self.updated_at = Utc::now();
    }

    /// Align a standard unless one with the same framework and code is
    /// already present. Returns whether it was added.
    pub fn align_standard(&mut self, standard: Standard) -> bool {
        let key = standard.key();
        if self.data.standards.iter().any(|s| s.key() == key) {
            return false;
        }
        self.data.standards.push(standard);
        self.updated_at = Utc::now();
        true
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(prev) = self.current_step.previous() {
            self.current_step = prev;
            self.updated_at = Utc::now();
        }
        self.current_step
    }

    pub fn goto(&mut self, step: WizardStep) {
        self.current_step = step;
        self.updated_at = Utc::now();
    }
}

/// Overlay the step's slice of `projectContext` onto the stored context.
fn merge_context(
    merged: &mut Map<String, Value>,
    step: WizardStep,
    patch: &Value,
    policy: &DefaultPolicy,
) -> Result<()> {
    let Some(incoming) = patch.as_object() else {
        return Err(AlfError::InvalidPatch(
            "projectContext must be an object".to_string(),
        ));
    };
    let mut ctx = match merged.remove("projectContext") {
        Some(Value::Object(existing)) => existing,
        _ => match to_json(&ProjectContext::blank(policy)) {
            Value::Object(m) => m,
            _ => Map::new(),
        },
    };
    for (key, value) in incoming {
        if step.context_fields().contains(&key.as_str()) {
            ctx.insert(key.clone(), value.clone());
        } else {
            tracing::warn!(step = %step, key = %key, "ignoring context field not owned by step");
        }
    }
    merged.insert("projectContext".to_string(), Value::Object(ctx));
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn config() -> Config {
        Config::new("unit")
    }

    #[test]
    fn draft_adds_blank_rows() {
        let policy = DefaultPolicy::default();
        let data = WizardData::default();
        let draft = draft_for(WizardStep::Phases, &data, &policy);
        assert_eq!(draft["phases"].as_array().unwrap().len(), 1);
        assert_eq!(draft["milestones"].as_array().unwrap().len(), 1);
        assert_eq!(draft["phases"][0]["name"], "");

        let vision = draft_for(WizardStep::Vision, &data, &policy);
        assert_eq!(vision["learningGoals"], json!([""]));
        assert!(vision.get("phases").is_none());
    }

    #[test]
    fn draft_keeps_existing_rows() {
        let policy = DefaultPolicy::default();
        let data = WizardData::from_value(
            &json!({"phases": [{"id": "p1", "name": "A"}, {"id": "p2", "name": "B"}]}),
            &policy,
        );
        let draft = draft_for(WizardStep::Phases, &data, &policy);
        assert_eq!(draft["phases"].as_array().unwrap().len(), 2);
        assert_eq!(draft["phases"][1]["id"], "p2");
    }

    #[test]
    fn context_draft_is_a_slice() {
        let draft = draft_for(WizardStep::Grade, &WizardData::default(), &DefaultPolicy::default());
        let ctx = draft["projectContext"].as_object().unwrap();
        assert!(ctx.contains_key("gradeLevel"));
        assert!(!ctx.contains_key("subjects"));
    }

    #[test]
    fn submit_valid_patch_advances() {
        let mut s = WizardSession::new();
        let next = s
            .submit(&json!({"projectContext": {"subjects": ["math"]}}), &config())
            .unwrap();
        assert_eq!(next, WizardStep::Grade);
        assert_eq!(s.data.context().unwrap().subjects, vec!["math"]);
    }

    #[test]
    fn submit_invalid_patch_leaves_model() {
        let mut s = WizardSession::new();
        s.goto(WizardStep::Vision);
        let before = s.data.clone();
        let err = s
            .submit(&json!({"bigIdea": "short", "learningGoals": ["one"]}), &config())
            .unwrap_err();
        match err {
            AlfError::Validation { step, errors } => {
                assert_eq!(step, "vision");
                assert!(errors.get("bigIdea").is_some());
                assert!(errors.get("learningGoals").is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(s.data, before);
        assert_eq!(s.current_step, WizardStep::Vision);
    }

    #[test]
    fn submit_ignores_unowned_keys() {
        let mut s = WizardSession::new();
        s.submit(
            &json!({"projectContext": {"subjects": ["art"], "gradeLevel": "9"}, "bigIdea": "x"}),
            &config(),
        )
        .unwrap();
        let ctx = s.data.context().unwrap();
        assert_eq!(ctx.grade_level, "");
        assert_eq!(s.data.big_idea, "");
    }

    #[test]
    fn context_steps_merge_field_by_field() {
        let mut s = WizardSession::new();
        s.submit(&json!({"projectContext": {"subjects": ["art"]}}), &config())
            .unwrap();
        s.submit(
            &json!({"projectContext": {"gradeLevel": "9", "studentCount": 24}}),
            &config(),
        )
        .unwrap();
        let ctx = s.data.context().unwrap();
        assert_eq!(ctx.subjects, vec!["art"]);
        assert_eq!(ctx.student_count, 24);
        assert_eq!(s.current_step, WizardStep::Materials);
    }

    #[test]
    fn non_object_patch_is_rejected() {
        let mut s = WizardSession::new();
        assert!(matches!(
            s.submit(&json!([1, 2]), &config()),
            Err(AlfError::InvalidPatch(_))
        ));
    }

    #[test]
    fn review_submit_stays_on_review() {
        let mut s = WizardSession::new();
        s.goto(WizardStep::Review);
        assert_eq!(s.submit(&json!({}), &config()).unwrap(), WizardStep::Review);
    }

    #[test]
    fn back_stops_at_first_step() {
        let mut s = WizardSession::new();
        s.goto(WizardStep::Grade);
        assert_eq!(s.back(), WizardStep::Subjects);
        assert_eq!(s.back(), WizardStep::Subjects);
    }

    #[test]
    fn malformed_step_falls_back() {
        let s = WizardSession::from_value(
            &json!({"currentStep": "launch", "data": {"bigIdea": 7}}),
            &DefaultPolicy::default(),
        );
        assert_eq!(s.current_step, WizardStep::Subjects);
        assert_eq!(s.data.big_idea, "");
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut s = WizardSession::new();
        s.goto(WizardStep::Standards);
        s.save(dir.path()).unwrap();
        let loaded = WizardSession::load(dir.path(), &DefaultPolicy::default()).unwrap();
        assert_eq!(loaded.current_step, WizardStep::Standards);
        assert_eq!(loaded.data, s.data);
    }

    #[test]
    fn save_load_keeps_non_default_numbers() {
        let dir = TempDir::new().unwrap();
        let policy = DefaultPolicy::default();
        let mut s = WizardSession::new();
        s.data = WizardData::from_value(
            &json!({
                "phases": [{"id": "p1", "name": "Launch", "confidence": 0.9474790928214347}],
                "milestones": [{"id": "m1", "phaseId": "p1", "name": "Pitch", "confidence": 0.1}],
                "rubrics": [{
                    "id": "r1",
                    "name": "Pitch rubric",
                    "totalPoints": 37.333333333333336,
                    "criteria": [{"id": "c1", "name": "Clarity", "weight": 2.7182818284590455}]
                }]
            }),
            &policy,
        );
        s.save(dir.path()).unwrap();

        let loaded = WizardSession::load(dir.path(), &policy).unwrap();
        assert_eq!(loaded.data, s.data);
        assert_eq!(loaded.data.normalized(&policy), s.data);
        assert_eq!(loaded.data.phases[0].confidence, 0.9474790928214347);
        assert_eq!(loaded.data.rubrics[0].total_points, Some(37.333333333333336));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            WizardSession::load(dir.path(), &DefaultPolicy::default()),
            Err(AlfError::NotInitialized)
        ));
    }

    #[test]
    fn add_rubric_touches_session() {
        let mut s = WizardSession::new();
        s.updated_at = Utc::now() - chrono::Duration::hours(1);
        let before = s.updated_at;
        let rubric = crate::catalog::rubric_template("presentation")
            .unwrap()
            .instantiate();
        s.add_rubric(rubric);
        assert_eq!(s.data.rubrics.len(), 1);
        assert!(s.updated_at > before);
    }

    #[test]
    fn align_standard_skips_existing_key() {
        let policy = DefaultPolicy::default();
        let entry = crate::catalog::search_standards(None, "")[0];
        let mut s = WizardSession::new();
        s.updated_at = Utc::now() - chrono::Duration::hours(1);
        let before = s.updated_at;

        assert!(s.align_standard(entry.to_standard(&policy)));
        assert!(s.updated_at > before);
        let touched = s.updated_at;

        assert!(!s.align_standard(entry.to_standard(&policy)));
        assert_eq!(s.data.standards.len(), 1);
        assert_eq!(s.updated_at, touched);
    }

    #[test]
    fn reconcile_drop_clears_and_touches() {
        let (mut s, _) = WizardSession::import(
            &json!({"milestones": [{"id": "m1", "phaseId": "gone", "name": "M"}]}),
            &DefaultPolicy::default(),
        );
        let before = s.updated_at;
        let report = s.reconcile(ReconcileMode::Drop);
        assert_eq!(report.dangling.len(), 1);
        assert!(s.data.milestones[0].phase_id.is_none());
        assert!(s.updated_at >= before);
        assert!(s.reconcile(ReconcileMode::Flag).is_clean());
    }

    #[test]
    fn import_flags_dangling() {
        let (s, report) = WizardSession::import(
            &json!({"milestones": [{"id": "m1", "phaseId": "gone", "name": "M"}]}),
            &DefaultPolicy::default(),
        );
        assert_eq!(report.dangling.len(), 1);
        assert_eq!(s.data.milestones[0].phase_id.as_deref(), Some("gone"));
        assert_eq!(s.current_step, WizardStep::first());
    }
}
