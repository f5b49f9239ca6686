use crate::config::Config;
use crate::model::WizardData;
use crate::rules::{bucket_rules, default_rules, Bucket, EvalContext, Rule};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessSummary {
    pub core: u32,
    pub context: u32,
    pub progressive: u32,
    pub overall: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketReport {
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub summary: CompletenessSummary,
    pub core: BucketReport,
    pub context: BucketReport,
    pub progressive: BucketReport,
}

impl CompletenessReport {
    pub fn bucket(&self, bucket: Bucket) -> &BucketReport {
        match bucket {
            Bucket::Core => &self.core,
            Bucket::Context => &self.context,
            Bucket::Progressive => &self.progressive,
        }
    }

    pub fn percentage(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Core => self.summary.core,
            Bucket::Context => self.summary.context,
            Bucket::Progressive => self.summary.progressive,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// `round(100 * satisfied / total)`; an empty checklist counts as complete.
pub fn percentage(satisfied: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (100.0 * satisfied as f64 / total as f64).round() as u32
}

fn score_bucket(rules: &[Rule], bucket: Bucket, ctx: &EvalContext) -> (u32, BucketReport) {
    let mut total = 0;
    let mut satisfied = 0;
    let mut missing = Vec::new();
    for rule in bucket_rules(rules, bucket) {
        total += 1;
        if rule.is_satisfied(ctx) {
            satisfied += 1;
        } else {
            missing.push((rule.label)(ctx));
        }
    }
    (percentage(satisfied, total), BucketReport { missing })
}

/// Score `data` against the default checklist. Pure: no I/O, no errors.
pub fn evaluate_completeness(data: &WizardData, config: &Config) -> CompletenessReport {
    evaluate_with_rules(&default_rules(), data, config)
}

pub fn evaluate_with_rules(rules: &[Rule], data: &WizardData, config: &Config) -> CompletenessReport {
    let ctx = EvalContext { data, config };
    let (core, core_report) = score_bucket(rules, Bucket::Core, &ctx);
    let (context, context_report) = score_bucket(rules, Bucket::Context, &ctx);
    let (progressive, progressive_report) = score_bucket(rules, Bucket::Progressive, &ctx);
    let overall = ((core + context + progressive) as f64 / 3.0).round() as u32;
    CompletenessReport {
        summary: CompletenessSummary {
            core,
            context,
            progressive,
            overall,
        },
        core: core_report,
        context: context_report,
        progressive: progressive_report,
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

    fn config() -> Config {
        Config::new("p")
    }

    fn data(v: serde_json::Value) -> WizardData {
        WizardData::from_value(&v, &DefaultPolicy::default())
    }

    fn assert_bounded(report: &CompletenessReport) {
        let s = report.summary;
        for p in [s.core, s.context, s.progressive, s.overall] {
            assert!(p <= 100);
        }
        let mean = ((s.core + s.context + s.progressive) as f64 / 3.0).round() as u32;
        assert_eq!(s.overall, mean);
    }

    #[test]
    fn empty_record_scores_zero() {
        let report = evaluate_completeness(&WizardData::default(), &config());
        assert_eq!(report.summary.core, 0);
        assert_eq!(report.summary.context, 0);
        assert_eq!(report.summary.progressive, 0);
        assert_eq!(report.summary.overall, 0);
        assert_eq!(report.core.missing.len(), 4);
        assert_eq!(report.context.missing.len(), 5);
        assert_eq!(report.progressive.missing.len(), 8);
    }

    #[test]
    fn goals_and_criteria_scenario() {
        let before = evaluate_completeness(
            &data(json!({"learningGoals": ["Understand X"], "successCriteria": []})),
            &config(),
        );
        assert!(before.core.missing.contains(&"At least 2 learning goals".to_string()));
        assert!(before.core.missing.contains(&"At least 2 success criteria".to_string()));
        assert!(before.summary.core < 100);

        let after = evaluate_completeness(
            &data(json!({
                "learningGoals": ["Understand X", "Apply X"],
                "successCriteria": ["Rubric score ≥ 3", "Peer review complete"]
            })),
            &config(),
        );
        assert!(!after.core.missing.iter().any(|m| m.contains("learning goals")));
        assert!(!after.core.missing.iter().any(|m| m.contains("success criteria")));
        assert_eq!(before.summary.core, 0);
        assert_eq!(after.summary.core, 50);
        assert_bounded(&after);
    }

    #[test]
    fn adding_fields_is_monotonic() {
        let steps = [
            json!({}),
            json!({"bigIdea": "Water shapes where people settle"}),
            json!({"essentialQuestion": "Why here?"}),
            json!({"projectContext": {"gradeLevel": "4", "subjects": ["science"]}}),
            json!({"phases": [{"name": "Launch"}]}),
            json!({"artifacts": [{"name": "Map", "rubricIds": ["r1"]}]}),
            json!({"exhibition": {"audience": ["families"]}}),
        ];
        let mut merged = serde_json::Map::new();
        let mut prev = evaluate_completeness(&data(json!({})), &config());
        for step in steps {
            if let serde_json::Value::Object(obj) = step {
                merged.extend(obj);
            }
            let next = evaluate_completeness(&data(serde_json::Value::Object(merged.clone())), &config());
            for bucket in Bucket::all() {
                assert!(next.percentage(*bucket) >= prev.percentage(*bucket));
            }
            assert_bounded(&next);
            prev = next;
        }
    }

    #[test]
    fn satisfying_a_check_strictly_increases_its_bucket() {
        let base = data(json!({"projectContext": {"gradeLevel": "5"}}));
        let with_time = data(json!({"projectContext": {"gradeLevel": "5", "timeWindow": "3 weeks"}}));
        let a = evaluate_completeness(&base, &config());
        let b = evaluate_completeness(&with_time, &config());
        assert_eq!(a.summary.context, 20);
        assert_eq!(b.summary.context, 40);
        assert_eq!(a.summary.core, b.summary.core);
    }

    #[test]
    fn blank_rows_do_not_count() {
        let report = evaluate_completeness(
            &data(json!({"phases": [{}], "rubrics": [{}], "evidencePlan": {}})),
            &config(),
        );
        assert_eq!(report.summary.progressive, 0);
    }

    #[test]
    fn thresholds_come_from_config() {
        let mut cfg = config();
        cfg.thresholds.min_learning_goals = 1;
        let report = evaluate_completeness(&data(json!({"learningGoals": ["One"]})), &cfg);
        assert!(!report.core.missing.iter().any(|m| m.contains("learning goals")));
        assert_eq!(report.summary.core, 25);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let d = data(json!({"bigIdea": "Energy moves", "phases": [{"name": "A"}]}));
        assert_eq!(evaluate_completeness(&d, &config()), evaluate_completeness(&d, &config()));
    }

    #[test]
    fn report_json_shape() {
        let report = evaluate_completeness(&WizardData::default(), &config());
        let v = serde_json::to_value(&report).unwrap();
        assert!(v["summary"]["overall"].is_u64());
        assert!(v["core"]["missing"].is_array());
        assert!(v["progressive"]["missing"].is_array());
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 100);
    }
}
