use crate::config::Config;
use crate::model::WizardData;
use crate::steps::WizardStep;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

/// Completeness bucket a checklist rule counts toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Core,
    Context,
    Progressive,
}

impl Bucket {
    pub fn all() -> &'static [Bucket] {
        &[Bucket::Core, Bucket::Context, Bucket::Progressive]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Core => "core",
            Bucket::Context => "context",
            Bucket::Progressive => "progressive",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EvalContext / Rule
// ---------------------------------------------------------------------------

pub struct EvalContext<'a> {
    pub data: &'a WizardData,
    pub config: &'a Config,
}

/// A fn-pointer rule. One table drives both step validation (`step`) and the
/// completeness checklist (`bucket`); a rule may serve either or both.
pub struct Rule {
    pub id: &'static str,
    /// Field group key used in validation error maps.
    pub field: &'static str,
    pub bucket: Option<Bucket>,
    pub step: Option<WizardStep>,
    /// Checklist wording, reported when the rule is unmet.
    pub label: fn(&EvalContext) -> String,
    pub check: fn(&EvalContext) -> bool,
    /// Validation wording shown on the step.
    pub message: fn(&EvalContext) -> String,
}

impl Rule {
    pub fn is_satisfied(&self, ctx: &EvalContext) -> bool {
        (self.check)(ctx)
    }
}

// ---------------------------------------------------------------------------
// Helper macros for concise rule definitions
// ---------------------------------------------------------------------------

macro_rules! rule {
    (
        id: $id:expr,
        field: $field:expr,
        label: $label:expr,
        check: $check:expr,
        message: $msg:expr
        $(, bucket: $bucket:expr)?
        $(, step: $step:expr)?
    ) => {
        Rule {
            id: $id,
            field: $field,
            label: $label,
            check: $check,
            message: $msg,
            bucket: {
                #[allow(unused_assignments, unused_mut)]
                let mut v: Option<Bucket> = None;
                $(v = Some($bucket);)?
                v
            },
            step: {
                #[allow(unused_assignments, unused_mut)]
                let mut v: Option<WizardStep> = None;
                $(v = Some($step);)?
                v
            },
        }
    };
}

// ---------------------------------------------------------------------------
// Condition helpers
// ---------------------------------------------------------------------------

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

fn goal_count(ctx: &EvalContext) -> usize {
    ctx.data.learning_goals.iter().filter(|g| filled(g)).count()
}

fn criteria_count(ctx: &EvalContext) -> usize {
    ctx.data.success_criteria.iter().filter(|c| filled(c)).count()
}

fn has_vision(ctx: &EvalContext) -> bool {
    filled(&ctx.data.big_idea) || filled(&ctx.data.motivation)
}

fn context_str(ctx: &EvalContext, pick: fn(&crate::model::ProjectContext) -> &str) -> bool {
    ctx.data.context().map(|c| filled(pick(c))).unwrap_or(false)
}

fn subject_count(ctx: &EvalContext) -> usize {
    ctx.data.context().map(|c| c.subjects.len()).unwrap_or(0)
}

fn student_count(ctx: &EvalContext) -> u32 {
    ctx.data.context().map(|c| c.student_count).unwrap_or(0)
}

fn named_phases(ctx: &EvalContext) -> usize {
    ctx.data.phases.iter().filter(|p| filled(&p.name)).count()
}

fn named_milestones(ctx: &EvalContext) -> usize {
    ctx.data.milestones.iter().filter(|m| filled(&m.name)).count()
}

fn named_artifacts(ctx: &EvalContext) -> usize {
    ctx.data.artifacts.iter().filter(|a| filled(&a.name)).count()
}

fn unphased_milestones<'a>(ctx: &EvalContext<'a>) -> Vec<&'a str> {
    ctx.data
        .milestones
        .iter()
        .filter(|m| filled(&m.name) && m.phase_id.is_none())
        .map(|m| m.name.as_str())
        .collect()
}

fn has_assessed_artifact(ctx: &EvalContext) -> bool {
    ctx.data
        .artifacts
        .iter()
        .any(|a| filled(&a.name) && a.is_assessed())
}

fn has_rubric_with_criteria(ctx: &EvalContext) -> bool {
    ctx.data
        .rubrics
        .iter()
        .any(|r| r.named_criteria().next().is_some())
}

fn has_standard(ctx: &EvalContext) -> bool {
    ctx.data.standards.iter().any(|s| filled(&s.code))
}

fn has_differentiation(ctx: &EvalContext) -> bool {
    ctx.data.differentiation.iter().any(|d| filled(&d.strategy))
}

fn has_checkpoint(ctx: &EvalContext) -> bool {
    ctx.data
        .evidence_plan
        .as_ref()
        .map(|p| p.checkpoints.iter().any(|c| filled(&c.name)))
        .unwrap_or(false)
}

fn has_exhibition_audience(ctx: &EvalContext) -> bool {
    ctx.data
        .exhibition
        .as_ref()
        .map(|e| !e.audience.is_empty())
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Default rules
// ---------------------------------------------------------------------------

pub fn default_rules() -> Vec<Rule> {
    vec![
        // -- core ----------------------------------------------------------
        rule! {
            id: "vision",
            field: "bigIdea",
            label: |_| "Vision or motivation".to_string(),
            check: has_vision,
            message: |_| "Describe the big idea or what motivates this project.".to_string(),
            bucket: Bucket::Core,
            step: WizardStep::Vision
        },
        rule! {
            id: "big_idea_length",
            field: "bigIdea",
            label: |ctx| format!(
                "Big idea of at least {} characters",
                ctx.config.thresholds.min_big_idea_chars
            ),
            check: |ctx| {
                !filled(&ctx.data.big_idea)
                    || char_len(&ctx.data.big_idea) >= ctx.config.thresholds.min_big_idea_chars
            },
            message: |ctx| format!(
                "The big idea needs at least {} characters ({} so far).",
                ctx.config.thresholds.min_big_idea_chars,
                char_len(&ctx.data.big_idea)
            ),
            step: WizardStep::Vision
        },
        rule! {
            id: "learning_goals",
            field: "learningGoals",
            label: |ctx| format!(
                "At least {} learning goals",
                ctx.config.thresholds.min_learning_goals
            ),
            check: |ctx| goal_count(ctx) >= ctx.config.thresholds.min_learning_goals,
            message: |ctx| format!(
                "Add at least {} learning goals ({} so far).",
                ctx.config.thresholds.min_learning_goals,
                goal_count(ctx)
            ),
            bucket: Bucket::Core,
            step: WizardStep::Vision
        },
        rule! {
            id: "success_criteria",
            field: "successCriteria",
            label: |ctx| format!(
                "At least {} success criteria",
                ctx.config.thresholds.min_success_criteria
            ),
            check: |ctx| criteria_count(ctx) >= ctx.config.thresholds.min_success_criteria,
            message: |ctx| format!(
                "Add at least {} success criteria ({} so far).",
                ctx.config.thresholds.min_success_criteria,
                criteria_count(ctx)
            ),
            bucket: Bucket::Core,
            step: WizardStep::Vision
        },
        rule! {
            id: "essential_question",
            field: "essentialQuestion",
            label: |_| "Essential question".to_string(),
            check: |ctx| filled(&ctx.data.essential_question),
            message: |_| "Write an essential question to drive inquiry.".to_string(),
            bucket: Bucket::Core,
            step: WizardStep::Vision
        },
        rule! {
            id: "essential_question_length",
            field: "essentialQuestion",
            label: |ctx| format!(
                "Essential question of at least {} characters",
                ctx.config.thresholds.min_essential_question_chars
            ),
            check: |ctx| {
                !filled(&ctx.data.essential_question)
                    || char_len(&ctx.data.essential_question)
                        >= ctx.config.thresholds.min_essential_question_chars
            },
            message: |ctx| format!(
                "The essential question needs at least {} characters.",
                ctx.config.thresholds.min_essential_question_chars
            ),
            step: WizardStep::Vision
        },
        // -- context -------------------------------------------------------
        rule! {
            id: "subjects",
            field: "subjects",
            label: |_| "At least one subject".to_string(),
            check: |ctx| subject_count(ctx) > 0,
            message: |_| "Pick at least one subject.".to_string(),
            bucket: Bucket::Context,
            step: WizardStep::Subjects
        },
        rule! {
            id: "grade_level",
            field: "gradeLevel",
            label: |_| "Grade level".to_string(),
            check: |ctx| context_str(ctx, |c| c.grade_level.as_str()),
            message: |_| "Choose a grade level or age band.".to_string(),
            bucket: Bucket::Context,
            step: WizardStep::Grade
        },
        rule! {
            id: "class_size",
            field: "studentCount",
            label: |_| "Class size".to_string(),
            check: |ctx| student_count(ctx) > 0,
            message: |_| "Enter how many students will take part.".to_string(),
            bucket: Bucket::Context,
            step: WizardStep::Grade
        },
        rule! {
            id: "time_window",
            field: "timeWindow",
            label: |_| "Time window".to_string(),
            check: |ctx| context_str(ctx, |c| c.time_window.as_str()),
            message: |_| "Say how long the project will run.".to_string(),
            bucket: Bucket::Context,
            step: WizardStep::Materials
        },
        rule! {
            id: "standards",
            field: "standards",
            label: |_| "At least one aligned standard".to_string(),
            check: has_standard,
            message: |_| "Align at least one standard.".to_string(),
            bucket: Bucket::Context,
            step: WizardStep::Standards
        },
        // -- progressive ---------------------------------------------------
        rule! {
            id: "phases",
            field: "phases",
            label: |_| "At least one phase".to_string(),
            check: |ctx| named_phases(ctx) > 0,
            message: |_| "Name at least one project phase.".to_string(),
            bucket: Bucket::Progressive,
            step: WizardStep::Phases
        },
        rule! {
            id: "milestones",
            field: "milestones",
            label: |_| "At least one milestone".to_string(),
            check: |ctx| named_milestones(ctx) > 0,
            message: |_| "Name at least one milestone.".to_string(),
            bucket: Bucket::Progressive,
            step: WizardStep::Phases
        },
        rule! {
            id: "milestone_phase",
            field: "milestones",
            label: |_| "Every milestone belongs to a phase".to_string(),
            check: |ctx| unphased_milestones(ctx).is_empty(),
            message: |ctx| format!(
                "Assign a phase to: {}.",
                unphased_milestones(ctx).join(", ")
            ),
            step: WizardStep::Phases
        },
        rule! {
            id: "artifacts",
            field: "artifacts",
            label: |_| "At least one artifact".to_string(),
            check: |ctx| named_artifacts(ctx) > 0,
            message: |_| "Name at least one student artifact.".to_string(),
            bucket: Bucket::Progressive,
            step: WizardStep::Rubrics
        },
        rule! {
            id: "artifact_rubric_link",
            field: "artifacts",
            label: |_| "An artifact linked to a rubric".to_string(),
            check: has_assessed_artifact,
            message: |_| "Link at least one artifact to a rubric.".to_string(),
            bucket: Bucket::Progressive,
            step: WizardStep::Rubrics
        },
        rule! {
            id: "rubric_criteria",
            field: "rubrics",
            label: |_| "A rubric with criteria".to_string(),
            check: has_rubric_with_criteria,
            message: |_| "Give at least one rubric a named criterion.".to_string(),
            bucket: Bucket::Progressive,
            step: WizardStep::Rubrics
        },
        rule! {
            id: "differentiation",
            field: "differentiation",
            label: |_| "Differentiation strategies".to_string(),
            check: has_differentiation,
            message: |_| "Describe at least one differentiation strategy.".to_string(),
            bucket: Bucket::Progressive
        },
        rule! {
            id: "evidence_checkpoint",
            field: "evidencePlan",
            label: |_| "Evidence checkpoint".to_string(),
            check: has_checkpoint,
            message: |_| "Plan at least one evidence checkpoint.".to_string(),
            bucket: Bucket::Progressive,
            step: WizardStep::Logistics
        },
        rule! {
            id: "exhibition_audience",
            field: "exhibition",
            label: |_| "Exhibition audience".to_string(),
            check: has_exhibition_audience,
            message: |_| "Say who will see the final exhibition.".to_string(),
            bucket: Bucket::Progressive
        },
    ]
}

/// Rules in `bucket`, in table order.
pub fn bucket_rules(rules: &[Rule], bucket: Bucket) -> impl Iterator<Item = &Rule> {
    rules.iter().filter(move |r| r.bucket == Some(bucket))
}

/// Rules that block `step`, in table order.
pub fn step_rules(rules: &[Rule], step: WizardStep) -> impl Iterator<Item = &Rule> {
    rules.iter().filter(move |r| r.step == Some(step))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rule_ids_are_unique() {
        let rules = default_rules();
        let ids: HashSet<_> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn checklist_sizes() {
        let rules = default_rules();
        assert_eq!(bucket_rules(&rules, Bucket::Core).count(), 4);
        assert_eq!(bucket_rules(&rules, Bucket::Context).count(), 5);
        assert_eq!(bucket_rules(&rules, Bucket::Progressive).count(), 8);
    }

    #[test]
    fn every_rule_is_used_somewhere() {
        for rule in default_rules() {
            assert!(
                rule.bucket.is_some() || rule.step.is_some(),
                "rule '{}' is neither a checklist item nor a step check",
                rule.id
            );
        }
    }

    #[test]
    fn review_step_has_no_blocking_rules() {
        let rules = default_rules();
        assert_eq!(step_rules(&rules, WizardStep::Review).count(), 0);
        assert!(step_rules(&rules, WizardStep::Vision).count() >= 4);
    }

    #[test]
    fn length_rules_pass_when_field_is_empty() {
        let data = WizardData::default();
        let config = Config::new("p");
        let ctx = EvalContext {
            data: &data,
            config: &config,
        };
        let rules = default_rules();
        let big_idea = rules.iter().find(|r| r.id == "big_idea_length").unwrap();
        assert!(big_idea.is_satisfied(&ctx));
        let vision = rules.iter().find(|r| r.id == "vision").unwrap();
        assert!(!vision.is_satisfied(&ctx));
    }
}
