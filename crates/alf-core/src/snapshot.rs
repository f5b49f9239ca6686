use crate::completeness::{evaluate_completeness, CompletenessReport};
use crate::config::Config;
use crate::error::{AlfError, Result};
use crate::model::WizardData;
use crate::reconcile::{dedupe_ids, find_dangling, ReconcileMode};
use crate::rules::Bucket;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetrics {
    pub learning_goals: usize,
    pub success_criteria: usize,
    pub standards: usize,
    pub phases: usize,
    pub milestones: usize,
    pub artifacts: usize,
    pub rubrics: usize,
    pub rubric_criteria: usize,
    pub dangling_references: usize,
    pub generated_at: DateTime<Utc>,
}

impl SnapshotMetrics {
    pub fn collect(data: &WizardData) -> Self {
        // Duplicate ids change which entity a reference resolves to; count on a
        // deduplicated copy so metrics match what export consumers see.
        let mut deduped = data.clone();
        dedupe_ids(&mut deduped, ReconcileMode::Flag);
        Self {
            learning_goals: data.learning_goals.len(),
            success_criteria: data.success_criteria.len(),
            standards: data.standards.len(),
            phases: data.phases.len(),
            milestones: data.milestones.len(),
            artifacts: data.artifacts.len(),
            rubrics: data.rubrics.len(),
            rubric_criteria: data.rubrics.iter().map(|r| r.criteria.len()).sum(),
            dangling_references: find_dangling(&deduped).len(),
            generated_at: Utc::now(),
        }
    }
}

/// Values merged into the record by [`build_wizard_snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotExtras {
    pub completeness: CompletenessReport,
    pub metrics: SnapshotMetrics,
}

impl SnapshotExtras {
    pub fn compute(data: &WizardData, config: &Config) -> Self {
        Self {
            completeness: evaluate_completeness(data, config),
            metrics: SnapshotMetrics::collect(data),
        }
    }
}

/// The wizard record extended with `completeness` and `metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    #[serde(flatten)]
    pub data: WizardData,
    pub completeness: CompletenessReport,
    pub metrics: SnapshotMetrics,
}

// ---------------------------------------------------------------------------
// Build / serialize
// ---------------------------------------------------------------------------

/// Merge `data` with the given extras. Pure.
pub fn build_wizard_snapshot(data: &WizardData, extras: SnapshotExtras) -> WizardSnapshot {
    WizardSnapshot {
        data: data.clone(),
        completeness: extras.completeness,
        metrics: extras.metrics,
    }
}

/// Build a snapshot with freshly computed completeness and metrics.
pub fn snapshot_for(data: &WizardData, config: &Config) -> WizardSnapshot {
    build_wizard_snapshot(data, SnapshotExtras::compute(data, config))
}

pub fn serialize_snapshot(snapshot: &WizardSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn parse_snapshot(text: &str) -> Result<WizardSnapshot> {
    Ok(serde_json::from_str(text)?)
}

// ---------------------------------------------------------------------------
// File export
// ---------------------------------------------------------------------------

pub fn snapshot_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}.json", at.format("%Y%m%dT%H%M%SZ"))
}

/// Write the snapshot as pretty JSON into `dir`. Any failure (unwritable
/// directory, serialization) surfaces as [`AlfError::Export`].
pub fn download_wizard_snapshot(snapshot: &WizardSnapshot, dir: &Path, prefix: &str) -> Result<PathBuf> {
    let text = serialize_snapshot(snapshot).map_err(|e| AlfError::Export(e.to_string()))?;
    let path = dir.join(snapshot_file_name(prefix, snapshot.metrics.generated_at));
    crate::io::atomic_write(&path, text.as_bytes())
        .map_err(|e| AlfError::Export(format!("{}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "wrote wizard snapshot");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Clipboard preview
// ---------------------------------------------------------------------------

/// Destination for preview text. Implementations report failure instead of
/// panicking so callers can fall back to showing the text.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> std::result::Result<(), String>;
}

/// Render the preview and hand it to `sink`. Returns the rendered text.
pub fn copy_snapshot_preview(snapshot: &WizardSnapshot, sink: &mut dyn ClipboardSink) -> Result<String> {
    let text = render_snapshot_preview(snapshot);
    sink.set_text(&text).map_err(AlfError::ClipboardUnavailable)?;
    Ok(text)
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "== {title} ==");
}

fn line(out: &mut String, label: &str, value: &str) {
    let shown = if value.trim().is_empty() { "(not set)" } else { value };
    let _ = writeln!(out, "{label}: {shown}");
}

fn bullets(out: &mut String, items: &[String]) {
    let mut any = false;
    for item in items.iter().filter(|i| !i.trim().is_empty()) {
        let _ = writeln!(out, "- {item}");
        any = true;
    }
    if !any {
        let _ = writeln!(out, "(none)");
    }
}

/// Plain-text rendering of a snapshot, in labelled sections.
pub fn render_snapshot_preview(snapshot: &WizardSnapshot) -> String {
    let d = &snapshot.data;
    let s = snapshot.completeness.summary;
    let mut out = String::new();

    let _ = writeln!(out, "ALF Project Snapshot");
    let _ = writeln!(
        out,
        "Readiness: {}% overall (core {}%, context {}%, progressive {}%)",
        s.overall, s.core, s.context, s.progressive
    );

    section(&mut out, "Context");
    match d.context() {
        Some(ctx) => {
            line(&mut out, "Grade level", &ctx.grade_level);
            line(&mut out, "Subjects", &ctx.subjects.join(", "));
            let count = if ctx.student_count > 0 {
                ctx.student_count.to_string()
            } else {
                String::new()
            };
            line(&mut out, "Students", &count);
            line(&mut out, "Time window", &ctx.time_window);
            line(&mut out, "Cadence", &ctx.cadence);
            line(&mut out, "Technology", &ctx.available_tech.join(", "));
            line(&mut out, "Materials", &ctx.available_materials.join(", "));
            line(&mut out, "Constraints", &ctx.constraints.join(", "));
        }
        None => {
            let _ = writeln!(out, "(not set)");
        }
    }

    section(&mut out, "Vision");
    line(&mut out, "Big idea", &d.big_idea);
    line(&mut out, "Essential question", &d.essential_question);
    if !d.motivation.trim().is_empty() {
        line(&mut out, "Motivation", &d.motivation);
    }

    section(&mut out, "Learning goals");
    bullets(&mut out, &d.learning_goals);

    section(&mut out, "Success criteria");
    bullets(&mut out, &d.success_criteria);

    section(&mut out, "Standards");
    let standards: Vec<String> = d
        .standards
        .iter()
        .filter(|st| !st.code.trim().is_empty())
        .map(|st| {
            if st.label.trim().is_empty() {
                format!("{} ({})", st.code, st.framework.label())
            } else {
                format!("{} {} ({})", st.code, st.label, st.framework.label())
            }
        })
        .collect();
    bullets(&mut out, &standards);

    section(&mut out, "Phases and milestones");
    if d.phases.is_empty() && d.milestones.is_empty() {
        let _ = writeln!(out, "(none)");
    }
    for phase in &d.phases {
        let _ = writeln!(out, "- {} [{}]", phase.name, phase.tier);
        for m in d
            .milestones
            .iter()
            .filter(|m| m.phase_id.as_deref() == Some(phase.id.as_str()))
        {
            let due = if m.due_date.is_empty() {
                String::new()
            } else {
                format!(" (due {})", m.due_date)
            };
            let _ = writeln!(out, "  * {}{}", m.name, due);
        }
    }
    let phase_ids: Vec<&str> = d.phases.iter().map(|p| p.id.as_str()).collect();
    for m in d
        .milestones
        .iter()
        .filter(|m| m.phase_id.as_deref().map_or(true, |p| !phase_ids.contains(&p)))
    {
        let _ = writeln!(out, "- (unphased) {}", m.name);
    }

    section(&mut out, "Artifacts");
    let artifacts: Vec<String> = d
        .artifacts
        .iter()
        .map(|a| {
            let rubrics: Vec<&str> = a
                .rubric_ids
                .iter()
                .filter_map(|rid| d.rubrics.iter().find(|r| &r.id == rid))
                .map(|r| r.name.as_str())
                .collect();
            if rubrics.is_empty() {
                a.name.clone()
            } else {
                format!("{} (assessed by {})", a.name, rubrics.join(", "))
            }
        })
        .collect();
    bullets(&mut out, &artifacts);

    section(&mut out, "Rubrics");
    if d.rubrics.is_empty() {
        let _ = writeln!(out, "(none)");
    }
    for r in &d.rubrics {
        let _ = writeln!(out, "- {} (scale {})", r.name, r.scale_label);
        for c in r.named_criteria() {
            let labels: Vec<String> = c
                .levels
                .iter()
                .enumerate()
                .map(|(i, level)| r.display_label(i, level))
                .collect();
            let _ = writeln!(out, "  * {}: {}", c.name, labels.join(" / "));
        }
    }

    if let Some(ex) = &d.exhibition {
        section(&mut out, "Exhibition");
        line(&mut out, "Format", &ex.format);
        line(&mut out, "Venue", &ex.venue);
        line(&mut out, "Date", &ex.date);
        line(&mut out, "Audience", &ex.audience.join(", "));
    }

    section(&mut out, "Still missing");
    let mut any_missing = false;
    for bucket in Bucket::all() {
        for item in &snapshot.completeness.bucket(*bucket).missing {
            let _ = writeln!(out, "- [{bucket}] {item}");
            any_missing = true;
        }
    }
    if !any_missing {
        let _ = writeln!(out, "(nothing)");
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DefaultPolicy;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> WizardData {
        WizardData::from_value(
            &json!({
                "projectContext": {"gradeLevel": "7", "subjects": ["science"], "studentCount": 26},
                "bigIdea": "Cities can be designed to cool themselves",
                "learningGoals": ["Measure surface temperature", "Propose shade plans"],
                "phases": [{"id": "p1", "name": "Investigate"}],
                "milestones": [{"id": "m1", "phaseId": "p1", "name": "Heat map", "dueDate": "2026-11-02"}],
                "artifacts": [{"id": "a1", "name": "Heat map", "rubricIds": ["r1", "ghost"]}],
                "rubrics": [{"id": "r1", "name": "Map rubric", "criteria": [{"name": "Data accuracy"}]}]
            }),
            &DefaultPolicy::default(),
        )
    }

    struct Recorder(Option<String>);

    impl ClipboardSink for Recorder {
        fn set_text(&mut self, text: &str) -> std::result::Result<(), String> {
            self.0 = Some(text.to_string());
            Ok(())
        }
    }

    struct Denied;

    impl ClipboardSink for Denied {
        fn set_text(&mut self, _text: &str) -> std::result::Result<(), String> {
            Err("permission denied".to_string())
        }
    }

    #[test]
    fn snapshot_merges_data_and_extras() {
        let config = Config::new("p");
        let snap = snapshot_for(&sample(), &config);
        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["bigIdea"], "Cities can be designed to cool themselves");
        assert!(v["completeness"]["summary"]["overall"].is_u64());
        assert_eq!(v["metrics"]["phases"], 1);
        assert_eq!(v["metrics"]["danglingReferences"], 1);
        assert!(v.get("data").is_none());
    }

    #[test]
    fn build_is_pure() {
        let data = sample();
        let extras = SnapshotExtras::compute(&data, &Config::new("p"));
        let a = build_wizard_snapshot(&data, extras.clone());
        let b = build_wizard_snapshot(&data, extras);
        assert_eq!(a, b);
    }

    #[test]
    fn serialize_parse_roundtrip() {
        let snap = snapshot_for(&sample(), &Config::new("p"));
        let text = serialize_snapshot(&snap).unwrap();
        assert!(text.contains("\n  \"bigIdea\""));
        assert_eq!(parse_snapshot(&text).unwrap(), snap);
    }

    #[test]
    fn roundtrip_preserves_arbitrary_floats() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let config = Config::new("p");
        let mut data = sample();
        for _ in 0..2000 {
            data.phases[0].confidence = rng.gen::<f64>();
            data.milestones[0].confidence = rng.gen::<f64>();
            data.rubrics[0].criteria[0].weight = rng.gen_range(0.0..10.0);
            data.rubrics[0].total_points = Some(rng.gen_range(0.0..100.0));
            let snap = snapshot_for(&data, &config);
            let back = parse_snapshot(&serialize_snapshot(&snap).unwrap()).unwrap();
            assert_eq!(back, snap, "confidence {}", data.phases[0].confidence);
        }
    }

    #[test]
    fn download_writes_file() {
        let dir = TempDir::new().unwrap();
        let snap = snapshot_for(&sample(), &Config::new("p"));
        let path = download_wizard_snapshot(&snap, &dir.path().join("exports"), "unit").unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("unit-"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_snapshot(&text).unwrap(), snap);
    }

    #[test]
    fn download_to_unwritable_target_is_export_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let snap = snapshot_for(&sample(), &Config::new("p"));
        let err = download_wizard_snapshot(&snap, &blocker, "unit").unwrap_err();
        assert!(matches!(err, AlfError::Export(_)));
    }

    #[test]
    fn preview_has_labelled_sections() {
        let snap = snapshot_for(&sample(), &Config::new("p"));
        let text = render_snapshot_preview(&snap);
        assert!(text.starts_with("ALF Project Snapshot"));
        assert!(text.contains("== Learning goals =="));
        assert!(text.contains("- Measure surface temperature"));
        assert!(text.contains("  * Heat map (due 2026-11-02)"));
        assert!(text.contains("Heat map (assessed by Map rubric)"));
        assert!(text.contains("Data accuracy: Beginning / Developing / Proficient / Advanced"));
        assert!(text.contains("[core] Essential question"));
        assert!(!text.trim_start().starts_with('{'));
    }

    #[test]
    fn copy_hands_text_to_sink() {
        let snap = snapshot_for(&sample(), &Config::new("p"));
        let mut sink = Recorder(None);
        let text = copy_snapshot_preview(&snap, &mut sink).unwrap();
        assert_eq!(sink.0.as_deref(), Some(text.as_str()));
    }

    #[test]
    fn copy_failure_is_reported() {
        let snap = snapshot_for(&sample(), &Config::new("p"));
        let err = copy_snapshot_preview(&snap, &mut Denied).unwrap_err();
        assert!(matches!(err, AlfError::ClipboardUnavailable(ref m) if m == "permission denied"));
    }

    #[test]
    fn file_name_uses_timestamp() {
        let at = DateTime::parse_from_rfc3339("2026-10-15T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(snapshot_file_name("alf", at), "alf-20261015T093000Z.json");
    }
}
