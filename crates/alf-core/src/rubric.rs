use crate::coerce::{
    bool_or, count_or, field, id_or_generate, number_or, opt_number, string_list, string_or,
};
use crate::ids::generate_id;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

pub const DEFAULT_SCALE_LABEL: &str = "1-4";
const MAX_LEVELS: u32 = 10;
const DEFAULT_WEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// RubricScale
// ---------------------------------------------------------------------------

/// An inclusive integer scale such as `1-4` or `0-3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricScale {
    pub min: u32,
    pub max: u32,
}

static SCALE_RE: OnceLock<Regex> = OnceLock::new();

fn scale_re() -> &'static Regex {
    SCALE_RE.get_or_init(|| Regex::new(r"^\s*(\d{1,3})\s*-\s*(\d{1,3})\s*$").unwrap())
}

impl Default for RubricScale {
    fn default() -> Self {
        Self { min: 1, max: 4 }
    }
}

impl RubricScale {
    /// Parse `"a-b"` with `a < b` and at most ten levels.
    pub fn parse(label: &str) -> Option<Self> {
        let caps = scale_re().captures(label)?;
        let min: u32 = caps[1].parse().ok()?;
        let max: u32 = caps[2].parse().ok()?;
        if min >= max || max - min + 1 > MAX_LEVELS {
            return None;
        }
        Some(Self { min, max })
    }

    /// Unparseable labels are treated as the default `1-4` scale.
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or_default()
    }

    pub fn level_count(self) -> usize {
        (self.max - self.min + 1) as usize
    }

    /// Label for the level at `index` (0-based from the bottom of the scale).
    pub fn level_label(self, index: usize) -> String {
        let named: &[&str] = match self.level_count() {
            3 => &["Emerging", "Proficient", "Advanced"],
            4 => &["Beginning", "Developing", "Proficient", "Advanced"],
            5 => &[
                "Beginning",
                "Developing",
                "Proficient",
                "Accomplished",
                "Exemplary",
            ],
            _ => &[],
        };
        named
            .get(index)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("Level {}", self.min as usize + index))
    }

    /// Student-facing "I can" phrasing for four-level scales.
    pub fn student_label(self, index: usize) -> Option<&'static str> {
        if self.level_count() != 4 {
            return None;
        }
        ["Just starting", "Getting there", "Got it", "Going beyond"]
            .get(index)
            .copied()
    }

    pub fn default_levels(self) -> Vec<Level> {
        (0..self.level_count())
            .map(|i| Level {
                value: self.min + i as u32,
                label: self.level_label(i),
                descriptor: String::new(),
            })
            .collect()
    }
}

impl fmt::Display for RubricScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub value: u32,
    pub label: String,
    pub descriptor: String,
}

impl Level {
    fn from_value(v: &Value, index: usize, scale: RubricScale) -> Self {
        Self {
            value: count_or(v, "value", scale.min + index as u32),
            label: string_or(v, "label", &scale.level_label(index)),
            descriptor: string_or(v, "descriptor", ""),
        }
    }
}

// ---------------------------------------------------------------------------
// Criterion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub levels: Vec<Level>,
    /// Standard codes this criterion assesses. Soft references into `standards`.
    pub standards_alignment: Vec<String>,
}

impl Criterion {
    pub fn blank(scale: RubricScale) -> Self {
        Self {
            id: generate_id("crit"),
            name: String::new(),
            weight: DEFAULT_WEIGHT,
            levels: scale.default_levels(),
            standards_alignment: Vec::new(),
        }
    }

    /// Normalize against the owning rubric's scale. A `levels` value that is
    /// not an array is replaced by the scale's default level list.
    pub fn from_value(v: &Value, scale: RubricScale) -> Self {
        let levels = match field(v, "levels") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| Level::from_value(item, i, scale))
                .collect(),
            _ => scale.default_levels(),
        };
        Self {
            id: id_or_generate(v, "crit"),
            name: string_or(v, "name", ""),
            weight: number_or(v, "weight", DEFAULT_WEIGHT),
            levels,
            standards_alignment: string_list(v, "standardsAlignment"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rubric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rubric {
    pub id: String,
    pub name: String,
    pub scale_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<f64>,
    pub use_student_language: bool,
    pub criteria: Vec<Criterion>,
}

impl Rubric {
    pub fn blank() -> Self {
        let scale = RubricScale::default();
        Self {
            id: generate_id("rubric"),
            name: String::new(),
            scale_label: DEFAULT_SCALE_LABEL.to_string(),
            total_points: None,
            use_student_language: false,
            criteria: vec![Criterion::blank(scale)],
        }
    }

    pub fn from_value(v: &Value) -> Self {
        let scale_label = string_or(v, "scaleLabel", DEFAULT_SCALE_LABEL);
        let scale = RubricScale::from_label(&scale_label);
        let criteria = match field(v, "criteria") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| Criterion::from_value(item, scale))
                .collect(),
            _ => vec![Criterion::blank(scale)],
        };
        Self {
            id: id_or_generate(v, "rubric"),
            name: string_or(v, "name", ""),
            scale_label,
            total_points: opt_number(v, "totalPoints"),
            use_student_language: bool_or(v, "useStudentLanguage", false),
            criteria,
        }
    }

    pub fn scale(&self) -> RubricScale {
        RubricScale::from_label(&self.scale_label)
    }

    /// Criteria with a non-blank name.
    pub fn named_criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter().filter(|c| !c.name.trim().is_empty())
    }

    /// Level label as shown to readers of this rubric.
    pub fn display_label(&self, index: usize, level: &Level) -> String {
        if self.use_student_language {
            if let Some(label) = self.scale().student_label(index) {
                return label.to_string();
            }
        }
        level.label.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
