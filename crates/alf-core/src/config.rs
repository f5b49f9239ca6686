use crate::error::{AlfError, Result};
use crate::paths;
use crate::policy::{DefaultPolicy, DEFAULT_CONFIDENCE};
use crate::types::{EntityKind, Tier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Minimums shared by step validation and the completeness checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_min_learning_goals")]
    pub min_learning_goals: usize,
    #[serde(default = "default_min_success_criteria")]
    pub min_success_criteria: usize,
    #[serde(default = "default_min_big_idea_chars")]
    pub min_big_idea_chars: usize,
    #[serde(default = "default_min_essential_question_chars")]
    pub min_essential_question_chars: usize,
}

fn default_min_learning_goals() -> usize {
    2
}

fn default_min_success_criteria() -> usize {
    2
}

fn default_min_big_idea_chars() -> usize {
    20
}

fn default_min_essential_question_chars() -> usize {
    10
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_learning_goals: default_min_learning_goals(),
            min_success_criteria: default_min_success_criteria(),
            min_big_idea_chars: default_min_big_idea_chars(),
            min_essential_question_chars: default_min_essential_question_chars(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output directory; relative paths resolve against the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "alf-wizard-snapshot".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_prefix: default_file_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    /// Per-kind tier fallbacks layered over the built-in policy.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tier_defaults: BTreeMap<EntityKind, Tier>,
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_version() -> u32 {
    1
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            tier_defaults: BTreeMap::new(),
            default_confidence: DEFAULT_CONFIDENCE,
            thresholds: Thresholds::default(),
            export: ExportConfig::default(),
        }
    }

    pub fn policy(&self) -> DefaultPolicy {
        DefaultPolicy::new(&self.tier_defaults, self.default_confidence)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(AlfError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !(0.0..=1.0).contains(&self.default_confidence) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default_confidence {} is outside [0, 1] and will be clamped",
                    self.default_confidence
                ),
            });
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("min_learning_goals", t.min_learning_goals),
            ("min_success_criteria", t.min_success_criteria),
        ] {
            if value == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("thresholds.{name} is 0: the check always passes"),
                });
            }
        }

        if self.export.file_prefix.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "export.file_prefix is empty".to_string(),
            });
        }

        if self.export.file_prefix.contains(['/', '\\']) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "export.file_prefix '{}' must not contain path separators",
                    self.export.file_prefix
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("volcano-unit");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.project.name, "volcano-unit");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.thresholds, Thresholds::default());
        assert!(!yaml.contains("tier_defaults"));
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: p\n").unwrap();
        assert_eq!(cfg.thresholds.min_learning_goals, 2);
        assert_eq!(cfg.export.file_prefix, "alf-wizard-snapshot");
        assert_eq!(cfg.default_confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn tier_overrides_flow_into_policy() {
        let yaml = "project:\n  name: p\ntier_defaults:\n  artifact: core\n  phase: aspirational\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let policy = cfg.policy();
        assert_eq!(policy.tier_for(EntityKind::Artifact), Tier::Core);
        assert_eq!(policy.tier_for(EntityKind::Phase), Tier::Aspirational);
        assert_eq!(policy.tier_for(EntityKind::Risk), Tier::Scaffold);
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(AlfError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("p");
        cfg.thresholds.min_big_idea_chars = 40;
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.thresholds.min_big_idea_chars, 40);
    }

    #[test]
    fn validate_clean_config() {
        assert!(Config::new("p").validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::new("p");
        cfg.default_confidence = 1.5;
        cfg.thresholds.min_learning_goals = 0;
        cfg.export.file_prefix = "a/b".to_string();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }
}
