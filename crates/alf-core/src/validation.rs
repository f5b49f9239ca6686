use crate::config::Config;
use crate::model::WizardData;
use crate::rules::{default_rules, step_rules, EvalContext};
use crate::steps::WizardStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ValidationErrors
// ---------------------------------------------------------------------------

/// Field group → messages. Empty means the step may advance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

// ---------------------------------------------------------------------------
// Step validation
// ---------------------------------------------------------------------------

/// Run every rule that blocks `step` against `data`.
pub fn validate_step(step: WizardStep, data: &WizardData, config: &Config) -> ValidationErrors {
    let rules = default_rules();
    let ctx = EvalContext { data, config };
    let mut errors = ValidationErrors::new();
    for rule in step_rules(&rules, step) {
        if !rule.is_satisfied(&ctx) {
            errors.push(rule.field, (rule.message)(&ctx));
        }
    }
    errors
}

/// Validate every step up to and including `through`, stopping at the first
/// step with errors.
pub fn first_blocking_step(
    through: WizardStep,
    data: &WizardData,
    config: &Config,
) -> Option<(WizardStep, ValidationErrors)> {
    WizardStep::all()
        .iter()
        .copied()
        .take_while(|s| *s <= through)
        .map(|s| (s, validate_step(s, data, config)))
        .find(|(_, errors)| !errors.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
