use crate::types::{EntityKind, Tier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fallback confidence for entities whose stored confidence is missing or not a number.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Built-in tier fallback for each entity kind.
///
/// The split is deliberate and kept explicit: planning backbone entities fall
/// back to `core`, supporting material falls back to `scaffold`. Whether the two
/// groups should converge is a product decision; override per kind through
/// `tier_defaults` in `.alf/config.yaml`.
pub fn builtin_tier(kind: EntityKind) -> Tier {
    match kind {
        EntityKind::ProjectContext
        | EntityKind::Standard
        | EntityKind::Phase
        | EntityKind::Milestone
        | EntityKind::Checkpoint => Tier::Core,
        EntityKind::Artifact
        | EntityKind::Differentiation
        | EntityKind::Communication
        | EntityKind::Exhibition
        | EntityKind::Risk => Tier::Scaffold,
    }
}

// ---------------------------------------------------------------------------
// DefaultPolicy
// ---------------------------------------------------------------------------

/// The single table every normalizer consults for substituted defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultPolicy {
    tiers: BTreeMap<EntityKind, Tier>,
    confidence: f64,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self::new(&BTreeMap::new(), DEFAULT_CONFIDENCE)
    }
}

impl DefaultPolicy {
    /// Build the table from the built-in defaults with `overrides` layered on top.
    pub fn new(overrides: &BTreeMap<EntityKind, Tier>, confidence: f64) -> Self {
        let tiers = EntityKind::all()
            .iter()
            .map(|&kind| {
                let tier = overrides.get(&kind).copied().unwrap_or(builtin_tier(kind));
                (kind, tier)
            })
            .collect();
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            DEFAULT_CONFIDENCE
        };
        Self { tiers, confidence }
    }

    pub fn tier_for(&self, kind: EntityKind) -> Tier {
        self.tiers.get(&kind).copied().unwrap_or(builtin_tier(kind))
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Entries in kind order, for display.
    pub fn entries(&self) -> impl Iterator<Item = (EntityKind, Tier)> + '_ {
        self.tiers.iter().map(|(k, t)| (*k, *t))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_split_is_explicit() {
        let policy = DefaultPolicy::default();
        assert_eq!(policy.tier_for(EntityKind::Phase), Tier::Core);
        assert_eq!(policy.tier_for(EntityKind::Standard), Tier::Core);
        assert_eq!(policy.tier_for(EntityKind::Artifact), Tier::Scaffold);
        assert_eq!(policy.tier_for(EntityKind::Differentiation), Tier::Scaffold);
    }

    #[test]
    fn overrides_replace_single_kinds() {
        let mut overrides = BTreeMap::new();
        overrides.insert(EntityKind::Artifact, Tier::Core);
        let policy = DefaultPolicy::new(&overrides, 0.7);
        assert_eq!(policy.tier_for(EntityKind::Artifact), Tier::Core);
        assert_eq!(policy.tier_for(EntityKind::Risk), Tier::Scaffold);
        assert_eq!(policy.confidence(), 0.7);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(DefaultPolicy::new(&BTreeMap::new(), 3.0).confidence(), 1.0);
        assert_eq!(DefaultPolicy::new(&BTreeMap::new(), -1.0).confidence(), 0.0);
        assert_eq!(
            DefaultPolicy::new(&BTreeMap::new(), f64::NAN).confidence(),
            DEFAULT_CONFIDENCE
        );
    }

    #[test]
    fn every_kind_has_an_entry() {
        let policy = DefaultPolicy::default();
        assert_eq!(policy.entries().count(), EntityKind::all().len());
    }
}
