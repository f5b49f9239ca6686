use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// How committed a planned item is: must-have, supporting, or stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Core,
    Scaffold,
    Aspirational,
}

impl Tier {
    pub fn all() -> &'static [Tier] {
        &[Tier::Core, Tier::Scaffold, Tier::Aspirational]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Core => "core",
            Tier::Scaffold => "scaffold",
            Tier::Aspirational => "aspirational",
        }
    }

    /// Strict membership test. No trimming or case folding: a stored value
    /// either is one of the three tiers or gets the caller's fallback.
    pub fn parse(s: &str) -> Option<Tier> {
        Tier::all().iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Entity types that carry a `tier`. Keys of the tier default-policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ProjectContext,
    Standard,
    Phase,
    Milestone,
    Artifact,
    Differentiation,
    Checkpoint,
    Communication,
    Exhibition,
    Risk,
}

impl EntityKind {
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::ProjectContext,
            EntityKind::Standard,
            EntityKind::Phase,
            EntityKind::Milestone,
            EntityKind::Artifact,
            EntityKind::Differentiation,
            EntityKind::Checkpoint,
            EntityKind::Communication,
            EntityKind::Exhibition,
            EntityKind::Risk,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::ProjectContext => "project_context",
            EntityKind::Standard => "standard",
            EntityKind::Phase => "phase",
            EntityKind::Milestone => "milestone",
            EntityKind::Artifact => "artifact",
            EntityKind::Differentiation => "differentiation",
            EntityKind::Checkpoint => "checkpoint",
            EntityKind::Communication => "communication",
            EntityKind::Exhibition => "exhibition",
            EntityKind::Risk => "risk",
        }
    }

    /// Prefix used when generating ids for this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::ProjectContext => "ctx",
            EntityKind::Standard => "std",
            EntityKind::Phase => "phase",
            EntityKind::Milestone => "ms",
            EntityKind::Artifact => "artifact",
            EntityKind::Differentiation => "diff",
            EntityKind::Checkpoint => "check",
            EntityKind::Communication => "comm",
            EntityKind::Exhibition => "exhibit",
            EntityKind::Risk => "risk",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StandardFramework
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardFramework {
    Ngss,
    CcssMath,
    CcssEla,
    C3,
    Iste,
    Custom,
}

impl StandardFramework {
    pub fn all() -> &'static [StandardFramework] {
        &[
            StandardFramework::Ngss,
            StandardFramework::CcssMath,
            StandardFramework::CcssEla,
            StandardFramework::C3,
            StandardFramework::Iste,
            StandardFramework::Custom,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StandardFramework::Ngss => "ngss",
            StandardFramework::CcssMath => "ccss_math",
            StandardFramework::CcssEla => "ccss_ela",
            StandardFramework::C3 => "c3",
            StandardFramework::Iste => "iste",
            StandardFramework::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StandardFramework::Ngss => "Next Generation Science Standards",
            StandardFramework::CcssMath => "Common Core Math",
            StandardFramework::CcssEla => "Common Core ELA",
            StandardFramework::C3 => "C3 Social Studies",
            StandardFramework::Iste => "ISTE Standards for Students",
            StandardFramework::Custom => "Custom",
        }
    }

    pub fn parse(s: &str) -> Option<StandardFramework> {
        StandardFramework::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
    }
}

impl fmt::Display for StandardFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Likelihood
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Likelihood {
    Low,
    Medium,
    High,
}

impl Likelihood {
    pub fn as_str(self) -> &'static str {
        match self {
            Likelihood::Low => "low",
            Likelihood::Medium => "medium",
            Likelihood::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Likelihood> {
        match s {
            "low" => Some(Likelihood::Low),
            "medium" => Some(Likelihood::Medium),
            "high" => Some(Likelihood::High),
            _ => None,
        }
    }
}

impl fmt::Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
