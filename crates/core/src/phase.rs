//! Expert phases
//!
//! The backend reports which "expert" persona is active as an open string.
//! This module maps it onto the four known phases and their display metadata.
//! Phase changes always originate from the backend; nothing here advances a
//! phase.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Registration and profile setup.
    #[default]
    Intake,
    /// Interview that works out what the learner needs.
    NeedsAnalysis,
    /// Teaching through the approved curriculum.
    Instruction,
    /// Knowledge check and certification.
    Assessment,
}

/// Gradient used to tint everything the active expert owns on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub from: &'static str,
    pub to: &'static str,
}

/// Display metadata for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpertProfile {
    pub phase: Phase,
    pub name: &'static str,
    pub description: &'static str,
    pub theme: Theme,
    pub avatar: &'static str,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Intake,
        Phase::NeedsAnalysis,
        Phase::Instruction,
        Phase::Assessment,
    ];

    /// Maps the backend's expert identifier to a phase. Unknown or absent
    /// identifiers fall back to [`Phase::Intake`].
    pub fn from_backend_id(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            Some("registrator") => Phase::Intake,
            Some("interview") => Phase::NeedsAnalysis,
            Some("teacher") => Phase::Instruction,
            Some("test") => Phase::Assessment,
            _ => Phase::Intake,
        }
    }

    /// The identifier the backend uses for this phase.
    pub fn backend_id(self) -> &'static str {
        match self {
            Phase::Intake => "registrator",
            Phase::NeedsAnalysis => "interview",
            Phase::Instruction => "teacher",
            Phase::Assessment => "test",
        }
    }

    pub fn profile(self) -> ExpertProfile {
        match self {
            Phase::Intake => ExpertProfile {
                phase: self,
                name: "Consultant",
                description: "Registration and profile setup",
                theme: Theme {
                    from: "blue-500",
                    to: "indigo-600",
                },
                avatar: "👋",
            },
            Phase::NeedsAnalysis => ExpertProfile {
                phase: self,
                name: "Analyst",
                description: "Needs analysis and planning",
                theme: Theme {
                    from: "purple-500",
                    to: "pink-600",
                },
                avatar: "🎯",
            },
            Phase::Instruction => ExpertProfile {
                phase: self,
                name: "Mentor",
                description: "Learning and skill building",
                theme: Theme {
                    from: "emerald-500",
                    to: "teal-600",
                },
                avatar: "📚",
            },
            Phase::Assessment => ExpertProfile {
                phase: self,
                name: "Examiner",
                description: "Knowledge assessment and certification",
                theme: Theme {
                    from: "amber-500",
                    to: "orange-600",
                },
                avatar: "⭐",
            },
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.backend_id())
    }
}

/// Resolves the backend-reported expert id straight to its display profile.
pub fn resolve_expert(id: Option<&str>) -> ExpertProfile {
    Phase::from_backend_id(id).profile()
}
