use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ClientError;

/// Solving methods accepted by the solve endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMethod {
    #[default]
    Auto,
    Graphical,
    Simplex,
    BigM,
    TwoPhase,
    Dual,
    BranchAndBound,
}

/// How a result should be laid out. Chosen from the requested method only,
/// never from which facets the response happens to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Flat result panel, primal labelling
    Standard,
    /// Flat result panel, recovery block labelled as dual-derived
    Dual,
    /// Decision tree view; the flat panel is suppressed
    Tree,
}

/// Translate display separators to the wire separator (`big-m` -> `big_m`).
pub fn normalize_method_id(id: &str) -> String {
    id.trim().to_lowercase().replace('-', "_")
}

impl SolveMethod {
    pub const ALL: [SolveMethod; 7] = [
        SolveMethod::Auto,
        SolveMethod::Graphical,
        SolveMethod::Simplex,
        SolveMethod::BigM,
        SolveMethod::TwoPhase,
        SolveMethod::Dual,
        SolveMethod::BranchAndBound,
    ];

    /// Parse either the display or the wire form (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_method_id(s).as_str() {
            "auto" => Some(SolveMethod::Auto),
            "graphical" => Some(SolveMethod::Graphical),
            "simplex" => Some(SolveMethod::Simplex),
            "big_m" => Some(SolveMethod::BigM),
            "two_phase" => Some(SolveMethod::TwoPhase),
            "dual" => Some(SolveMethod::Dual),
            "branch_and_bound" => Some(SolveMethod::BranchAndBound),
            _ => None,
        }
    }

    /// Identifier sent to the endpoint
    pub fn wire_name(&self) -> &'static str {
        match self {
            SolveMethod::Auto => "auto",
            SolveMethod::Graphical => "graphical",
            SolveMethod::Simplex => "simplex",
            SolveMethod::BigM => "big_m",
            SolveMethod::TwoPhase => "two_phase",
            SolveMethod::Dual => "dual",
            SolveMethod::BranchAndBound => "branch_and_bound",
        }
    }

    /// Hyphenated form used by the presentation layer
    pub fn display_name(&self) -> &'static str {
        match self {
            SolveMethod::BigM => "big-m",
            SolveMethod::TwoPhase => "two-phase",
            SolveMethod::BranchAndBound => "branch-and-bound",
            other => other.wire_name(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SolveMethod::Auto => "Automatic",
            SolveMethod::Graphical => "Graphical",
            SolveMethod::Simplex => "Simplex",
            SolveMethod::BigM => "Big M",
            SolveMethod::TwoPhase => "Two-Phase",
            SolveMethod::Dual => "Dual Simplex",
            SolveMethod::BranchAndBound => "Branch & Bound",
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        match self {
            SolveMethod::Dual => DisplayMode::Dual,
            SolveMethod::BranchAndBound => DisplayMode::Tree,
            _ => DisplayMode::Standard,
        }
    }
}

impl FromStr for SolveMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolveMethod::parse(s).ok_or_else(|| ClientError::UnknownMethod(s.to_string()))
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for SolveMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}
