//! Classification of the method-dependent solve response.
//!
//! The service sends one flat mapping per solution. A closed set of keys is
//! structural; every other key is a decision variable. The split happens once,
//! here, and the rest of the crate only sees the typed envelope.

use serde_json::{Map, Value};

use crate::domain::tableau::{parse_iterations, TableauSnapshot};
use crate::domain::tree::DecisionNode;
use crate::error::{ClientError, Result};

/// Keys with a fixed meaning. Anything else in a solution is a variable name.
pub const RESERVED_KEYS: [&str; 11] = [
    "graph_base64",
    "iterations",
    "error",
    "integer_solution",
    "dual_solution",
    "status_complement",
    "tableau",
    "basis",
    "tree_data",
    "Z",
    "status",
];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Optional sub-structures a response may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    TableauHistory,
    AnimatedArtifact,
    IntegerSolution,
    DualSolution,
    DecisionTree,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Facet<'a> {
    TableauHistory(&'a [TableauSnapshot]),
    AnimatedArtifact(&'a str),
    IntegerSolution(&'a Solution),
    DualSolution(&'a Solution),
    DecisionTree(&'a DecisionNode),
}

/// Known fields of a solution mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Structural {
    pub error: Option<String>,
    /// `Z`
    pub objective_value: Option<Value>,
    pub status: Option<String>,
    pub status_complement: Option<String>,
    pub graph_base64: Option<String>,
    pub iterations: Option<Vec<TableauSnapshot>>,
    pub integer_solution: Option<Box<Solution>>,
    pub dual_solution: Option<Box<Solution>>,
    pub tableau: Option<Value>,
    pub basis: Option<Value>,
    pub tree_data: Option<DecisionNode>,
}

/// Typed envelope over one solution mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Solution {
    pub structural: Structural,
    /// Decision variables in the order the service sent them
    pub variables: Map<String, Value>,
}

fn non_null(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn nested(key: &str, value: Value) -> Result<Option<Box<Solution>>> {
    match value {
        Value::Null => Ok(None),
        v @ Value::Object(_) => Ok(Some(Box::new(Solution::classify(v)?))),
        other => Err(ClientError::MalformedResponse(format!(
            "{} must be a mapping, got {}",
            key, other
        ))),
    }
}

impl Solution {
    /// Split a raw solution mapping into structural fields and variables.
    ///
    /// When `error` is present the facets are not decoded at all; only the
    /// message and status matter. Otherwise a present facet that breaks its
    /// shape (ragged tableau, duplicate tree ids) is rejected.
    pub fn classify(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ClientError::MalformedResponse(format!(
                    "solution must be a mapping, got {}",
                    other
                )))
            }
        };

        let has_error = map.get("error").is_some_and(|v| !v.is_null());
        let mut structural = Structural::default();
        let mut variables = Map::new();

        for (key, value) in map {
            match key.as_str() {
                "error" => structural.error = text(value),
                "status" => structural.status = text(value),
                "status_complement" => structural.status_complement = text(value),
                "Z" => structural.objective_value = non_null(value),
                "tableau" => structural.tableau = non_null(value),
                "basis" => structural.basis = non_null(value),
                _ if has_error && is_reserved_key(&key) => {}
                "graph_base64" => {
                    structural.graph_base64 = match value {
                        Value::Null => None,
                        Value::String(s) if s.is_empty() => None,
                        Value::String(s) => Some(s),
                        other => {
                            return Err(ClientError::MalformedResponse(format!(
                                "graph_base64 must be a string, got {}",
                                other
                            )))
                        }
                    }
                }
                "iterations" => {
                    structural.iterations = match value {
                        Value::Null => None,
                        v => Some(parse_iterations(v)?),
                    }
                }
                "integer_solution" => structural.integer_solution = nested(&key, value)?,
                "dual_solution" => structural.dual_solution = nested(&key, value)?,
                "tree_data" => {
                    structural.tree_data = match value {
                        Value::Null => None,
                        v => Some(DecisionNode::from_value(v)?),
                    }
                }
                _ => {
                    variables.insert(key, value);
                }
            }
        }

        Ok(Solution {
            structural,
            variables,
        })
    }

    pub fn is_error(&self) -> bool {
        self.structural.error.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.structural.error.as_deref()
    }

    /// No error and no degeneracy/feasibility annotation.
    pub fn is_feasible(&self) -> bool {
        self.structural.status_complement.is_none() && !self.is_error()
    }

    pub fn objective_value(&self) -> Option<&Value> {
        self.structural.objective_value.as_ref()
    }

    pub fn variable_assignments(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Entries named like decision variables (`x1`, `x2`, ...).
    pub fn decision_entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variables.iter().filter(|(k, _)| k.starts_with('x'))
    }

    /// Facet lookup. Every facet is absent on an error response.
    pub fn facet(&self, kind: FacetKind) -> Option<Facet<'_>> {
        if self.is_error() {
            return None;
        }
        let s = &self.structural;
        match kind {
            FacetKind::TableauHistory => s
                .iterations
                .as_deref()
                .filter(|its| !its.is_empty())
                .map(Facet::TableauHistory),
            FacetKind::AnimatedArtifact => s.graph_base64.as_deref().map(Facet::AnimatedArtifact),
            FacetKind::IntegerSolution => s.integer_solution.as_deref().map(Facet::IntegerSolution),
            FacetKind::DualSolution => s.dual_solution.as_deref().map(Facet::DualSolution),
            FacetKind::DecisionTree => s.tree_data.as_ref().map(Facet::DecisionTree),
        }
    }

    pub fn iterations(&self) -> Option<&[TableauSnapshot]> {
        match self.facet(FacetKind::TableauHistory) {
            Some(Facet::TableauHistory(its)) => Some(its),
            _ => None,
        }
    }

    pub fn graph_base64(&self) -> Option<&str> {
        match self.facet(FacetKind::AnimatedArtifact) {
            Some(Facet::AnimatedArtifact(b64)) => Some(b64),
            _ => None,
        }
    }

    pub fn integer_solution(&self) -> Option<&Solution> {
        match self.facet(FacetKind::IntegerSolution) {
            Some(Facet::IntegerSolution(s)) => Some(s),
            _ => None,
        }
    }

    pub fn dual_solution(&self) -> Option<&Solution> {
        match self.facet(FacetKind::DualSolution) {
            Some(Facet::DualSolution(s)) => Some(s),
            _ => None,
        }
    }

    pub fn tree(&self) -> Option<&DecisionNode> {
        match self.facet(FacetKind::DecisionTree) {
            Some(Facet::DecisionTree(t)) => Some(t),
            _ => None,
        }
    }
}
