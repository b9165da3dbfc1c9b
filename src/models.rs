use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::matrix::{ObjectiveSense, Relation};
use crate::domain::method::SolveMethod;

// ---------- API (wire) types: owned & serde-friendly ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireConstraint {
    pub coefficients: Vec<f64>,
    pub sign: Relation,
    pub rhs: f64,
}

/// Body of `POST api/solve/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveRequest {
    pub objective: ObjectiveSense,
    pub objective_function: Vec<f64>,
    pub constraints: Vec<WireConstraint>,
    pub method: SolveMethod,
}

/// Success body: a status message and the method-dependent solution mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct SolveReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub solution: Value,
}

/// Failure body sent with a non-success status.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<String>,
}

/// On-disk problem description accepted by the CLI. Cells are kept as the
/// user typed them; empty strings mean "untouched".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemFile {
    #[serde(default)]
    pub objective: ObjectiveSense,
    #[serde(default)]
    pub objective_function: Vec<TokenInput>,
    #[serde(default)]
    pub constraints: Vec<ConstraintInput>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintInput {
    #[serde(default)]
    pub coefficients: Vec<TokenInput>,
    #[serde(default)]
    pub sign: Relation,
    #[serde(default)]
    pub rhs: TokenInput,
}

/// A cell written either as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenInput {
    Number(f64),
    Text(String),
}

impl Default for TokenInput {
    fn default() -> Self {
        TokenInput::Text(String::new())
    }
}

impl TokenInput {
    pub fn into_text(self) -> String {
        match self {
            TokenInput::Number(n) => n.to_string(),
            TokenInput::Text(s) => s,
        }
    }
}
