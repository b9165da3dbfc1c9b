use log::debug;
use serde::{Deserialize, Serialize};

/// Number of variables in a freshly reset model.
pub const INITIAL_VARIABLES: usize = 2;
/// Number of constraints in a freshly reset model.
pub const INITIAL_CONSTRAINTS: usize = 1;

/// Optimization sense of the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectiveSense {
    #[default]
    #[serde(rename = "max")]
    Maximize,
    #[serde(rename = "min")]
    Minimize,
}

impl ObjectiveSense {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ObjectiveSense::Maximize => "max",
            ObjectiveSense::Minimize => "min",
        }
    }
}

/// Relation between a constraint's left-hand side and its rhs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Relation {
    #[default]
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "=")]
    Equal,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
            Relation::Equal => "=",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s.trim() {
            "<=" | "≤" => Some(Relation::LessOrEqual),
            ">=" | "≥" => Some(Relation::GreaterOrEqual),
            "=" | "==" => Some(Relation::Equal),
            _ => None,
        }
    }
}

/// A user-typed numeric cell. Empty means "untouched", which is kept apart
/// from an explicit zero until the model is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn empty() -> Self {
        Token(String::new())
    }

    pub fn new(text: impl Into<String>) -> Self {
        Token(text.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Submission-time value: empty, unparsable or non-finite text becomes 0.
    pub fn coerce(&self) -> f64 {
        match self.0.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::new(s)
    }
}

/// Which row of the matrix an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Objective,
    Constraint(usize),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Objective {
    pub sense: ObjectiveSense,
    pub coefficients: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub coefficients: Vec<Token>,
    #[serde(rename = "sign")]
    pub relation: Relation,
    pub rhs: Token,
}

impl Constraint {
    fn blank(n: usize) -> Self {
        Constraint {
            coefficients: vec![Token::empty(); n],
            relation: Relation::LessOrEqual,
            rhs: Token::empty(),
        }
    }
}

/// The editable LP model. Every constraint row always has exactly as many
/// coefficients as the objective; the fields are private so only the
/// operations below can change the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixModel {
    objective: Objective,
    constraints: Vec<Constraint>,
}

impl Default for MatrixModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixModel {
    /// Canonical starting shape: two variables, one `<=` constraint, all cells empty.
    pub fn new() -> Self {
        MatrixModel {
            objective: Objective {
                sense: ObjectiveSense::Maximize,
                coefficients: vec![Token::empty(); INITIAL_VARIABLES],
            },
            constraints: (0..INITIAL_CONSTRAINTS)
                .map(|_| Constraint::blank(INITIAL_VARIABLES))
                .collect(),
        }
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn variable_count(&self) -> usize {
        self.objective.coefficients.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn set_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.sense = sense;
    }

    /// Replace one cell. Returns `false` (and changes nothing) when the
    /// row or column does not exist.
    pub fn set_coefficient(&mut self, row: Row, col: usize, token: impl Into<Token>) -> bool {
        let cells = match row {
            Row::Objective => &mut self.objective.coefficients,
            Row::Constraint(i) => match self.constraints.get_mut(i) {
                Some(c) => &mut c.coefficients,
                None => {
                    debug!("ignoring coefficient edit on missing constraint {}", i);
                    return false;
                }
            },
        };
        match cells.get_mut(col) {
            Some(cell) => {
                *cell = token.into();
                true
            }
            None => {
                debug!("ignoring coefficient edit on missing column {}", col);
                false
            }
        }
    }

    pub fn set_relation(&mut self, row: usize, relation: Relation) -> bool {
        match self.constraints.get_mut(row) {
            Some(c) => {
                c.relation = relation;
                true
            }
            None => false,
        }
    }

    pub fn set_rhs(&mut self, row: usize, token: impl Into<Token>) -> bool {
        match self.constraints.get_mut(row) {
            Some(c) => {
                c.rhs = token.into();
                true
            }
            None => false,
        }
    }

    /// Append one empty column to the objective and to every constraint.
    pub fn add_variable(&mut self) {
        self.objective.coefficients.push(Token::empty());
        for constraint in &mut self.constraints {
            constraint.coefficients.push(Token::empty());
        }
        debug!("model now has {} variables", self.variable_count());
    }

    /// Append a blank `<=` constraint sized to the current variable count.
    pub fn add_constraint(&mut self) {
        self.constraints.push(Constraint::blank(self.variable_count()));
        debug!("model now has {} constraints", self.constraint_count());
    }

    pub fn reset(&mut self) {
        *self = MatrixModel::new();
    }

    /// Human preview of the objective, e.g. `Max Z = c1x1 + c2x2`.
    pub fn objective_preview(&self) -> String {
        let sense = match self.objective.sense {
            ObjectiveSense::Maximize => "Max",
            ObjectiveSense::Minimize => "Min",
        };
        let terms: Vec<String> = (1..=self.variable_count())
            .map(|i| format!("c{}x{}", i, i))
            .collect();
        format!("{} Z = {}", sense, terms.join(" + "))
    }

    fn is_rectangular(&self) -> bool {
        let n = self.variable_count();
        self.constraints.iter().all(|c| c.coefficients.len() == n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_model_has_canonical_shape() {
        let model = MatrixModel::new();
        assert_eq!(model.variable_count(), 2);
        assert_eq!(model.constraint_count(), 1);
        assert_eq!(model.objective().sense, ObjectiveSense::Maximize);
        let c = &model.constraints()[0];
        assert_eq!(c.relation, Relation::LessOrEqual);
        assert!(c.rhs.is_empty());
        assert!(c.coefficients.iter().all(Token::is_empty));
    }

    #[test]
    fn test_mixed_add_sequence_keeps_rows_rectangular() {
        let mut model = MatrixModel::new();
        let ops = [true, false, false, true, true, false, true, false, true, true];
        for add_var in ops {
            if add_var {
                model.add_variable();
            } else {
                model.add_constraint();
            }
            assert!(model.is_rectangular());
        }
        assert_eq!(model.variable_count(), 2 + 6);
        assert_eq!(model.constraint_count(), 1 + 4);
    }

    #[test]
    fn test_add_variable_does_not_change_constraint_count() {
        let mut model = MatrixModel::new();
        model.add_constraint();
        model.add_variable();
        assert_eq!(model.constraint_count(), 2);
        assert_eq!(model.variable_count(), 3);
    }

    #[test]
    fn test_add_constraint_does_not_change_variable_count() {
        let mut model = MatrixModel::new();
        model.add_variable();
        model.add_constraint();
        assert_eq!(model.variable_count(), 3);
        assert_eq!(model.constraints()[1].coefficients.len(), 3);
    }

    #[test]
    fn test_add_variable_keeps_existing_tokens() {
        let mut model = MatrixModel::new();
        assert!(model.set_coefficient(Row::Objective, 1, "4"));
        assert!(model.set_coefficient(Row::Constraint(0), 0, "1.5"));
        model.add_variable();
        assert_eq!(model.objective().coefficients[1].as_str(), "4");
        assert_eq!(model.constraints()[0].coefficients[0].as_str(), "1.5");
        assert!(model.objective().coefficients[2].is_empty());
    }

    #[test]
    fn test_set_coefficient_given_out_of_range_should_be_noop() {
        let mut model = MatrixModel::new();
        let before = model.clone();
        assert!(!model.set_coefficient(Row::Objective, 2, "9"));
        assert!(!model.set_coefficient(Row::Constraint(3), 0, "9"));
        assert!(!model.set_relation(1, Relation::Equal));
        assert!(!model.set_rhs(5, "1"));
        assert_eq!(model, before);
    }

    #[test]
    fn test_sense_change_has_no_shape_effect() {
        let mut model = MatrixModel::new();
        model.set_objective_sense(ObjectiveSense::Minimize);
        assert_eq!(model.variable_count(), 2);
        assert_eq!(model.objective_preview(), "Min Z = c1x1 + c2x2");
    }

    #[test]
    fn test_reset_restores_starting_shape() {
        let mut model = MatrixModel::new();
        model.add_variable();
        model.add_constraint();
        model.set_rhs(1, "7");
        model.set_objective_sense(ObjectiveSense::Minimize);
        model.reset();
        assert_eq!(model, MatrixModel::new());
    }

    #[test]
    fn test_token_coercion() {
        assert_eq!(Token::empty().coerce(), 0.0);
        assert_eq!(Token::new(" 2.5 ").coerce(), 2.5);
        assert_eq!(Token::new("-3").coerce(), -3.0);
        assert_eq!(Token::new("abc").coerce(), 0.0);
        assert_eq!(Token::new("inf").coerce(), 0.0);
        assert_eq!(Token::new("NaN").coerce(), 0.0);
    }

    #[test]
    fn test_relation_symbols() {
        assert_eq!(Relation::from_symbol(">="), Some(Relation::GreaterOrEqual));
        assert_eq!(Relation::from_symbol("≤"), Some(Relation::LessOrEqual));
        assert_eq!(Relation::from_symbol("<"), None);
        assert_eq!(Relation::Equal.symbol(), "=");
    }
}
