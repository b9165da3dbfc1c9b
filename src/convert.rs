use crate::domain::matrix::{
    Constraint, MatrixModel, Objective, Row, Token, INITIAL_CONSTRAINTS, INITIAL_VARIABLES,
};
use crate::domain::method::SolveMethod;
use crate::error::{ClientError, Result};
use crate::models::{ProblemFile, SolveRequest, WireConstraint};

/// Convert the editable model into the wire request. Empty or unparsable
/// cells become 0 here and nowhere earlier.
pub fn to_solve_request(
    objective: &Objective,
    constraints: &[Constraint],
    method: SolveMethod,
) -> SolveRequest {
    SolveRequest {
        objective: objective.sense,
        objective_function: coerce_all(&objective.coefficients),
        constraints: constraints.iter().map(to_wire_constraint).collect(),
        method,
    }
}

pub fn model_to_solve_request(model: &MatrixModel, method: SolveMethod) -> SolveRequest {
    to_solve_request(model.objective(), model.constraints(), method)
}

fn to_wire_constraint(constraint: &Constraint) -> WireConstraint {
    WireConstraint {
        coefficients: coerce_all(&constraint.coefficients),
        sign: constraint.relation,
        rhs: constraint.rhs.coerce(),
    }
}

fn coerce_all(tokens: &[Token]) -> Vec<f64> {
    tokens.iter().map(Token::coerce).collect()
}

/// Build a model from a problem file by replaying the model's own edit
/// operations, so the result satisfies the same shape invariants.
pub fn problem_to_model(problem: ProblemFile) -> Result<MatrixModel> {
    let n = problem.objective_function.len();
    if n == 0 {
        return Err(ClientError::InvalidProblem(
            "objective_function needs at least one coefficient".to_string(),
        ));
    }
    for (i, c) in problem.constraints.iter().enumerate() {
        if c.coefficients.len() != n {
            return Err(ClientError::InvalidProblem(format!(
                "constraint {} has {} coefficients, objective has {}",
                i + 1,
                c.coefficients.len(),
                n
            )));
        }
    }

    let mut model = MatrixModel::new();
    model.set_objective_sense(problem.objective);
    while model.variable_count() < n {
        model.add_variable();
    }
    while model.constraint_count() < problem.constraints.len() {
        model.add_constraint();
    }
    if model.variable_count() > n || model.constraint_count() > problem.constraints.len() {
        return Err(ClientError::InvalidProblem(format!(
            "a problem needs at least {} variables and {} constraint, got {} and {}",
            INITIAL_VARIABLES,
            INITIAL_CONSTRAINTS,
            n,
            problem.constraints.len()
        )));
    }

    for (col, token) in problem.objective_function.into_iter().enumerate() {
        model.set_coefficient(Row::Objective, col, token.into_text().as_str());
    }
    for (row, constraint) in problem.constraints.into_iter().enumerate() {
        for (col, token) in constraint.coefficients.into_iter().enumerate() {
            model.set_coefficient(Row::Constraint(row), col, token.into_text().as_str());
        }
        model.set_relation(row, constraint.sign);
        model.set_rhs(row, constraint.rhs.into_text().as_str());
    }
    Ok(model)
}
