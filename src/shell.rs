use std::path::PathBuf;

use crate::domain::matrix::{MatrixModel, ObjectiveSense, Relation, Row};
use crate::domain::method::SolveMethod;

pub const HELP: &str = "\
commands:
  max | min                  set the objective sense
  var                        add a variable
  con                        add a constraint
  set <obj|N> <col> <value>  edit a coefficient (N and col are 1-based)
  sign <N> <<=|>=|=>         set the relation of constraint N
  rhs <N> <value>            set the right-hand side of constraint N
  method <name>              auto, graphical, simplex, big-m, two-phase, dual, branch-and-bound
  solve                      send the model to the solver
  select <node id>           select a branch-and-bound node
  replay                     restart the animated graph
  save-graph <path>          write the graph bytes to a file
  show                       print the model and the current result
  reset                      start over
  quit";

/// One line of shell input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Sense(ObjectiveSense),
    AddVariable,
    AddConstraint,
    Set { row: Row, col: usize, value: String },
    Sign { row: usize, relation: Relation },
    Rhs { row: usize, value: String },
    Method(SolveMethod),
    Solve,
    Select(String),
    Replay,
    SaveGraph(PathBuf),
    Show,
    Reset,
    Help,
    Quit,
}

fn one_based(arg: Option<&str>, what: &str) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| format!("missing {}", what))?;
    let digits = arg.trim_start_matches('x');
    match digits.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("{} must be a positive index, got {}", what, arg)),
    }
}

fn value(arg: Option<&str>) -> String {
    arg.unwrap_or("").to_string()
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err("empty command".to_string());
        };
        let cmd = match head.to_lowercase().as_str() {
            "max" => Command::Sense(ObjectiveSense::Maximize),
            "min" => Command::Sense(ObjectiveSense::Minimize),
            "var" => Command::AddVariable,
            "con" => Command::AddConstraint,
            "set" => {
                let row = match words.next() {
                    Some("obj") | Some("z") | Some("Z") => Row::Objective,
                    other => Row::Constraint(one_based(other, "constraint")?),
                };
                let col = one_based(words.next(), "column")?;
                Command::Set {
                    row,
                    col,
                    value: value(words.next()),
                }
            }
            "sign" => {
                let row = one_based(words.next(), "constraint")?;
                let symbol = words.next().unwrap_or("");
                let relation = Relation::from_symbol(symbol)
                    .ok_or_else(|| format!("unknown relation {}", symbol))?;
                Command::Sign { row, relation }
            }
            "rhs" => Command::Rhs {
                row: one_based(words.next(), "constraint")?,
                value: value(words.next()),
            },
            "method" => {
                let name = words.next().unwrap_or("");
                Command::Method(
                    SolveMethod::parse(name).ok_or_else(|| format!("unknown method {}", name))?,
                )
            }
            "solve" => Command::Solve,
            "select" => Command::Select(
                words
                    .next()
                    .ok_or_else(|| "missing node id".to_string())?
                    .to_string(),
            ),
            "replay" => Command::Replay,
            "save-graph" => Command::SaveGraph(PathBuf::from(
                words.next().ok_or_else(|| "missing path".to_string())?,
            )),
            "show" => Command::Show,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command {}; try help", other)),
        };
        Ok(cmd)
    }
}

fn cell(token: &str) -> &str {
    if token.trim().is_empty() {
        "_"
    } else {
        token
    }
}

/// The model as the user typed it; untouched cells show as `_`.
pub fn describe_model(model: &MatrixModel) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({} variables, {} constraints)",
        model.objective_preview(),
        model.variable_count(),
        model.constraint_count()
    )];
    let terms: Vec<String> = model
        .objective()
        .coefficients
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}*x{}", cell(t.as_str()), i + 1))
        .collect();
    lines.push(format!("  Z = {}", terms.join(" + ")));
    for (r, c) in model.constraints().iter().enumerate() {
        let terms: Vec<String> = c
            .coefficients
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}*x{}", cell(t.as_str()), i + 1))
            .collect();
        lines.push(format!(
            "  {}: {} {} {}",
            r + 1,
            terms.join(" + "),
            c.relation.symbol(),
            cell(c.rhs.as_str())
        ));
    }
    lines
}
