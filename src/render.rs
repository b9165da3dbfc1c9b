//! Text renderers for results. Flat lists print numbers with 4 decimals,
//! cards with 2; tableau cells are printed as received.

use std::fmt::{self, Write as _};

use serde_json::Value;

use crate::domain::method::DisplayMode;
use crate::domain::response::Solution;
use crate::domain::tableau::TableauSnapshot;
use crate::domain::tree::{DecisionNode, NodeStatus};
use crate::session::ResultView;

pub const LIST_PRECISION: usize = 4;
pub const CARD_PRECISION: usize = 2;

/// Numbers with a fixed number of decimals, strings verbatim, anything else as JSON.
pub fn format_value(value: &Value, precision: usize) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            // avoid printing "-0.0000"
            Some(f) if f == 0.0 => format!("{:.*}", precision, 0.0),
            Some(f) => format!("{:.*}", precision, f),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Shortest form of a cell: integral floats lose their fraction.
pub fn format_raw(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `name: value` lines with 4 decimals, Z first when present.
pub fn flat_list(solution: &Solution) -> Vec<String> {
    let mut lines = Vec::with_capacity(solution.variables.len() + 1);
    if let Some(z) = solution.objective_value() {
        lines.push(format!("Z: {}", format_value(z, LIST_PRECISION)));
    }
    for (name, value) in solution.variable_assignments() {
        lines.push(format!("{}: {}", name, format_value(value, LIST_PRECISION)));
    }
    lines
}

/// Summary card of a flat result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub title: &'static str,
    pub badge: String,
    pub feasible: bool,
    /// Z with 4 decimals
    pub objective: Option<String>,
    /// Variable tiles with 2 decimals
    pub tiles: Vec<(String, String)>,
    pub warning: Option<String>,
}

impl ResultCard {
    pub fn new(solution: &Solution, mode: DisplayMode) -> Self {
        let feasible = solution.is_feasible();
        let badge = match &solution.structural.status {
            Some(status) => status.clone(),
            None if feasible => "OPTIMAL".to_string(),
            None => "INFEASIBLE".to_string(),
        };
        ResultCard {
            title: match mode {
                DisplayMode::Dual => "Dual Solution",
                _ => "Optimal Solution",
            },
            badge,
            feasible,
            objective: solution
                .objective_value()
                .map(|z| format_value(z, LIST_PRECISION)),
            tiles: solution
                .variable_assignments()
                .iter()
                .map(|(k, v)| (k.clone(), format_value(v, CARD_PRECISION)))
                .collect(),
            warning: solution.structural.status_complement.clone(),
        }
    }
}

impl fmt::Display for ResultCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.feasible { "ok" } else { "!!" };
        writeln!(f, "[{}] {} ({})", mark, self.title, self.badge.to_uppercase())?;
        if let Some(z) = &self.objective {
            writeln!(f, "Optimal value (Z) = {}", z)?;
        }
        if !self.tiles.is_empty() {
            let tiles: Vec<String> = self.tiles.iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
            writeln!(f, "Variables: {}", tiles.join(", "))?;
        }
        if let Some(warning) = &self.warning {
            writeln!(f, "Warning: {}", warning)?;
        }
        Ok(())
    }
}

/// One iteration as an aligned text table. The pivot cell is bracketed.
pub fn render_tableau(step: &TableauSnapshot) -> String {
    let mut out = format!("{} - Step {}", step.phase, step.iteration);
    if let Some(p) = step.pivot {
        let _ = write!(out, "  Pivot: [{}, {}]", p.row, p.col);
    }
    out.push('\n');

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(step.rows.len() + 1);
    grid.push(
        std::iter::once("Base".to_string())
            .chain(step.headers.iter().cloned())
            .collect(),
    );
    for (i, row) in step.rows.iter().enumerate() {
        let mut cells = vec![row.label.clone()];
        for (j, v) in row.values.iter().enumerate() {
            let cell = format_raw(v);
            cells.push(if step.is_pivot(i, j) {
                format!("[{}]", cell)
            } else {
                cell
            });
        }
        grid.push(cells);
    }

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            grid.iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    for row in &grid {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect();
        out.push_str(cells.join(" | ").trim_end());
        out.push('\n');
    }
    out
}

/// Pre-order outline of the tree; the selected node is marked with `>`.
pub fn render_tree(tree: &DecisionNode, selected: Option<&str>) -> Vec<String> {
    tree.walk()
        .map(|(depth, node)| {
            let marker = if selected == Some(node.id.as_str()) { ">" } else { "-" };
            let branch = node
                .branch_info
                .as_deref()
                .map(|b| format!(" ({})", b))
                .unwrap_or_default();
            format!(
                "{}{} {}{} [{}]",
                "  ".repeat(depth),
                marker,
                node.label(),
                branch,
                node.status.style_class()
            )
        })
        .collect()
}

/// Details panel for one node.
pub fn render_node_details(node: &DecisionNode) -> Vec<String> {
    let mut lines = vec![format!("Node {} details", node.id)];
    if node.status == NodeStatus::Infeasible {
        lines.push("Infeasible solution".to_string());
        return lines;
    }
    match &node.solution {
        Some(solution) => {
            if let Some(z) = solution.objective_value() {
                lines.push(format!("Z = {}", format_value(z, LIST_PRECISION)));
            }
            for (name, value) in solution.decision_entries() {
                lines.push(format!("{}: {}", name, format_value(value, LIST_PRECISION)));
            }
        }
        None => lines.push("No relaxation data".to_string()),
    }
    lines.push(format!("Status: {}", node.status.caption()));
    lines
}

/// Best integer solution block shown beside the tree.
pub fn render_integer_block(solution: &Solution) -> Vec<String> {
    let Some(integer) = solution.integer_solution() else {
        return vec!["No integer solution found.".to_string()];
    };
    let mut lines = vec!["Optimal integer solution:".to_string()];
    if let Some(z) = integer.objective_value().or(solution.objective_value()) {
        lines.push(format!("Z: {}", format_value(z, LIST_PRECISION)));
    }
    for (name, value) in integer.decision_entries() {
        lines.push(format!("{}: {}", name, format_value(value, LIST_PRECISION)));
    }
    lines
}

/// Final tableau of the integer optimum, when the service sent one.
pub fn final_integer_tableau(solution: &Solution) -> Option<&TableauSnapshot> {
    solution.integer_solution()?.iterations()?.last()
}

/// Everything the result area shows, as plain text.
pub fn render_view(view: &ResultView<'_>) -> String {
    let mut out = String::new();
    match *view {
        ResultView::Idle => {}
        ResultView::Status { status_line } => {
            let _ = writeln!(out, "{}", status_line);
        }
        ResultView::SolverError {
            status_line,
            message,
        } => {
            if !status_line.is_empty() {
                let _ = writeln!(out, "{}", status_line);
            }
            let _ = writeln!(out, "Error: {}", message);
        }
        ResultView::Flat {
            status_line,
            mode,
            solution,
            artifact,
        } => {
            let _ = writeln!(out, "{}", status_line);
            let _ = write!(out, "{}", ResultCard::new(solution, mode));
            if let Some(dual) = solution.dual_solution() {
                let _ = writeln!(out, "Dual values:");
                for line in flat_list(dual) {
                    let _ = writeln!(out, "  {}", line);
                }
            }
            if let Some(handle) = artifact {
                let _ = writeln!(out, "Graph: {} ({}) - replay to restart", handle.url, handle.mime);
            }
            if let Some(iterations) = solution.iterations() {
                let _ = writeln!(out, "Step by step ({} tableaus)", iterations.len());
                for step in iterations {
                    out.push_str(&render_tableau(step));
                }
            }
        }
        ResultView::Tree {
            status_line,
            solution,
            tree,
            selected,
        } => {
            let _ = writeln!(out, "{}", status_line);
            let _ = writeln!(out, "Decision tree (Branch & Bound)");
            if let Some(tree) = tree {
                for line in render_tree(tree, selected.map(|n| n.id.as_str())) {
                    let _ = writeln!(out, "{}", line);
                }
            }
            match selected {
                Some(node) => {
                    for line in render_node_details(node) {
                        let _ = writeln!(out, "{}", line);
                    }
                }
                None => {
                    let _ = writeln!(out, "Select a node to see its details.");
                }
            }
            for line in render_integer_block(solution) {
                let _ = writeln!(out, "{}", line);
            }
            if let Some(step) = final_integer_tableau(solution) {
                let _ = writeln!(out, "Final tableau (integer optimum):");
                out.push_str(&render_tableau(step));
            }
        }
    }
    out
}
