use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Pivot cell of an iteration, as (row index, column index) into `rows`/`values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pivot {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableauRow {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// One solver iteration's intermediate coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableauSnapshot {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub iteration: u32,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<TableauRow>,
    #[serde(default, rename = "pivot_info", alias = "pivot")]
    pub pivot: Option<Pivot>,
}

impl TableauSnapshot {
    /// Every row must be as wide as the headers and the pivot must land on a cell.
    pub fn validate(&self) -> Result<()> {
        let width = self.headers.len();
        for (i, row) in self.rows.iter().enumerate() {
            if row.values.len() != width {
                return Err(ClientError::MalformedResponse(format!(
                    "{} step {}: row {} ({}) has {} values for {} headers",
                    self.phase,
                    self.iteration,
                    i,
                    row.label,
                    row.values.len(),
                    width
                )));
            }
        }
        if let Some(pivot) = self.pivot {
            if pivot.row >= self.rows.len() || pivot.col >= width {
                return Err(ClientError::MalformedResponse(format!(
                    "{} step {}: pivot [{}, {}] outside a {}x{} table",
                    self.phase,
                    self.iteration,
                    pivot.row,
                    pivot.col,
                    self.rows.len(),
                    width
                )));
            }
        }
        Ok(())
    }

    pub fn is_pivot(&self, row: usize, col: usize) -> bool {
        self.pivot == Some(Pivot { row, col })
    }
}

/// Decode and validate an `iterations` facet.
pub fn parse_iterations(value: Value) -> Result<Vec<TableauSnapshot>> {
    let snapshots: Vec<TableauSnapshot> = serde_json::from_value(value)
        .map_err(|e| ClientError::MalformedResponse(format!("iterations: {}", e)))?;
    for snapshot in &snapshots {
        snapshot.validate()?;
    }
    Ok(snapshots)
}
