/// Label shown when the service reports an optimal solution.
pub const OPTIMAL_LABEL: &str = "Optimal solution found";
/// Label shown when the service reports infeasibility.
pub const INFEASIBLE_LABEL: &str = "Infeasible solution";
/// Label shown when the service reports an unbounded problem.
pub const UNBOUNDED_LABEL: &str = "Unbounded solution";

/// Map a service status string to its fixed label by case-insensitive
/// substring match. Unrecognized strings pass through unchanged.
pub fn translate_status(status: &str) -> String {
    let lower = status.to_lowercase();
    if lower.contains("optimal") {
        OPTIMAL_LABEL.to_string()
    } else if lower.contains("infeasible") {
        INFEASIBLE_LABEL.to_string()
    } else if lower.contains("unbounded") {
        UNBOUNDED_LABEL.to_string()
    } else {
        status.to_string()
    }
}
