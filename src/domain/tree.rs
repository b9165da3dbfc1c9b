//! Branch-and-bound decision tree and the selection cursor over it.
//!
//! The tree is read-only once classified and belongs to the solution it came
//! with. The navigator only remembers the id of the selected node, so it
//! never holds on to a tree that has been replaced.

use std::collections::HashSet;

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::response::Solution;
use crate::error::{ClientError, Result};

/// Id the service gives the root sub-problem.
pub const ROOT_ID: &str = "P0";
/// Label shown for the root instead of its id.
pub const ROOT_LABEL: &str = "Root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    Processing,
    Integer,
    Infeasible,
    Pruned,
}

impl NodeStatus {
    /// Total mapping from the wire label; anything unrecognized is `Processing`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "integer" => NodeStatus::Integer,
            "infeasible" => NodeStatus::Infeasible,
            "pruned" => NodeStatus::Pruned,
            _ => NodeStatus::Processing,
        }
    }

    /// Style class used by node renderers.
    pub fn style_class(&self) -> &'static str {
        match self {
            NodeStatus::Processing => "processing",
            NodeStatus::Integer => "integer",
            NodeStatus::Infeasible => "infeasible",
            NodeStatus::Pruned => "pruned",
        }
    }

    /// Caption for the details panel.
    pub fn caption(&self) -> &'static str {
        match self {
            NodeStatus::Integer => "Integer (leaf)",
            NodeStatus::Pruned => "Pruned",
            NodeStatus::Infeasible => "Infeasible",
            NodeStatus::Processing => "Branched",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    /// Dotted path of the node, e.g. `P0.1.2`
    pub id: String,
    pub status: NodeStatus,
    /// Branching predicate that produced this node, e.g. `x1 <= 3`
    pub branch_info: Option<String>,
    pub solution: Option<Box<Solution>>,
    pub children: Vec<DecisionNode>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    branch_info: Option<String>,
    #[serde(default)]
    solution: Option<Value>,
    #[serde(default)]
    children: Vec<RawNode>,
}

impl DecisionNode {
    /// Classify a `tree_data` facet. Node ids must be unique across the tree.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawNode = serde_json::from_value(value)
            .map_err(|e| ClientError::MalformedResponse(format!("tree_data: {}", e)))?;
        let mut seen = HashSet::new();
        Self::from_raw(raw, &mut seen)
    }

    fn from_raw(raw: RawNode, seen: &mut HashSet<String>) -> Result<Self> {
        if !seen.insert(raw.id.clone()) {
            return Err(ClientError::MalformedResponse(format!(
                "tree_data: duplicate node id {}",
                raw.id
            )));
        }
        let status = raw
            .status
            .as_deref()
            .map(NodeStatus::from_label)
            .unwrap_or_default();
        let solution = match raw.solution {
            None | Some(Value::Null) => None,
            Some(v) => Some(Box::new(Solution::classify(v)?)),
        };
        let children = raw
            .children
            .into_iter()
            .map(|child| Self::from_raw(child, seen))
            .collect::<Result<Vec<_>>>()?;
        Ok(DecisionNode {
            id: raw.id,
            status,
            branch_info: raw.branch_info.filter(|s| !s.is_empty()),
            solution,
            children,
        })
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// `Root` for the root, otherwise the last dotted segment of the id.
    pub fn label(&self) -> &str {
        if self.is_root() {
            ROOT_LABEL
        } else {
            self.id.rsplit('.').next().unwrap_or(&self.id)
        }
    }

    /// Depth-first pre-order walk in `children` order, yielding `(depth, node)`.
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![(0, self)],
        }
    }

    pub fn find(&self, id: &str) -> Option<&DecisionNode> {
        self.walk().map(|(_, node)| node).find(|node| node.id == id)
    }
}

pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a DecisionNode)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a DecisionNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // reversed so the leftmost child is visited first
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

/// Cursor state over the current tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    NoTree,
    TreeLoaded { selected: String },
}

#[derive(Debug, Default)]
pub struct TreeNavigator {
    state: Selection,
}

impl TreeNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Selection {
        &self.state
    }

    /// A tree arrived: the cursor starts on its root.
    pub fn load(&mut self, tree: &DecisionNode) {
        debug!("tree loaded with {} nodes, selecting {}", tree.walk().count(), tree.id);
        self.state = Selection::TreeLoaded {
            selected: tree.id.clone(),
        };
    }

    /// Method changed, a new solve started, or the tree went away.
    pub fn clear(&mut self) {
        self.state = Selection::NoTree;
    }

    /// Hover and click both land here. Unknown ids leave the cursor where it was.
    pub fn select(&mut self, tree: &DecisionNode, id: &str) -> bool {
        if matches!(self.state, Selection::NoTree) {
            return false;
        }
        match tree.find(id) {
            Some(node) => {
                debug!("selected node {}", node.id);
                self.state = Selection::TreeLoaded {
                    selected: node.id.clone(),
                };
                true
            }
            None => false,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        match &self.state {
            Selection::NoTree => None,
            Selection::TreeLoaded { selected } => Some(selected),
        }
    }

    pub fn selected<'t>(&self, tree: &'t DecisionNode) -> Option<&'t DecisionNode> {
        self.selected_id().and_then(|id| tree.find(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> DecisionNode {
        DecisionNode::from_value(json!({
            "id": "P0",
            "status": "processing",
            "solution": {"Z": 21.5, "x1": 2.5, "x2": 3.0},
            "children": [
                {
                    "id": "P0.1",
                    "status": "integer",
                    "branch_info": "x1 <= 2",
                    "solution": {"Z": 20.0, "x1": 2.0, "x2": 3.0}
                },
                {
                    "id": "P0.2",
                    "status": "processing",
                    "branch_info": "x1 >= 3",
                    "solution": {"Z": 21.0, "x1": 3.0, "x2": 2.5},
                    "children": [
                        {"id": "P0.2.1", "status": "infeasible", "branch_info": "x2 <= 2"},
                        {"id": "P0.2.2", "status": "pruned", "branch_info": "x2 >= 3",
                         "solution": {"Z": 19.0, "x1": 3.0, "x2": 3.0}}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_status_mapping_is_total() {
        assert_eq!(NodeStatus::from_label("integer"), NodeStatus::Integer);
        assert_eq!(NodeStatus::from_label("Infeasible"), NodeStatus::Infeasible);
        assert_eq!(NodeStatus::from_label("PRUNED"), NodeStatus::Pruned);
        assert_eq!(NodeStatus::from_label("processing"), NodeStatus::Processing);
        assert_eq!(NodeStatus::from_label("exploded"), NodeStatus::Processing);
        assert_eq!(NodeStatus::from_label(""), NodeStatus::Processing);
    }

    #[test]
    fn test_missing_status_defaults_to_processing() {
        let tree = DecisionNode::from_value(json!({"id": "P0"})).unwrap();
        assert_eq!(tree.status, NodeStatus::Processing);
        assert!(tree.children.is_empty());
        assert!(tree.solution.is_none());
    }

    #[test]
    fn test_labels_use_last_path_segment() {
        let tree = sample_tree();
        assert_eq!(tree.label(), "Root");
        assert_eq!(tree.children[1].label(), "2");
        assert_eq!(tree.children[1].children[0].label(), "1");
    }

    #[test]
    fn test_walk_is_preorder_in_children_order() {
        let tree = sample_tree();
        let order: Vec<(usize, &str)> = tree.walk().map(|(d, n)| (d, n.id.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (0, "P0"),
                (1, "P0.1"),
                (1, "P0.2"),
                (2, "P0.2.1"),
                (2, "P0.2.2"),
            ]
        );
    }

    #[test]
    fn test_node_solution_keeps_its_own_facets() {
        let tree = DecisionNode::from_value(json!({
            "id": "P0",
            "solution": {
                "Z": 4.0,
                "x1": 1.0,
                "tree_data": {"id": "P0", "children": [{"id": "P0.1", "status": "pruned"}]}
            }
        }))
        .unwrap();
        let solution = tree.solution.as_deref().unwrap();
        assert_eq!(solution.objective_value(), Some(&json!(4.0)));
        let inner = solution.tree().unwrap();
        assert_eq!(inner.children[0].status, NodeStatus::Pruned);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = DecisionNode::from_value(json!({
            "id": "P0",
            "children": [{"id": "P0.1"}, {"id": "P0.1"}]
        }));
        assert!(matches!(result, Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn test_infeasible_node_has_no_solution() {
        let tree = sample_tree();
        let node = tree.find("P0.2.1").unwrap();
        assert_eq!(node.status, NodeStatus::Infeasible);
        assert!(node.solution.is_none());
    }

    #[test]
    fn test_navigator_starts_on_root_and_follows_selection() {
        let tree = sample_tree();
        let mut nav = TreeNavigator::new();
        assert_eq!(nav.state(), &Selection::NoTree);

        nav.load(&tree);
        assert_eq!(nav.selected_id(), Some("P0"));

        assert!(nav.select(&tree, "P0.2"));
        assert_eq!(nav.selected(&tree).map(|n| n.id.as_str()), Some("P0.2"));

        assert!(nav.select(&tree, "P0"));
        assert_eq!(nav.selected_id(), Some("P0"));
    }

    #[test]
    fn test_navigator_ignores_unknown_ids_and_missing_tree() {
        let tree = sample_tree();
        let mut nav = TreeNavigator::new();
        assert!(!nav.select(&tree, "P0.1"));
        assert_eq!(nav.selected_id(), None);

        nav.load(&tree);
        assert!(!nav.select(&tree, "P9"));
        assert_eq!(nav.selected_id(), Some("P0"));

        nav.clear();
        assert_eq!(nav.state(), &Selection::NoTree);
    }
}
