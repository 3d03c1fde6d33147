//! Regression tree structures
//!
//! Nodes are stored in a flat vector in pre-order: node 0 is the root and
//! every child index is greater than its parent's.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0`, `left`/`right` point at children
/// and `leaf` is `None`. Leaf nodes carry `feature_idx == -1`, children of
/// -1 and the prediction in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub left: i32,
    pub right: i32,
    #[serde(rename = "feature_idx")]
    pub feature_idx: i32,
    pub threshold: f64,
    pub leaf: Option<f64>,
}

impl Node {
    pub fn internal(feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Self {
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }

    pub fn leaf_value(&self) -> Option<f64> {
        self.leaf
    }
}

/// A single regression tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to a leaf. Goes left when `feature <= threshold`.
    ///
    /// Returns `None` if the walk leaves the node array or references a
    /// feature outside `features`.
    pub fn evaluate(&self, features: &[f64]) -> Option<f64> {
        let mut idx = 0usize;

        loop {
            let node = self.nodes.get(idx)?;

            if node.is_leaf() {
                return node.leaf_value();
            }

            let value = *features.get(node.feature_idx as usize)?;
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };

            if next < 0 {
                return None;
            }
            idx = next as usize;
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Validate structure against a schema of `feature_count` columns
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    Some(value) if value.is_finite() => {}
                    Some(value) => return Err(format!("Leaf node {i} has non-finite value {value}")),
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                }
                continue;
            }

            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }

            if !node.threshold.is_finite() {
                return Err(format!("Node {i} has non-finite threshold"));
            }
        }

        Ok(())
    }
}
