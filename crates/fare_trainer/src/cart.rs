//! CART (Classification and Regression Tree) builder
//!
//! Exact-greedy regression trees: every feature is considered at every node
//! and the split maximising the reduction in squared error wins. Nodes are
//! emitted in pre-order so children always follow their parent.

use farecast_core::{Node, Tree};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 25,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Split candidate with its improvement over the parent
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Build a regression tree over a borrowed sample matrix
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [Vec<f64>], targets: &'a [f64], config: TreeConfig) -> Self {
        assert_eq!(features.len(), targets.len());

        let feature_count = features.first().map(Vec::len).unwrap_or(0);

        Self {
            config,
            features,
            targets,
            feature_count,
        }
    }

    /// Build a tree from the given sample indices (duplicates allowed)
    pub fn build(&self, indices: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(indices, 0, &mut nodes);
        Tree { nodes }
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> i32 {
        let current_idx = nodes.len();
        let leaf_value = self.mean_target(indices);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
            || self.is_pure(indices)
        {
            nodes.push(Node::leaf(leaf_value));
            return current_idx as i32;
        }

        let split = match self.find_best_split(indices) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(leaf_value));
                return current_idx as i32;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve the slot; children are patched in once built
        nodes.push(Node::internal(split.feature_idx as i32, split.threshold, 0, 0));

        let left = self.build_node(&left_indices, depth + 1, nodes);
        let right = self.build_node(&right_indices, depth + 1, nodes);

        nodes[current_idx].left = left;
        nodes[current_idx].right = right;

        current_idx as i32
    }

    /// Best split by sorted sweep per feature.
    ///
    /// Maximises `S_l²/n_l + S_r²/n_r`, which is equivalent to minimising
    /// the summed squared error of the two children.
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let total: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let parent_score = total * total / n as f64;
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut best: Option<SplitCandidate> = None;
        let mut column: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature_idx in 0..self.feature_count {
            column.clear();
            column.extend(
                indices
                    .iter()
                    .map(|&i| (self.features[i][feature_idx], self.targets[i])),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if column[0].0 == column[n - 1].0 {
                continue;
            }

            let mut left_sum = 0.0;
            for i in 0..n - 1 {
                left_sum += column[i].1;
                let left_n = i + 1;
                let right_n = n - left_n;

                if column[i].0 == column[i + 1].0 {
                    continue;
                }
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64;
                let gain = score - parent_score;

                if best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: midpoint(column[i].0, column[i + 1].0),
                        gain,
                    });
                }
            }
        }

        best.filter(|s| s.gain > 0.0)
    }

    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .partition(|&&idx| self.features[idx][feature_idx] <= threshold)
    }

    fn mean_target(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices.iter().map(|&i| self.targets[i]).sum::<f64>() / indices.len() as f64
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        match indices.first() {
            Some(&first) => indices.iter().all(|&i| self.targets[i] == self.targets[first]),
            None => true,
        }
    }
}

/// Threshold between two adjacent distinct values.
///
/// Falls back to the lower value when the midpoint rounds up to the upper
/// one, so the lower sample still goes left.
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid >= upper {
        lower
    } else {
        mid
    }
}
