//! Bagged decision-tree ensemble over dense feature vectors.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskmindError};

/// Random forest hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum depth of each tree.
    pub max_depth: usize,
    /// Minimum number of samples required to attempt a split.
    pub min_samples_split: usize,
    /// RNG seed for bootstrap resampling and feature subsampling.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 50,
            max_depth: 12,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// A single CART-style decision tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A decision tree trained with Gini-impurity splits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    /// Grow a tree on the given sample indices (a bootstrap sample).
    fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        indices: Vec<usize>,
        n_classes: usize,
        config: &ForestConfig,
        rng: &mut StdRng,
    ) -> Self {
        let root = grow(x, y, indices, 0, n_classes, config, rng);
        Self { root }
    }

    /// Predict the class id for one feature vector.
    pub fn predict(&self, features: &[f64]) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// Bagged decision-tree ensemble producing an n-way class decision.
///
/// Trees are grown on bootstrap resamples with sqrt-feature subsampling at
/// each split and vote by majority; ties resolve to the lowest class id so
/// predictions are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Train a forest from scratch on the full dataset.
    ///
    /// Fully seeded: the same data and configuration produce the same trees.
    pub fn fit(x: &[Vec<f64>], y: &[usize], n_classes: usize, config: &ForestConfig) -> Result<Self> {
        if x.is_empty() {
            return Err(TaskmindError::other("cannot fit a forest on empty data"));
        }
        if x.len() != y.len() {
            return Err(TaskmindError::other(format!(
                "feature/label misalignment: {} feature rows, {} labels",
                x.len(),
                y.len()
            )));
        }
        let width = x[0].len();
        if x.iter().any(|row| row.len() != width) {
            return Err(TaskmindError::other("feature rows have inconsistent widths"));
        }
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(TaskmindError::other(format!(
                "label {bad} out of range for {n_classes} classes"
            )));
        }

        let n = x.len();
        let mut trees = Vec::with_capacity(config.n_trees);
        for tree_index in 0..config.n_trees {
            // Per-tree RNG derived from the master seed keeps each tree
            // independent of how many trees precede it.
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree_index as u64));
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            trees.push(DecisionTree::fit(x, y, bootstrap, n_classes, config, &mut rng));
        }

        Ok(Self { trees, n_classes })
    }

    /// Predict the class id for one feature vector by majority vote.
    pub fn predict(&self, features: &[f64]) -> usize {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let class = tree.predict(features);
            if class < self.n_classes {
                votes[class] += 1;
            }
        }
        argmax(&votes)
    }

    /// Fraction of samples predicted correctly.
    pub fn accuracy(&self, x: &[Vec<f64>], y: &[usize]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = x
            .iter()
            .zip(y.iter())
            .filter(|&(features, &label)| self.predict(features) == label)
            .count();
        correct as f64 / x.len() as f64
    }

    /// Number of trees in the ensemble.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Index of the largest count; ties resolve to the lowest index.
fn argmax(counts: &[usize]) -> usize {
    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    best
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let mut impurity = 1.0;
    for &count in counts {
        let p = count as f64 / total as f64;
        impurity -= p * p;
    }
    impurity
}

fn grow(
    x: &[Vec<f64>],
    y: &[usize],
    indices: Vec<usize>,
    depth: usize,
    n_classes: usize,
    config: &ForestConfig,
    rng: &mut StdRng,
) -> TreeNode {
    let counts = class_counts(y, &indices, n_classes);
    let majority = argmax(&counts);

    let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
    if pure || depth >= config.max_depth || indices.len() < config.min_samples_split {
        return TreeNode::Leaf { class: majority };
    }

    let n_features = x[0].len();
    let parent_gini = gini(&counts, indices.len());

    // sqrt-feature subsampling per split
    let k = (n_features as f64).sqrt().ceil() as usize;
    let k = k.clamp(1, n_features);
    let candidates = rand::seq::index::sample(rng, n_features, k);

    let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, weighted gini)

    for feature in candidates {
        let mut values: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (x[i][feature], y[i]))
            .collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = values.len();
        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = counts.clone();

        for i in 0..total - 1 {
            left_counts[values[i].1] += 1;
            right_counts[values[i].1] -= 1;

            // Only split between distinct values so both sides are non-empty.
            if values[i].0 == values[i + 1].0 {
                continue;
            }

            let left_n = i + 1;
            let right_n = total - left_n;
            let weighted = (left_n as f64 * gini(&left_counts, left_n)
                + right_n as f64 * gini(&right_counts, right_n))
                / total as f64;

            if best.is_none_or(|(_, _, g)| weighted < g) {
                let threshold = (values[i].0 + values[i + 1].0) / 2.0;
                best = Some((feature, threshold, weighted));
            }
        }
    }

    match best {
        Some((feature, threshold, weighted)) if weighted < parent_gini - 1e-12 => {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .into_iter()
                .partition(|&i| x[i][feature] <= threshold);

            let left = grow(x, y, left_indices, depth + 1, n_classes, config, rng);
            let right = grow(x, y, right_indices, depth + 1, n_classes, config, rng);
            TreeNode::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => TreeNode::Leaf { class: majority },
    }
}
