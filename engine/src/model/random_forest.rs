//! Bagged ensemble of regression trees.

use super::decision_tree::{DecisionTree, TreeConfig};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Deserialize;

/// Random Forest configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn per split (a third of the total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random Forest model. Training is deterministic for a fixed seed: every tree
/// derives its own seed from the forest seed and its index.
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, rows: &[Vec<f64>], labels: &[f64]) {
        let n_samples = rows.len().min(labels.len());
        let n_features = rows.first().map_or(0, |r| r.len());
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features / 3).max(1));

        // Build trees in parallel; collect keeps index order
        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = self.config.seed.wrapping_add(i as u64);
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: tree_seed,
                });

                if self.config.bootstrap && n_samples > 0 {
                    let indices = bootstrap_indices(n_samples, tree_seed);
                    let sample_rows: Vec<Vec<f64>> =
                        indices.iter().map(|&j| rows[j].clone()).collect();
                    let sample_labels: Vec<f64> = indices.iter().map(|&j| labels[j]).collect();
                    tree.fit(&sample_rows, &sample_labels);
                } else {
                    tree.fit(&rows[..n_samples], &labels[..n_samples]);
                }
                tree
            })
            .collect();

        self.trees = trees;
    }

    /// Mean of the individual tree predictions.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict_one(features)).sum::<f64>() / self.trees.len() as f64
    }

    /// Calculate R² score
    pub fn r2_score(&self, rows: &[Vec<f64>], labels: &[f64]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let mean_label = labels.iter().sum::<f64>() / labels.len() as f64;
        let ss_res: f64 = rows
            .iter()
            .zip(labels.iter())
            .map(|(r, l)| (l - self.predict_one(r)).powi(2))
            .sum();
        let ss_tot: f64 = labels.iter().map(|l| (l - mean_label).powi(2)).sum();

        if ss_tot == 0.0 {
            0.0
        } else {
            1.0 - ss_res / ss_tot
        }
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}
