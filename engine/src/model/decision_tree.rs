//! CART regression tree grown on variance reduction.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Decision tree configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider per split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for the feature draw at each split
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    /// Grows the tree on `rows` (one feature vector per sample) against `labels`.
    pub fn fit(&mut self, rows: &[Vec<f64>], labels: &[f64]) {
        let indices: Vec<usize> = (0..rows.len().min(labels.len())).collect();
        if indices.is_empty() {
            self.root = None;
            return;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build(rows, labels, &indices, 0, &mut rng));
    }

    fn build(
        &self,
        rows: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let n = indices.len();
        let mean = indices.iter().map(|&i| labels[i]).sum::<f64>() / n as f64;
        let impurity = indices.iter().map(|&i| (labels[i] - mean).powi(2)).sum::<f64>() / n as f64;

        if depth >= self.config.max_depth || n < self.config.min_samples_split || impurity < 1e-10 {
            return Node::Leaf { value: mean };
        }

        let Some(split) = self.best_split(rows, labels, indices, impurity, rng) else {
            return Node::Leaf { value: mean };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| rows[i][split.feature] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(rows, labels, &left, depth + 1, rng)),
            right: Box::new(self.build(rows, labels, &right, depth + 1, rng)),
        }
    }

    /// Sorts the node's samples once per candidate feature and sweeps prefix sums,
    /// so each feature costs O(n log n) instead of one partition per threshold.
    fn best_split(
        &self,
        rows: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = rows.first().map_or(0, |r| r.len());
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features.max(1));

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        features.truncate(max_features);

        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let total_sum: f64 = indices.iter().map(|&i| labels[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| labels[i] * labels[i]).sum();

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature in features {
            sorted.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let y = labels[sorted[k - 1]];
                left_sum += y;
                left_sq += y * y;

                let lo = rows[sorted[k - 1]][feature];
                let hi = rows[sorted[k]][feature];
                if lo >= hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }

                let (n_left, n_right) = (k as f64, (n - k) as f64);
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse_left = (left_sq - left_sum * left_sum / n_left).max(0.0);
                let sse_right = (right_sq - right_sum * right_sum / n_right).max(0.0);
                let gain = parent_impurity - (sse_left + sse_right) / n as f64;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }

    /// Predict for a single sample. An unfitted tree predicts 0.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(node) => node,
            None => return 0.0,
        };
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    node = if features[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        self.root.as_ref().map_or(0, depth_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_function_is_learned() {
        let rows: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64 / 10.0]).collect();
        let labels: Vec<f64> = (0..100).map(|i| if i < 50 { 1.0 } else { 5.0 }).collect();

        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&rows, &labels);

        assert!(tree.is_fitted());
        assert_eq!(tree.predict_one(&[1.0]), 1.0);
        assert_eq!(tree.predict_one(&[9.0]), 5.0);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_respects_max_depth() {
        let rows: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64]).collect();
        let labels: Vec<f64> = (0..200).map(|i| (i as f64).sqrt()).collect();
        let mut tree = DecisionTree::new(TreeConfig {
            max_depth: 3,
            ..Default::default()
        });
        tree.fit(&rows, &labels);
        assert!(tree.depth() <= 4); // 3 split levels plus leaves
    }

    #[test]
    fn test_constant_features_give_single_leaf() {
        let rows: Vec<Vec<f64>> = vec![vec![1.0, 1.0]; 20];
        let labels: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&rows, &labels);
        assert_eq!(tree.depth(), 1);
        assert!((tree.predict_one(&[1.0, 1.0]) - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_unfitted_predicts_zero() {
        let tree = DecisionTree::new(TreeConfig::default());
        assert_eq!(tree.predict_one(&[1.0]), 0.0);
        assert_eq!(tree.depth(), 0);
    }
}
