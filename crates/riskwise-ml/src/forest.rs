//! Bagged ensemble of Gini decision trees with balanced class weights.

use linfa::prelude::*;
use linfa::Dataset;
use linfa_trees::{DecisionTree, DecisionTreeParams, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MlError, Result};
use crate::patient::RiskLevel;

/// Number of risk classes the ensemble votes over.
pub const N_CLASSES: usize = RiskLevel::ALL.len();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            seed: 42,
        }
    }
}

/// Majority vote for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vote {
    pub class: usize,
    /// Share of trees that voted for `class`.
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RiskForest {
    trees: Vec<DecisionTree<f64, usize>>,
    n_features: usize,
}

impl RiskForest {
    pub fn fit(
        records: &Array2<f64>,
        labels: &Array1<usize>,
        params: &ForestParams,
    ) -> Result<Self> {
        if records.nrows() == 0 {
            return Err(MlError::EmptyInput);
        }
        if records.nrows() != labels.len() {
            return Err(MlError::Fit(format!(
                "{} rows but {} labels",
                records.nrows(),
                labels.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(MlError::Fit("ensemble needs at least one tree".into()));
        }
        if let Some(bad) = labels.iter().find(|&&label| label >= N_CLASSES) {
            return Err(MlError::Fit(format!("unknown class label {bad}")));
        }

        let class_weights = balanced_class_weights(labels);
        let n = records.nrows();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let weights: Array1<f32> = sample
                .iter()
                .map(|&row| class_weights[labels[row]])
                .collect();
            let dataset = Dataset::new(
                records.select(Axis(0), &sample),
                labels.select(Axis(0), &sample),
            )
            .with_weights(weights);

            let tree = tree_params(params.max_depth)
                .fit(&dataset)
                .map_err(|e| MlError::Fit(e.to_string()))?;
            trees.push(tree);
        }

        debug!(trees = trees.len(), rows = n, "fitted decision-tree ensemble");
        Ok(Self {
            trees,
            n_features: records.ncols(),
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Per-row majority vote. Ties go to the lowest class index.
    pub fn vote(&self, records: &Array2<f64>) -> Vec<Vote> {
        let mut tallies = Array2::<usize>::zeros((records.nrows(), N_CLASSES));
        for tree in &self.trees {
            let predicted: Array1<usize> = tree.predict(records);
            for (row, &class) in predicted.iter().enumerate() {
                tallies[[row, class.min(N_CLASSES - 1)]] += 1;
            }
        }

        let total = self.trees.len().max(1) as f64;
        tallies
            .outer_iter()
            .map(|counts| {
                let (class, votes) = counts
                    .iter()
                    .enumerate()
                    .fold((0, 0), |best, (class, &votes)| {
                        if votes > best.1 {
                            (class, votes)
                        } else {
                            best
                        }
                    });
                Vote {
                    class,
                    confidence: votes as f64 / total,
                }
            })
            .collect()
    }

    pub fn predict(&self, records: &Array2<f64>) -> Vec<usize> {
        self.vote(records).into_iter().map(|v| v.class).collect()
    }

    /// Mean impurity-decrease importance, normalized to sum to 1.
    /// All zeros when no tree made a split.
    pub fn feature_importance(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (total, value) in totals.iter_mut().zip(tree.feature_importance()) {
                if value.is_finite() && value > 0.0 {
                    *total += value;
                }
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|t| *t /= sum);
        }
        totals
    }
}

/// Balanced weights push majority-class samples below 1.0, so a leaf must be
/// allowed to hold a single sample of any class.
fn tree_params(max_depth: usize) -> DecisionTreeParams<f64, usize> {
    DecisionTree::params()
        .split_quality(SplitQuality::Gini)
        .max_depth(Some(max_depth))
        .min_weight_leaf(0.0)
}

/// `n / (n_classes * count_c)` for each class present in `labels`.
fn balanced_class_weights(labels: &Array1<usize>) -> [f32; N_CLASSES] {
    let mut counts = [0usize; N_CLASSES];
    for &label in labels {
        counts[label] += 1;
    }
    let present = counts.iter().filter(|&&c| c > 0).count().max(1);
    let n = labels.len() as f32;

    let mut weights = [0.0f32; N_CLASSES];
    for (weight, &count) in weights.iter_mut().zip(&counts) {
        if count > 0 {
            *weight = n / (present as f32 * count as f32);
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<usize>) {
        let records = array![
            [22.0, 0.0, 0.0],
            [28.0, 0.0, 0.0],
            [35.0, 1.0, 0.0],
            [41.0, 1.0, 1.0],
            [48.0, 1.0, 1.0],
            [55.0, 2.0, 1.0],
            [63.0, 2.0, 2.0],
            [69.0, 2.0, 2.0],
            [74.0, 3.0, 2.0],
            [88.0, 3.0, 2.0],
        ];
        let labels = array![0, 0, 0, 1, 1, 1, 2, 2, 2, 2];
        (records, labels)
    }

    #[test]
    fn balanced_weights_favour_rare_classes() {
        let labels = array![0, 0, 0, 0, 0, 0, 1, 1, 2, 2];
        let weights = balanced_class_weights(&labels);
        assert!((weights[0] - 10.0 / 18.0).abs() < 1e-6);
        assert!((weights[1] - 10.0 / 6.0).abs() < 1e-6);
        assert!((weights[2] - 10.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn learns_a_separable_problem() {
        let (records, labels) = separable();
        let forest = RiskForest::fit(&records, &labels, &ForestParams::default()).unwrap();

        assert_eq!(forest.n_trees(), 100);
        let predicted = forest.predict(&records);
        let correct = predicted.iter().zip(&labels).filter(|(p, l)| p == l).count();
        assert!(correct >= 8, "only {correct} of 10 rows classified correctly");
    }

    #[test]
    fn votes_are_valid_probabilities() {
        let (records, labels) = separable();
        let params = ForestParams { n_trees: 15, ..ForestParams::default() };
        let forest = RiskForest::fit(&records, &labels, &params).unwrap();

        for vote in forest.vote(&records) {
            assert!(vote.class < N_CLASSES);
            assert!(vote.confidence > 0.0 && vote.confidence <= 1.0);
        }
    }

    #[test]
    fn importance_is_normalized() {
        let (records, labels) = separable();
        let forest = RiskForest::fit(&records, &labels, &ForestParams::default()).unwrap();
        let importance = forest.feature_importance();

        assert_eq!(importance.len(), 3);
        assert!(importance.iter().all(|&v| v >= 0.0));
        assert!((importance.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_forest() {
        let (records, labels) = separable();
        let a = RiskForest::fit(&records, &labels, &ForestParams::default()).unwrap();
        let b = RiskForest::fit(&records, &labels, &ForestParams::default()).unwrap();
        assert_eq!(a.vote(&records), b.vote(&records));
        assert_eq!(a.feature_importance(), b.feature_importance());
    }

    #[test]
    fn lightly_weighted_sample_gets_its_own_leaf() {
        let dataset = Dataset::new(
            array![[1.0], [2.0], [3.0], [4.0], [5.0]],
            array![1usize, 1, 0, 1, 1],
        )
        .with_weights(array![1.0f32, 1.0, 0.5, 1.0, 1.0]);

        let tree = tree_params(10).fit(&dataset).unwrap();
        assert_eq!(tree.predict(&array![[3.0], [1.0], [5.0]]).to_vec(), vec![0, 1, 1]);
    }

    #[test]
    fn rejects_unknown_labels() {
        let (records, _) = separable();
        let labels = Array1::from(vec![5; 10]);
        assert!(matches!(
            RiskForest::fit(&records, &labels, &ForestParams::default()),
            Err(MlError::Fit(_))
        ));
    }
}
