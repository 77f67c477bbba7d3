//! A bagged forest of `linfa-trees` decision trees.
//!
//! Each tree is fit on a bootstrap sample of the rows and a random subset of
//! the feature columns. Prediction is a majority vote; a tie goes to the
//! negative class, both across trees and inside a single tree's leaves.

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::MaxFeatures;
use crate::error::TrainError;

/// Extra sample weight on negative rows. linfa-trees resolves a leaf's class
/// through a hash map, so equal class weights in a leaf would be decided by
/// hash order; the offset makes weights unequal for any leaf under 1000 rows.
const NEGATIVE_TIE_BREAK: f32 = 1e-3;

/// Settings for [`LoanForest::fit`].
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_features: MaxFeatures::Sqrt,
            seed: 42,
        }
    }
}

#[derive(Debug)]
struct ForestTree {
    tree: DecisionTree<f64, usize>,
    /// Columns of the full feature row this tree was trained on, ascending.
    features: Vec<usize>,
}

/// Trained binary classifier: class `1` is the positive outcome.
#[derive(Debug)]
pub struct LoanForest {
    trees: Vec<ForestTree>,
    n_features: usize,
}

impl LoanForest {
    /// Fits `params.n_trees` trees. Tree `i` draws its bootstrap rows and
    /// feature subset from an RNG seeded with `params.seed + i`, so the same
    /// inputs always produce the same forest.
    pub fn fit(
        params: &ForestParams,
        records: &Array2<f64>,
        targets: &Array1<usize>,
    ) -> Result<Self, TrainError> {
        let (n_samples, n_features) = records.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(TrainError::Empty);
        }
        if n_samples != targets.len() {
            return Err(TrainError::LengthMismatch {
                records: n_samples,
                labels: targets.len(),
            });
        }
        let first = targets[0];
        if targets.iter().all(|&t| t == first) {
            return Err(TrainError::SingleClass(first));
        }

        let n_sub = params.max_features.resolve(n_features);
        let mut trees = Vec::with_capacity(params.n_trees);

        for i in 0..params.n_trees {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));

            let rows: Vec<usize> = (0..n_samples)
                .map(|_| rng.random_range(0..n_samples))
                .collect();
            let mut features = rand::seq::index::sample(&mut rng, n_features, n_sub).into_vec();
            features.sort_unstable();

            let x = records.select(Axis(0), &rows).select(Axis(1), &features);
            let y = targets.select(Axis(0), &rows);
            let weights = y.mapv(|class| {
                if class == 0 {
                    1.0 + NEGATIVE_TIE_BREAK
                } else {
                    1.0
                }
            });

            let tree = DecisionTree::<f64, usize>::params()
                .split_quality(SplitQuality::Gini)
                .fit(&Dataset::new(x, y).with_weights(weights))
                .map_err(|e| TrainError::Fit(e.to_string()))?;

            trees.push(ForestTree { tree, features });
        }

        debug!(
            "Fitted {} trees on {n_samples} rows, {n_sub} of {n_features} features each",
            trees.len()
        );

        Ok(LoanForest { trees, n_features })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Fraction of trees voting for the positive class, per row.
    pub fn predict_proba<S: Data<Elem = f64>>(
        &self,
        records: &ArrayBase<S, Ix2>,
    ) -> Result<Array1<f64>, TrainError> {
        self.check_width(records.ncols())?;
        let mut votes = Array1::<f64>::zeros(records.nrows());
        for member in &self.trees {
            let projected = records.select(Axis(1), &member.features);
            let predicted: Array1<usize> = member.tree.predict(&projected);
            votes
                .iter_mut()
                .zip(predicted.iter())
                .filter(|(_, class)| **class == 1)
                .for_each(|(v, _)| *v += 1.0);
        }
        Ok(votes / self.trees.len() as f64)
    }

    pub fn predict<S: Data<Elem = f64>>(
        &self,
        records: &ArrayBase<S, Ix2>,
    ) -> Result<Array1<usize>, TrainError> {
        Ok(self
            .predict_proba(records)?
            .mapv(|share| usize::from(share > 0.5)))
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> Result<f64, TrainError> {
        self.check_width(row.len())?;
        let input = ArrayView2::from_shape((1, row.len()), row).map_err(|_| {
            TrainError::FeatureWidth {
                expected: self.n_features,
                actual: row.len(),
            }
        })?;
        Ok(self.predict_proba(&input)?[0])
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<usize, TrainError> {
        let share = self.predict_proba_row(row)?;
        debug!("Positive vote share {share:.2}");
        Ok(usize::from(share > 0.5))
    }

    fn check_width(&self, actual: usize) -> Result<(), TrainError> {
        if actual != self.n_features {
            return Err(TrainError::FeatureWidth {
                expected: self.n_features,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<usize>) {
        // Column 0 decides the class; column 1 is noise.
        let x = array![
            [1.0, 3.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [1.0, 0.0],
            [0.0, 3.0],
            [0.0, 1.0],
            [0.0, 2.0],
            [0.0, 0.0],
        ];
        let y = array![1, 1, 1, 1, 0, 0, 0, 0];
        (x, y)
    }

    fn params() -> ForestParams {
        ForestParams {
            n_trees: 15,
            max_features: MaxFeatures::All,
            seed: 42,
        }
    }

    #[test]
    fn learns_a_separable_split() {
        let (x, y) = separable();
        let forest = LoanForest::fit(&params(), &x, &y).unwrap();
        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.predict_row(&[1.0, 2.0]).unwrap(), 1);
        assert_eq!(forest.predict_row(&[0.0, 2.0]).unwrap(), 0);
    }

    #[test]
    fn vote_share_is_a_probability() {
        let (x, y) = separable();
        let forest = LoanForest::fit(&params(), &x, &y).unwrap();
        let proba = forest.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn same_seed_same_votes() {
        let (x, y) = separable();
        let params = ForestParams {
            max_features: MaxFeatures::Fixed(1),
            ..params()
        };
        // Column 1 alone cannot separate the classes, so leaves are impure
        // and often evenly split.
        let first = LoanForest::fit(&params, &x, &y)
            .unwrap()
            .predict_proba(&x)
            .unwrap();
        for _ in 0..20 {
            let again = LoanForest::fit(&params, &x, &y).unwrap();
            assert_eq!(again.predict_proba(&x).unwrap(), first);
        }
    }

    #[test]
    fn single_class_labels_fail() {
        let (x, _) = separable();
        let y = Array1::from_elem(8, 1);
        let err = LoanForest::fit(&params(), &x, &y).unwrap_err();
        assert!(matches!(err, TrainError::SingleClass(1)));
    }

    #[test]
    fn unsplittable_rows_vote_the_same_every_fit() {
        // Identical rows with opposite labels leave every tree a single mixed
        // leaf; bootstraps with two of each class must not flip between fits.
        let x = array![[1.0], [1.0], [1.0], [1.0]];
        let y = array![1, 0, 1, 0];
        let params = ForestParams {
            n_trees: 40,
            max_features: MaxFeatures::All,
            seed: 3,
        };
        let first = LoanForest::fit(&params, &x, &y)
            .unwrap()
            .predict_proba_row(&[1.0])
            .unwrap();
        for _ in 0..20 {
            let forest = LoanForest::fit(&params, &x, &y).unwrap();
            assert_eq!(forest.predict_proba_row(&[1.0]).unwrap(), first);
        }
    }

    #[test]
    fn wrong_row_width_is_an_error() {
        let (x, y) = separable();
        let forest = LoanForest::fit(&params(), &x, &y).unwrap();
        let err = forest.predict_row(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            TrainError::FeatureWidth {
                expected: 2,
                actual: 1
            }
        ));
    }
}
