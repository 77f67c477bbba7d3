use ndarray::Array1;
use tracing::info;

use crate::config::PredictorConfig;
use crate::data::{PreparedData, train_test_split};
use crate::error::TrainError;
use crate::forest::{ForestParams, LoanForest};

/// A fitted forest and how well it did on rows it never saw.
#[derive(Debug)]
pub struct TrainedModel {
    pub forest: LoanForest,
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Fraction of positions where `predicted` matches `expected`.
pub fn accuracy(predicted: &Array1<usize>, expected: &Array1<usize>) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(expected.iter())
        .filter(|(p, e)| p == e)
        .count();
    correct as f64 / expected.len() as f64
}

/// Splits the data, fits the forest on the training part and scores it on the
/// held-out part.
pub fn train(data: &PreparedData, config: &PredictorConfig) -> Result<TrainedModel, TrainError> {
    let split = train_test_split(data.n_rows(), config.test_ratio, config.seed)?;
    let (x_train, y_train) = data.select(&split.train);
    let (x_test, y_test) = data.select(&split.test);
    info!(
        "Training on {} rows, holding out {}",
        split.train.len(),
        split.test.len()
    );

    let params = ForestParams {
        n_trees: config.n_trees,
        max_features: config.max_features,
        seed: config.seed,
    };
    let forest = LoanForest::fit(&params, &x_train, &y_train)?;
    let accuracy = accuracy(&forest.predict(&x_test)?, &y_test);

    Ok(TrainedModel {
        forest,
        accuracy,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
    })
}
