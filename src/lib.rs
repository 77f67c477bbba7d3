//! # loan-approval 🏦
//!
//! Predict loan approval from applicant attributes with a decision forest.
//!
//! At startup the crate reads a loan CSV, drops incomplete rows and the
//! `Loan_ID` column, label-encodes every text column, and fits a bagged forest
//! of [`linfa-trees`](https://crates.io/crates/linfa-trees) decision trees on a
//! seeded 80/20 split. An [`egui`](https://crates.io/crates/egui) window then
//! offers one input per feature column and predicts on demand.
//!
//! ## Features
//! - Missing-value filtering and per-column label encoding
//! - Reproducible train/test split and forest (fixed seed)
//! - Held-out accuracy reporting
//! - Typed validation errors for every form field
//! - Benchmarkable with [Criterion](https://crates.io/crates/criterion)
//!
//! ## Example
//! ```rust,no_run
//! use loan_approval::config::PredictorConfig;
//!
//! let config = PredictorConfig::default();
//! let (predictor, accuracy) = loan_approval::bootstrap(&config).unwrap();
//! println!("accuracy {accuracy:.2}");
//! let form = vec!["1"; predictor.columns().len()];
//! match predictor.predict(&form) {
//!     Ok(outcome) => println!("{}", outcome.label()),
//!     Err(err) => println!("{err}"),
//! }
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod forest;
pub mod logging;
pub mod predictor;
pub mod training;

use tracing::info;

use crate::config::PredictorConfig;
use crate::error::TrainError;
use crate::forest::LoanForest;
use crate::predictor::Predictor;

/// Loads the dataset, trains the forest and pairs it with the feature columns
/// it was trained on. Returns the predictor and its held-out accuracy.
pub fn bootstrap(config: &PredictorConfig) -> Result<(Predictor<LoanForest>, f64), TrainError> {
    let data = data::load_dataset(config)?;
    let model = training::train(&data, config)?;
    info!(
        "Forest of {} trees ready, accuracy {:.3}",
        model.forest.n_trees(),
        model.accuracy
    );
    Ok((Predictor::new(data.columns, model.forest), model.accuracy))
}
