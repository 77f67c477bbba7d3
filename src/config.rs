//! Startup settings for the predictor.
//!
//! Everything is fixed at compile time; there is no config file and no
//! command-line or environment parsing. The `with_*` builders exist so tests
//! and benchmarks can point the pipeline at other data.

use std::path::PathBuf;

use crate::error::DataError;

static DEFAULT_CSV_PATH: &str = "loan.csv";
static DEFAULT_LABEL_COLUMN: &str = "Loan_Status";
static DEFAULT_ID_COLUMN: &str = "Loan_ID";
static DEFAULT_POSITIVE_LABEL: &str = "Y";
static DEFAULT_WINDOW_TITLE: &str = "🏦 Loan Approval Predictor";

/// How many features each tree of the forest sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    Sqrt,
    /// Every feature.
    All,
    /// A fixed count, clamped to the available features.
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolves the strategy against a feature count. Never returns zero for a
    /// non-empty feature set.
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => k,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// All knobs of the load → train → predict pipeline.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub csv_path: PathBuf,
    pub label_column: String,
    /// Identifier column dropped before features are derived, if present.
    pub id_column: Option<String>,
    /// Label value treated as the approved class when the label is text.
    pub positive_label: String,
    pub test_ratio: f64,
    pub seed: u64,
    pub n_trees: usize,
    pub max_features: MaxFeatures,
    pub window_title: String,
    pub window_size: [f32; 2],
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            id_column: Some(DEFAULT_ID_COLUMN.to_string()),
            positive_label: DEFAULT_POSITIVE_LABEL.to_string(),
            test_ratio: 0.2,
            seed: 42,
            n_trees: 100,
            max_features: MaxFeatures::Sqrt,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            window_size: [540.0, 720.0],
        }
    }
}

impl PredictorConfig {
    pub fn with_csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_path = path.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_test_ratio(mut self, test_ratio: f64) -> Self {
        self.test_ratio = test_ratio;
        self
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DataError> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(DataError::InvalidConfig(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.n_trees == 0 {
            return Err(DataError::InvalidConfig(
                "n_trees must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
