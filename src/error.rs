//! Error types for each stage of the pipeline.

use std::path::PathBuf;

/// Failures while loading or preparing the dataset. All of these are fatal at
/// startup.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset has no label column named {0:?}")]
    MissingLabel(String),
    #[error("Dataset has no feature columns besides the label")]
    NoFeatures,
    #[error("Dataset has no complete rows after dropping missing values")]
    Empty,
    #[error("Label column {column:?} must be binary, found values {found:?}")]
    NonBinaryLabel { column: String, found: Vec<String> },
    #[error("Label column {column:?} never contains the positive value {positive:?}")]
    MissingPositiveLabel { column: String, positive: String },
    #[error("Need at least two rows to split into train and test sets, got {0}")]
    TooFewRows(usize),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures while fitting or querying the forest.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("Cannot train on an empty dataset")]
    Empty,
    #[error("Training labels contain a single class ({0}); need both outcomes")]
    SingleClass(usize),
    #[error("Records and labels disagree: {records} rows vs {labels} labels")]
    LengthMismatch { records: usize, labels: usize },
    #[error("Expected {expected} feature values, got {actual}")]
    FeatureWidth { expected: usize, actual: usize },
    #[error("Decision tree fit failed: {0}")]
    Fit(String),
}

/// Why a single form field was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldReason {
    #[error("a value is required")]
    Empty,
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("{0:?} is not one of the known values")]
    UnknownCategory(String),
}

/// A form field that could not be turned into a model input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Please enter {field}: {reason}")]
pub struct FieldError {
    pub field: String,
    pub reason: FieldReason,
}

/// Failures of the predict action. None of these terminate the window.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("Form has {actual} values but the model expects {expected}")]
    Arity { expected: usize, actual: usize },
    #[error("Prediction failed: {0}")]
    Model(#[from] TrainError),
}

impl PredictError {
    /// Input problems get their own dialog title; everything else is generic.
    pub fn is_input_error(&self) -> bool {
        matches!(self, PredictError::Field(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_message_names_the_column() {
        let err = FieldError {
            field: "ApplicantIncome".to_string(),
            reason: FieldReason::Empty,
        };
        assert_eq!(
            err.to_string(),
            "Please enter ApplicantIncome: a value is required"
        );
    }

    #[test]
    fn only_field_errors_are_input_errors() {
        let field = PredictError::from(FieldError {
            field: "Gender".to_string(),
            reason: FieldReason::UnknownCategory("X".to_string()),
        });
        assert!(field.is_input_error());
        assert_eq!(
            field.to_string(),
            "Please enter Gender: \"X\" is not one of the known values"
        );
        assert!(!PredictError::Model(TrainError::Empty).is_input_error());
    }
}
