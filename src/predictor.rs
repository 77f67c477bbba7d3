//! Turning form values into a single prediction.

use tracing::warn;

use crate::data::{FeatureColumn, FeatureKind};
use crate::error::{FieldError, FieldReason, PredictError, TrainError};
use crate::forest::LoanForest;

/// Anything that can classify one feature row as `0` or `1`.
pub trait Classifier {
    fn predict_row(&self, row: &[f64]) -> Result<usize, TrainError>;
}

impl Classifier for LoanForest {
    fn predict_row(&self, row: &[f64]) -> Result<usize, TrainError> {
        LoanForest::predict_row(self, row)
    }
}

/// The two things a prediction can say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Approved,
    NotApproved,
}

impl Outcome {
    pub fn from_class(class: usize) -> Self {
        if class == 1 {
            Outcome::Approved
        } else {
            Outcome::NotApproved
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Approved => "Approved",
            Outcome::NotApproved => "Not Approved",
        }
    }

    /// Text for the result dialog.
    pub fn message(self) -> String {
        match self {
            Outcome::Approved => format!("✅ Loan {}", self.label()),
            Outcome::NotApproved => format!("❌ Loan {}", self.label()),
        }
    }
}

/// Feature columns in training order plus the model that was fit on them.
#[derive(Debug)]
pub struct Predictor<C> {
    columns: Vec<FeatureColumn>,
    classifier: C,
}

impl<C: Classifier> Predictor<C> {
    pub fn new(columns: Vec<FeatureColumn>, classifier: C) -> Self {
        Predictor {
            columns,
            classifier,
        }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Builds the model input row from the text of each form control.
    /// `values` must line up with `columns()`.
    pub fn assemble<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<f64>, PredictError> {
        if values.len() != self.columns.len() {
            return Err(PredictError::Arity {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| encode_field(column, value.as_ref()).map_err(PredictError::from))
            .collect()
    }

    /// Validates the form and runs the model once. The model is not called
    /// when any field is rejected.
    pub fn predict<S: AsRef<str>>(&self, values: &[S]) -> Result<Outcome, PredictError> {
        let row = self.assemble(values).inspect_err(|e| warn!("Rejected input: {e}"))?;
        let class = self.classifier.predict_row(&row)?;
        Ok(Outcome::from_class(class))
    }
}

fn encode_field(column: &FeatureColumn, raw: &str) -> Result<f64, FieldError> {
    let raw = raw.trim();
    let reject = |reason| FieldError {
        field: column.name.clone(),
        reason,
    };

    match &column.kind {
        FeatureKind::Categorical(encoder) => encoder
            .encode(raw)
            .map(|code| code as f64)
            .ok_or_else(|| reject(FieldReason::UnknownCategory(raw.to_string()))),
        FeatureKind::Numeric => {
            if raw.is_empty() {
                return Err(reject(FieldReason::Empty));
            }
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| reject(FieldReason::NotANumber(raw.to_string())))
        }
    }
}
