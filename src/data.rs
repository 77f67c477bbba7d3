//! Dataset loading, cleaning and label encoding.

use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::config::PredictorConfig;
use crate::error::DataError;

/// Cell values treated as missing, in addition to blank cells.
static MISSING_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "#N/A N/A",
    "#NA", "<NA>", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN",
];

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

/// Raw CSV contents: a header and string cells, row-major.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Reads a CSV file with a header row.
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!(
            "Loaded {} rows and {} columns from {}",
            table.height(),
            table.width(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Table { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[idx].as_str())
    }

    /// Removes every row with at least one missing cell. Returns how many rows
    /// were dropped.
    pub fn drop_missing(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(|cell| is_missing(cell)));
        before - self.rows.len()
    }

    /// Removes a column by name. Returns `false` when there was no such column.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.headers.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }
}

/// Bidirectional mapping between the distinct values of a text column and
/// small integer codes. Codes follow the sorted order of the values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnEncoder {
    classes: Vec<String>,
}

impl ColumnEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        ColumnEncoder {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Code for a value seen at fit time; `None` for anything else.
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Known values in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// How a feature column is fed to the model and shown in the form.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureKind {
    Categorical(ColumnEncoder),
    Numeric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: FeatureKind,
}

/// The cleaned dataset, ready for training.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub columns: Vec<FeatureColumn>,
    /// Rows × features, in `columns` order.
    pub features: Array2<f64>,
    /// `1` for the positive (approved) class, `0` otherwise.
    pub labels: Array1<usize>,
    pub dropped_rows: usize,
}

impl PreparedData {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Copies the given rows into a standalone records/targets pair.
    pub fn select(&self, rows: &[usize]) -> (Array2<f64>, Array1<usize>) {
        (
            self.features.select(Axis(0), rows),
            self.labels.select(Axis(0), rows),
        )
    }
}

/// Loads and prepares the dataset named by `config`.
pub fn load_dataset(config: &PredictorConfig) -> Result<PreparedData, DataError> {
    config.validate()?;
    let table = Table::from_path(&config.csv_path)?;
    prepare(table, config)
}

/// Drops incomplete rows and the identifier column, encodes text columns and
/// splits off the label.
pub fn prepare(mut table: Table, config: &PredictorConfig) -> Result<PreparedData, DataError> {
    let dropped_rows = table.drop_missing();
    if dropped_rows > 0 {
        info!("Dropped {dropped_rows} rows with missing values");
    }
    if let Some(id) = &config.id_column {
        if table.drop_column(id) {
            info!("Dropped identifier column {id}");
        }
    }

    let label_idx = table
        .column_index(&config.label_column)
        .ok_or_else(|| DataError::MissingLabel(config.label_column.clone()))?;
    if table.width() < 2 {
        return Err(DataError::NoFeatures);
    }
    if table.height() == 0 {
        return Err(DataError::Empty);
    }

    let labels = encode_labels(&table, label_idx, config)?;

    let mut columns = Vec::with_capacity(table.width() - 1);
    let mut values: Vec<Vec<f64>> = Vec::with_capacity(table.width() - 1);
    for (idx, name) in table.headers().iter().enumerate() {
        if idx == label_idx {
            continue;
        }
        let (kind, encoded) = encode_column(&table, idx);
        if let FeatureKind::Categorical(encoder) = &kind {
            info!("Encoded {name} with {} categories", encoder.len());
        }
        columns.push(FeatureColumn {
            name: name.clone(),
            kind,
        });
        values.push(encoded);
    }

    let features = Array2::from_shape_fn((table.height(), columns.len()), |(r, c)| values[c][r]);

    Ok(PreparedData {
        columns,
        features,
        labels,
        dropped_rows,
    })
}

fn encode_column(table: &Table, idx: usize) -> (FeatureKind, Vec<f64>) {
    let parsed: Option<Vec<f64>> = table.column(idx).map(|v| v.parse::<f64>().ok()).collect();
    match parsed {
        Some(numbers) => (FeatureKind::Numeric, numbers),
        None => {
            let encoder = ColumnEncoder::fit(table.column(idx));
            let codes = table
                .column(idx)
                .map(|v| encoder.encode(v).unwrap_or_default() as f64)
                .collect();
            (FeatureKind::Categorical(encoder), codes)
        }
    }
}

fn encode_labels(
    table: &Table,
    idx: usize,
    config: &PredictorConfig,
) -> Result<Array1<usize>, DataError> {
    let column = config.label_column.clone();
    let numeric: Option<Vec<f64>> = table.column(idx).map(|v| v.parse::<f64>().ok()).collect();

    if let Some(numbers) = numeric {
        let mut labels = Vec::with_capacity(numbers.len());
        for n in numbers {
            if n == 0.0 {
                labels.push(0);
            } else if n == 1.0 {
                labels.push(1);
            } else {
                let found = ColumnEncoder::fit(table.column(idx)).classes().to_vec();
                return Err(DataError::NonBinaryLabel { column, found });
            }
        }
        return Ok(Array1::from_vec(labels));
    }

    let encoder = ColumnEncoder::fit(table.column(idx));
    if encoder.len() > 2 {
        return Err(DataError::NonBinaryLabel {
            column,
            found: encoder.classes().to_vec(),
        });
    }
    if encoder.encode(&config.positive_label).is_none() {
        return Err(DataError::MissingPositiveLabel {
            column,
            positive: config.positive_label.clone(),
        });
    }

    Ok(table
        .column(idx)
        .map(|v| usize::from(v == config.positive_label))
        .collect())
}

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n_rows` with a seeded RNG and takes the first
/// `ceil(n_rows * test_ratio)` indices as the test set.
pub fn train_test_split(n_rows: usize, test_ratio: f64, seed: u64) -> Result<Split, DataError> {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = ((n_rows as f64) * test_ratio).ceil() as usize;
    if test_size == 0 || test_size >= n_rows {
        return Err(DataError::TooFewRows(n_rows));
    }
    let train = indices.split_off(test_size);

    Ok(Split {
        train,
        test: indices,
    })
}
