use std::io::Write;

use loan_approval::bootstrap;
use loan_approval::config::PredictorConfig;
use loan_approval::data::{FeatureKind, load_dataset};
use loan_approval::forest::{ForestParams, LoanForest};
use loan_approval::error::{DataError, TrainError};
use loan_approval::predictor::Outcome;
use tempfile::NamedTempFile;

const HEADER: &str = "Loan_ID,Gender,Married,Education,ApplicantIncome,LoanAmount,Credit_History,Property_Area,Loan_Status";

fn loans_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for i in 0..60 {
        let gender = if i % 3 == 0 { "Female" } else { "Male" };
        let married = if i % 2 == 0 { "Yes" } else { "No" };
        let education = if i % 5 == 0 { "Not Graduate" } else { "Graduate" };
        let income = 2000 + i * 150;
        let amount = 90 + i % 7 * 10;
        let credit = if i % 4 == 0 { "0.0" } else { "1.0" };
        let area = ["Urban", "Rural", "Semiurban"][i % 3];
        let status = if credit == "1.0" { "Y" } else { "N" };
        writeln!(
            file,
            "LP{i:04},{gender},{married},{education},{income},{amount},{credit},{area},{status}"
        )
        .unwrap();
    }
    // Incomplete rows are dropped before training.
    writeln!(file, "LP9998,,Yes,Graduate,4000,100,1.0,Urban,Y").unwrap();
    writeln!(file, "LP9999,Male,Yes,Graduate,NA,100,1.0,Urban,N").unwrap();
    file.flush().unwrap();
    file
}

fn config_for(file: &NamedTempFile) -> PredictorConfig {
    PredictorConfig::default()
        .with_csv_path(file.path())
        .with_n_trees(25)
}

fn applicant(credit: &str) -> Vec<&str> {
    vec!["Male", "Yes", "Graduate", "5849", "120", credit, "Urban"]
}

#[test]
fn cleaned_dataset_has_no_identifier_and_no_gaps() {
    let file = loans_csv();
    let data = load_dataset(&config_for(&file)).unwrap();

    assert_eq!(data.n_rows(), 60);
    assert_eq!(data.dropped_rows, 2);
    assert!(!data.column_names().contains(&"Loan_ID"));
    assert!(!data.column_names().contains(&"Loan_Status"));
    assert!(data.features.iter().all(|v| v.is_finite()));

    let categorical: Vec<&str> = data
        .columns
        .iter()
        .filter(|c| matches!(c.kind, FeatureKind::Categorical(_)))
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        categorical,
        vec!["Gender", "Married", "Education", "Property_Area"]
    );
}

#[test]
fn same_file_same_accuracy() {
    let file = loans_csv();
    let config = config_for(&file);
    let (_, first) = bootstrap(&config).unwrap();
    let (_, second) = bootstrap(&config).unwrap();
    assert_eq!(first, second);
    assert!((0.0..=1.0).contains(&first));
}

#[test]
fn shipped_dataset_fits_the_same_forest_every_time() {
    let config = PredictorConfig::default()
        .with_csv_path(concat!(env!("CARGO_MANIFEST_DIR"), "/loan.csv"))
        .with_seed(7);
    let data = load_dataset(&config).unwrap();
    let params = ForestParams {
        n_trees: config.n_trees,
        max_features: config.max_features,
        seed: config.seed,
    };

    let first = LoanForest::fit(&params, &data.features, &data.labels)
        .unwrap()
        .predict_proba(&data.features)
        .unwrap();
    for _ in 0..3 {
        let again = LoanForest::fit(&params, &data.features, &data.labels).unwrap();
        assert_eq!(again.predict_proba(&data.features).unwrap(), first);
    }
}

#[test]
fn complete_applicant_gets_one_of_two_outcomes() {
    let file = loans_csv();
    let (predictor, _) = bootstrap(&config_for(&file)).unwrap();

    for credit in ["1", "0"] {
        let outcome = predictor.predict(&applicant(credit)).unwrap();
        assert!(matches!(outcome, Outcome::Approved | Outcome::NotApproved));
        assert!(["Approved", "Not Approved"].contains(&outcome.label()));
    }
    // Credit history alone decides the synthetic labels.
    assert_eq!(predictor.predict(&applicant("1")).unwrap(), Outcome::Approved);
}

#[test]
fn empty_numeric_field_is_a_named_validation_error() {
    let file = loans_csv();
    let (predictor, _) = bootstrap(&config_for(&file)).unwrap();

    let mut form = applicant("1");
    form[4] = "";
    let err = predictor.predict(&form).unwrap_err();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("LoanAmount"));
}

#[test]
fn unseen_category_is_a_validation_error() {
    let file = loans_csv();
    let (predictor, _) = bootstrap(&config_for(&file)).unwrap();

    let mut form = applicant("1");
    form[6] = "Downtown";
    let err = predictor.predict(&form).unwrap_err();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("Property_Area"));
}

#[test]
fn missing_label_column_fails_startup() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Loan_ID,Gender,ApplicantIncome").unwrap();
    writeln!(file, "LP0001,Male,5000").unwrap();
    file.flush().unwrap();

    let err = bootstrap(&config_for(&file)).unwrap_err();
    assert!(matches!(
        err,
        TrainError::Data(DataError::MissingLabel(ref name)) if name == "Loan_Status"
    ));
}

#[test]
fn missing_file_fails_startup() {
    let config = PredictorConfig::default().with_csv_path("does/not/exist.csv");
    let err = bootstrap(&config).unwrap_err();
    assert!(matches!(err, TrainError::Data(DataError::Open { .. })));
}
