//! Seed training data
//!
//! The CSV header uses the same attribute names as the JSON payloads plus a
//! `Cost_Matrix_Risk` column holding `good` or `bad`.

use crate::error::{ModelError, ModelResult};
use crate::schema::{FeedbackRecord, PredictionRequest, RiskClass, NUM_FEATURES};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One training example in feature-vector form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub features: [f64; NUM_FEATURES],
    pub risk: RiskClass,
}

impl From<&FeedbackRecord> for LabeledSample {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            features: record.applicant.features(),
            risk: record.risk,
        }
    }
}

// csv cannot deserialize integers through #[serde(flatten)], so the row
// layout is spelled out instead of reusing FeedbackRecord.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Duration_in_month")]
    duration_in_month: i64,
    #[serde(rename = "Credit_amount")]
    credit_amount: i64,
    #[serde(rename = "Installment_rate_in_percentage_of_disposable_income")]
    installment_rate: i64,
    #[serde(rename = "Present_residence_since")]
    present_residence_since: i64,
    #[serde(rename = "Age_in_years")]
    age_in_years: i64,
    #[serde(rename = "Number_of_existing_credits_at_this_bank")]
    existing_credits: i64,
    #[serde(rename = "Number_of_people_being_liable_to_provide_maintenance_for")]
    dependents: i64,
    #[serde(rename = "Cost_Matrix_Risk")]
    risk: RiskClass,
}

impl From<CsvRow> for FeedbackRecord {
    fn from(row: CsvRow) -> Self {
        FeedbackRecord::new(
            PredictionRequest {
                duration_in_month: row.duration_in_month,
                credit_amount: row.credit_amount,
                installment_rate: row.installment_rate,
                present_residence_since: row.present_residence_since,
                age_in_years: row.age_in_years,
                existing_credits: row.existing_credits,
                dependents: row.dependents,
            },
            row.risk,
        )
    }
}

/// Parse labeled records from CSV text with a header row
pub fn read_records<R: Read>(reader: R) -> ModelResult<Vec<FeedbackRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, row)| {
            row.map(FeedbackRecord::from)
                .map_err(|source| ModelError::DatasetRow { row: idx + 1, source })
        })
        .collect()
}

/// Load the seed training set from disk
pub fn load_samples(path: &Path) -> ModelResult<Vec<LabeledSample>> {
    let file = File::open(path).map_err(|source| ModelError::Dataset {
        path: path.to_path_buf(),
        source,
    })?;

    let records = read_records(file)?;
    debug!(path = ?path, rows = records.len(), "Loaded training data");

    Ok(records.iter().map(LabeledSample::from).collect())
}
