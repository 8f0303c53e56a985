//! Wire contract for the scoring endpoints
//!
//! Field names mirror the public JSON payloads exactly, so every struct
//! renames its snake_case fields to the applicant attribute names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of applicant attributes fed to the classifier
pub const NUM_FEATURES: usize = 7;

/// Applicant attribute names, in feature-vector order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "Duration_in_month",
    "Credit_amount",
    "Installment_rate_in_percentage_of_disposable_income",
    "Present_residence_since",
    "Age_in_years",
    "Number_of_existing_credits_at_this_bank",
    "Number_of_people_being_liable_to_provide_maintenance_for",
];

/// Name of the risk label field in responses and feedback records
pub const RISK_FIELD: &str = "Cost_Matrix_Risk";

/// Applicant description submitted for scoring
///
/// Every field is a required integer. There is no range validation: an age
/// of 400 is accepted and scored like any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "Duration_in_month")]
    pub duration_in_month: i64,
    #[serde(rename = "Credit_amount")]
    pub credit_amount: i64,
    #[serde(rename = "Installment_rate_in_percentage_of_disposable_income")]
    pub installment_rate: i64,
    #[serde(rename = "Present_residence_since")]
    pub present_residence_since: i64,
    #[serde(rename = "Age_in_years")]
    pub age_in_years: i64,
    #[serde(rename = "Number_of_existing_credits_at_this_bank")]
    pub existing_credits: i64,
    #[serde(rename = "Number_of_people_being_liable_to_provide_maintenance_for")]
    pub dependents: i64,
}

impl PredictionRequest {
    /// Feature vector in [`FEATURE_NAMES`] order
    pub fn features(&self) -> [f64; NUM_FEATURES] {
        [
            self.duration_in_month as f64,
            self.credit_amount as f64,
            self.installment_rate as f64,
            self.present_residence_since as f64,
            self.age_in_years as f64,
            self.existing_credits as f64,
            self.dependents as f64,
        ]
    }
}

/// Cost-matrix risk class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    Good,
    Bad,
}

impl RiskClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskClass::Good => "good",
            RiskClass::Bad => "bad",
        }
    }

    /// Training target: 1.0 for bad applicants
    pub fn target(&self) -> f64 {
        match self {
            RiskClass::Good => 0.0,
            RiskClass::Bad => 1.0,
        }
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoring result returned to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "Cost_Matrix_Risk")]
    pub cost_matrix_risk: RiskClass,
}

impl From<RiskClass> for PredictionResponse {
    fn from(risk: RiskClass) -> Self {
        Self {
            cost_matrix_risk: risk,
        }
    }
}

/// Labeled training example submitted through the feedback loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(flatten)]
    pub applicant: PredictionRequest,
    #[serde(rename = "Cost_Matrix_Risk")]
    pub risk: RiskClass,
}

impl FeedbackRecord {
    pub fn new(applicant: PredictionRequest, risk: RiskClass) -> Self {
        Self { applicant, risk }
    }
}

/// Fixed health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAck {
    pub hackathon: String,
}

impl Default for HealthAck {
    fn default() -> Self {
        Self {
            hackathon: "go through it".to_string(),
        }
    }
}

/// Acknowledgment with a human readable detail string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn feedback_successful() -> Self {
        Self::new("Feedback loop successful")
    }
}
