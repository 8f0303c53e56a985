//! Cost-sensitive decision rule
//!
//! Approving a bad applicant costs more than rejecting a good one, so the
//! classifier flags an applicant as bad well before `p_bad` reaches 0.5.

use crate::error::{ModelError, ModelResult};
use crate::schema::RiskClass;
use serde::Deserialize;

/// Cost of labeling a bad applicant as good
pub const DEFAULT_BAD_AS_GOOD_COST: f64 = 5.0;

/// Cost of labeling a good applicant as bad
pub const DEFAULT_GOOD_AS_BAD_COST: f64 = 1.0;

/// Misclassification costs (correct decisions cost nothing)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CostMatrix {
    #[serde(default = "default_bad_as_good")]
    pub bad_as_good: f64,
    #[serde(default = "default_good_as_bad")]
    pub good_as_bad: f64,
}

fn default_bad_as_good() -> f64 {
    DEFAULT_BAD_AS_GOOD_COST
}

fn default_good_as_bad() -> f64 {
    DEFAULT_GOOD_AS_BAD_COST
}

impl Default for CostMatrix {
    fn default() -> Self {
        Self {
            bad_as_good: DEFAULT_BAD_AS_GOOD_COST,
            good_as_bad: DEFAULT_GOOD_AS_BAD_COST,
        }
    }
}

impl CostMatrix {
    pub fn validate(&self) -> ModelResult<()> {
        for (name, cost) in [
            ("bad_as_good", self.bad_as_good),
            ("good_as_bad", self.good_as_bad),
        ] {
            if !(cost.is_finite() && cost > 0.0) {
                return Err(ModelError::InvalidConfig(format!(
                    "cost_matrix.{} must be a positive number, got {}",
                    name, cost
                )));
            }
        }
        Ok(())
    }

    /// Probability of `bad` above which rejecting is the cheaper decision
    pub fn threshold(&self) -> f64 {
        self.good_as_bad / (self.good_as_bad + self.bad_as_good)
    }

    /// Pick the class with the lower expected cost
    pub fn classify(&self, probability_bad: f64) -> RiskClass {
        let cost_if_good = probability_bad * self.bad_as_good;
        let cost_if_bad = (1.0 - probability_bad) * self.good_as_bad;
        if cost_if_good > cost_if_bad {
            RiskClass::Bad
        } else {
            RiskClass::Good
        }
    }
}
