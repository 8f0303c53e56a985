//! Logistic regression over standardized applicant features
//!
//! Fitting is full-batch gradient descent from a zero initialization, so the
//! same training set always yields the same weights.

use super::dataset::LabeledSample;
use crate::error::{ModelError, ModelResult};
use crate::schema::NUM_FEATURES;
use serde::Deserialize;

/// Default number of gradient descent passes
pub const DEFAULT_EPOCHS: usize = 500;

/// Default gradient descent step size
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default L2 penalty on the weights (bias is not penalized)
pub const DEFAULT_L2_PENALTY: f64 = 0.001;

/// Hyperparameters for fitting
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_l2_penalty")]
    pub l2_penalty: f64,
}

fn default_epochs() -> usize {
    DEFAULT_EPOCHS
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

fn default_l2_penalty() -> f64 {
    DEFAULT_L2_PENALTY
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            learning_rate: DEFAULT_LEARNING_RATE,
            l2_penalty: DEFAULT_L2_PENALTY,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> ModelResult<()> {
        if self.epochs == 0 {
            return Err(ModelError::InvalidConfig("epochs must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !(self.l2_penalty.is_finite() && self.l2_penalty >= 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "l2_penalty must be non-negative, got {}",
                self.l2_penalty
            )));
        }
        Ok(())
    }
}

/// Per-feature z-score scaling learned from the training set
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: [f64; NUM_FEATURES],
    scales: [f64; NUM_FEATURES],
}

impl Standardizer {
    pub fn fit(samples: &[LabeledSample]) -> Self {
        let n = samples.len().max(1) as f64;
        let mut means = [0.0; NUM_FEATURES];
        for sample in samples {
            for (mean, x) in means.iter_mut().zip(sample.features.iter()) {
                *mean += x / n;
            }
        }

        let mut scales = [0.0; NUM_FEATURES];
        for sample in samples {
            for i in 0..NUM_FEATURES {
                scales[i] += (sample.features[i] - means[i]).powi(2) / n;
            }
        }
        // Constant columns keep unit scale so they center to zero
        for scale in scales.iter_mut() {
            *scale = scale.sqrt();
            if *scale < f64::EPSILON {
                *scale = 1.0;
            }
        }

        Self { means, scales }
    }

    pub fn transform(&self, features: &[f64; NUM_FEATURES]) -> [f64; NUM_FEATURES] {
        let mut out = [0.0; NUM_FEATURES];
        for i in 0..NUM_FEATURES {
            out[i] = (features[i] - self.means[i]) / self.scales[i];
        }
        out
    }
}

/// Fitted classifier producing the probability of a bad applicant
#[derive(Debug, Clone)]
pub struct LogisticModel {
    scaler: Standardizer,
    weights: [f64; NUM_FEATURES],
    bias: f64,
}

impl LogisticModel {
    pub fn fit(samples: &[LabeledSample], config: &TrainingConfig) -> ModelResult<Self> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        config.validate()?;

        let scaler = Standardizer::fit(samples);
        let inputs: Vec<[f64; NUM_FEATURES]> = samples
            .iter()
            .map(|s| scaler.transform(&s.features))
            .collect();
        let targets: Vec<f64> = samples.iter().map(|s| s.risk.target()).collect();
        let n = samples.len() as f64;

        let mut weights = [0.0; NUM_FEATURES];
        let mut bias = 0.0;

        for _ in 0..config.epochs {
            let mut grad_w = [0.0; NUM_FEATURES];
            let mut grad_b = 0.0;

            for (x, y) in inputs.iter().zip(targets.iter()) {
                let err = sigmoid(linear(&weights, bias, x)) - y;
                for i in 0..NUM_FEATURES {
                    grad_w[i] += err * x[i];
                }
                grad_b += err;
            }

            for i in 0..NUM_FEATURES {
                let penalty = config.l2_penalty * weights[i];
                weights[i] -= config.learning_rate * (grad_w[i] / n + penalty);
            }
            bias -= config.learning_rate * grad_b / n;
        }

        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::Training(
                "non-finite weights, lower the learning rate".into(),
            ));
        }

        Ok(Self {
            scaler,
            weights,
            bias,
        })
    }

    /// Probability that the applicant is a bad credit risk
    pub fn probability_bad(&self, features: &[f64; NUM_FEATURES]) -> f64 {
        let x = self.scaler.transform(features);
        sigmoid(linear(&self.weights, self.bias, &x))
    }
}

fn linear(weights: &[f64; NUM_FEATURES], bias: f64, x: &[f64; NUM_FEATURES]) -> f64 {
    weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + bias
}

/// Numerically stable logistic function
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RiskClass;

    fn sample(duration: f64, amount: f64, risk: RiskClass) -> LabeledSample {
        LabeledSample {
            features: [duration, amount, 3.0, 2.0, 35.0, 1.0, 1.0],
            risk,
        }
    }

    fn separable_set() -> Vec<LabeledSample> {
        let mut samples = Vec::new();
        for i in 0..10 {
            let i = i as f64;
            samples.push(sample(6.0 + i, 600.0 + i * 100.0, RiskClass::Good));
            samples.push(sample(48.0 + i, 9000.0 + i * 500.0, RiskClass::Bad));
        }
        samples
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn test_standardizer_centers_and_scales() {
        let samples = vec![
            sample(10.0, 1000.0, RiskClass::Good),
            sample(20.0, 1000.0, RiskClass::Bad),
        ];
        let scaler = Standardizer::fit(&samples);
        let a = scaler.transform(&samples[0].features);
        let b = scaler.transform(&samples[1].features);
        assert!((a[0] + 1.0).abs() < 1e-9);
        assert!((b[0] - 1.0).abs() < 1e-9);
        // Constant column maps to zero rather than NaN
        assert_eq!(a[1], 0.0);
    }

    #[test]
    fn test_fit_separates_classes() {
        let model = LogisticModel::fit(&separable_set(), &TrainingConfig::default()).unwrap();
        let good = model.probability_bad(&[8.0, 800.0, 3.0, 2.0, 35.0, 1.0, 1.0]);
        let bad = model.probability_bad(&[54.0, 11000.0, 3.0, 2.0, 35.0, 1.0, 1.0]);
        assert!(good < 0.1, "p_bad for good applicant was {}", good);
        assert!(bad > 0.9, "p_bad for bad applicant was {}", bad);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let config = TrainingConfig::default();
        let a = LogisticModel::fit(&separable_set(), &config).unwrap();
        let b = LogisticModel::fit(&separable_set(), &config).unwrap();
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.bias, b.bias);
    }

    #[test]
    fn test_empty_training_set_rejected() {
        let err = LogisticModel::fit(&[], &TrainingConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyTrainingSet));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrainingConfig {
            epochs: 0,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            LogisticModel::fit(&separable_set(), &config),
            Err(ModelError::InvalidConfig(_))
        ));

        let config = TrainingConfig {
            learning_rate: -1.0,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
