//! Binary logistic classifier, fit by full-batch gradient descent.
//!
//! Deliberately small: a handful of weights trained on a few thousand rows.
//! Fitting is fully deterministic (no random initialization, no sampling),
//! so the same rows and config always produce the same model. Feature
//! normalization statistics are captured at fit time and serialized with the
//! weights, so a loaded model is self-contained.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Hyperparameters for gradient-descent fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub learning_rate: f64,
    /// L2 regularization strength
    pub l2: f64,
    pub epochs: usize,
    /// Reweight classes by inverse frequency. Home-court advantage skews the
    /// label distribution, so this is on by default.
    pub balance_classes: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            l2: 1e-3,
            epochs: 500,
            balance_classes: true,
        }
    }
}

/// Fitted logistic-regression state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    bias: f64,
    // z-score statistics from the training matrix
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl LogisticModel {
    /// Fit on a feature matrix and 0/1 labels. Every row must have the same
    /// width; at least one row and one feature are required.
    pub fn fit(features: &[Vec<f64>], labels: &[u8], config: &ClassifierConfig) -> Result<Self> {
        if features.is_empty() {
            bail!("cannot fit classifier: no training rows");
        }
        if features.len() != labels.len() {
            bail!(
                "cannot fit classifier: {} rows but {} labels",
                features.len(),
                labels.len()
            );
        }
        let n_features = features[0].len();
        if n_features == 0 {
            bail!("cannot fit classifier: rows have no features");
        }
        if let Some(bad) = features.iter().find(|row| row.len() != n_features) {
            bail!(
                "cannot fit classifier: inconsistent row width ({} vs {})",
                bad.len(),
                n_features
            );
        }

        let n_samples = features.len();

        // z-score normalization statistics
        let mut means = vec![0.0; n_features];
        for row in features {
            for (j, &v) in row.iter().enumerate() {
                means[j] += v;
            }
        }
        for m in means.iter_mut() {
            *m /= n_samples as f64;
        }
        let mut stds = vec![0.0; n_features];
        for row in features {
            for (j, &v) in row.iter().enumerate() {
                let diff = v - means[j];
                stds[j] += diff * diff;
            }
        }
        for s in stds.iter_mut() {
            *s = (*s / n_samples as f64).sqrt().max(1e-10);
        }

        // Inverse-frequency class weights
        let n_pos = labels.iter().filter(|&&l| l == 1).count();
        let n_neg = n_samples - n_pos;
        let (w_pos, w_neg) = if config.balance_classes && n_pos > 0 && n_neg > 0 {
            (
                n_samples as f64 / (2.0 * n_pos as f64),
                n_samples as f64 / (2.0 * n_neg as f64),
            )
        } else {
            (1.0, 1.0)
        };

        let normalized: Vec<Vec<f64>> = features
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(j, &v)| (v - means[j]) / stds[j])
                    .collect()
            })
            .collect();

        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0f64;
        let total_weight: f64 = labels
            .iter()
            .map(|&l| if l == 1 { w_pos } else { w_neg })
            .sum();

        for _ in 0..config.epochs {
            let mut grad_w = vec![0.0; n_features];
            let mut grad_b = 0.0;

            for (row, &label) in normalized.iter().zip(labels) {
                let z = dot(&weights, row) + bias;
                let sample_weight = if label == 1 { w_pos } else { w_neg };
                let error = (sigmoid(z) - label as f64) * sample_weight;
                for (g, &x) in grad_w.iter_mut().zip(row) {
                    *g += error * x;
                }
                grad_b += error;
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                let grad = g / total_weight + 2.0 * config.l2 * *w;
                *w -= config.learning_rate * grad;
            }
            bias -= config.learning_rate * grad_b / total_weight;
        }

        Ok(Self {
            weights,
            bias,
            means,
            stds,
        })
    }

    /// P(label = 1) for one feature row, in fit-time column order.
    /// The complementary class probability is exactly `1.0 - p`.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.weights.len());
        let z: f64 = features
            .iter()
            .enumerate()
            .map(|(j, &v)| self.weights[j] * (v - self.means[j]) / self.stds[j])
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Linearly separable toy set: label 1 iff first feature >= 10
    fn separable() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let x = i as f64;
            features.push(vec![x, 10.0 - x]);
            labels.push((x >= 10.0) as u8);
        }
        (features, labels)
    }

    #[test]
    fn test_fit_separates_simple_data() {
        let (features, labels) = separable();
        let model = LogisticModel::fit(&features, &labels, &ClassifierConfig::default()).unwrap();

        for (row, &label) in features.iter().zip(&labels) {
            let p = model.predict_proba(row);
            assert!((0.0..=1.0).contains(&p));
            assert_eq!((p >= 0.5) as u8, label, "row {row:?}");
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (features, labels) = separable();
        let config = ClassifierConfig::default();
        let a = LogisticModel::fit(&features, &labels, &config).unwrap();
        let b = LogisticModel::fit(&features, &labels, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_probability_pair_sums_to_one() {
        let (features, labels) = separable();
        let model = LogisticModel::fit(&features, &labels, &ClassifierConfig::default()).unwrap();
        for row in &features {
            let p = model.predict_proba(row);
            assert_relative_eq!(p + (1.0 - p), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_class_weighting_handles_skewed_labels() {
        // 18 positives, 2 negatives; without weighting the intercept alone
        // would call everything positive
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..18 {
            features.push(vec![20.0 + (i % 3) as f64]);
            labels.push(1);
        }
        for i in 0..2 {
            features.push(vec![0.0 + i as f64]);
            labels.push(0);
        }
        let model = LogisticModel::fit(&features, &labels, &ClassifierConfig::default()).unwrap();
        assert!(model.predict_proba(&[0.5]) < 0.5);
        assert!(model.predict_proba(&[21.0]) > 0.5);
    }

    #[test]
    fn test_serde_round_trip_is_bit_identical() {
        let (features, labels) = separable();
        let model = LogisticModel::fit(&features, &labels, &ClassifierConfig::default()).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let reloaded: LogisticModel = serde_json::from_str(&json).unwrap();

        for row in &features {
            // Bit-identical, not merely close
            assert_eq!(
                model.predict_proba(row).to_bits(),
                reloaded.predict_proba(row).to_bits()
            );
        }
    }

    #[test]
    fn test_fit_rejects_degenerate_input() {
        assert!(LogisticModel::fit(&[], &[], &ClassifierConfig::default()).is_err());
        assert!(
            LogisticModel::fit(&[vec![1.0], vec![1.0, 2.0]], &[0, 1], &ClassifierConfig::default())
                .is_err()
        );
    }
}
