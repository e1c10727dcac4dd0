use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierConfig, LogisticModel};
use crate::models::TrainingRow;

/// Bumped whenever the serialized layout changes; loads reject other versions
pub const ARTIFACT_VERSION: u32 = 1;

/// Training configuration. The seed fixes the stratified split, and the
/// classifier itself is deterministic, so a whole run is reproducible.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub classifier: ClassifierConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// The fitted classifier together with the exact feature-column order it was
/// fit on. The two always travel as one unit; inference must never
/// reconstruct the column list on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub artifact_version: u32,
    pub feature_columns: Vec<String>,
    pub classifier: LogisticModel,
}

/// Held-out evaluation metrics from one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracy: f64,
    /// None when the test fold contains a single class; a one-class AUC is
    /// meaningless and is reported as undefined instead of computed.
    pub roc_auc: Option<f64>,
}

/// Train a win-probability classifier over pre-built feature rows.
/// Returns the persistable artifact and the held-out metrics.
pub fn train(
    columns: &[String],
    rows: &[TrainingRow],
    config: &TrainConfig,
) -> Result<(ModelArtifact, TrainReport)> {
    if rows.is_empty() {
        bail!("cannot train: no feature rows (build the training data first)");
    }
    if columns.is_empty() {
        bail!("cannot train: no feature columns");
    }
    if let Some(bad) = rows.iter().find(|r| r.features.len() != columns.len()) {
        bail!(
            "cannot train: row has {} features but {} columns are declared",
            bad.features.len(),
            columns.len()
        );
    }
    if !(0.0..1.0).contains(&config.test_fraction) {
        bail!(
            "test fraction must be in [0, 1), got {}",
            config.test_fraction
        );
    }

    let (train_idx, test_idx) = stratified_split(rows, config.test_fraction, config.seed);

    let train_features: Vec<Vec<f64>> = train_idx.iter().map(|&i| rows[i].features.clone()).collect();
    let train_labels: Vec<u8> = train_idx.iter().map(|&i| rows[i].label).collect();

    let classifier = LogisticModel::fit(&train_features, &train_labels, &config.classifier)?;

    let test_labels: Vec<u8> = test_idx.iter().map(|&i| rows[i].label).collect();
    let test_scores: Vec<f64> = test_idx
        .iter()
        .map(|&i| classifier.predict_proba(&rows[i].features))
        .collect();

    let report = TrainReport {
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        accuracy: accuracy(&test_labels, &test_scores),
        roc_auc: roc_auc(&test_labels, &test_scores),
    };

    let artifact = ModelArtifact {
        artifact_version: ARTIFACT_VERSION,
        feature_columns: columns.to_vec(),
        classifier,
    };

    Ok((artifact, report))
}

/// Split row indices into (train, test), sampling the test fold from each
/// label class separately so the label balance carries over. Shuffling uses
/// a seeded RNG; the same seed always yields the same split.
pub fn stratified_split(
    rows: &[TrainingRow],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut indices: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.label == class)
            .map(|(i, _)| i)
            .collect();
        indices.shuffle(&mut rng);

        // Never let the test fold swallow an entire class
        let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(indices.len().saturating_sub(1));

        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Fraction of rows where thresholding the score at 0.5 matches the label.
/// Returns 0.0 for an empty fold.
pub fn accuracy(labels: &[u8], scores: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(scores)
        .filter(|(&l, &s)| (s >= 0.5) as u8 == l)
        .count();
    correct as f64 / labels.len() as f64
}

/// Rank-based ROC-AUC (Mann-Whitney statistic) with midrank tie handling.
/// Undefined, and therefore `None`, when either class is absent.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap());

    // Midranks: tied scores share the average of their rank range
    let mut ranks = vec![0.0; labels.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let midrank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = midrank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(&l, _)| l == 1)
        .map(|(_, &r)| r)
        .sum();

    let auc = (pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64;
    Some(auc)
}
