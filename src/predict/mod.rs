use chrono::NaiveDate;
use std::collections::HashMap;

use crate::error::PredictError;
use crate::features::rolling_form::{FormConfig, GameHistory};
use crate::features::training_rows::{matchup_features, FeatureConfig, SeasonStatIndex};
use crate::models::MatchupPrediction;
use crate::teams::normalize;
use crate::training::ModelArtifact;

/// Predict the home/away win probabilities for one matchup as of `as_of`,
/// recomputing rolling form from the live game history and scoring it with
/// the persisted model.
///
/// The feature vector is rebuilt through the same code path as training and
/// then reordered to the artifact's recorded column order; column names are
/// checked for equality rather than trusted positionally, so a model trained
/// on a different feature set is rejected instead of silently misread.
/// Deterministic given the same inputs and artifact, and safe to call
/// concurrently against a shared read-only artifact.
pub fn predict_matchup(
    home_team: &str,
    away_team: &str,
    as_of: NaiveDate,
    history: &GameHistory,
    season_stats: Option<&SeasonStatIndex>,
    player_ppg: Option<&HashMap<String, f64>>,
    form_config: &FormConfig,
    artifact: &ModelArtifact,
) -> Result<MatchupPrediction, PredictError> {
    let home_team = normalize(home_team);
    let away_team = normalize(away_team);

    // Usage errors fail before any feature work
    if home_team == away_team {
        return Err(PredictError::SameTeam(home_team.to_string()));
    }

    // The artifact decides which feature families to build
    let feature_config = FeatureConfig::from_columns(&artifact.feature_columns);

    if feature_config.include_season_stats {
        let index =
            season_stats.ok_or_else(|| PredictError::MissingSeasonStats(home_team.to_string()))?;
        for team in [home_team, away_team] {
            if index.get(team).is_none() {
                return Err(PredictError::MissingSeasonStats(team.to_string()));
            }
        }
    }

    let features = matchup_features(
        home_team,
        away_team,
        as_of,
        history,
        season_stats,
        player_ppg,
        &feature_config,
        form_config,
    )
    // Season-stat joins were checked above; the builder cannot come up empty
    .ok_or_else(|| PredictError::MissingSeasonStats(home_team.to_string()))?;

    let ordered = align_to_columns(&features.named, &artifact.feature_columns)?;

    // Class 1 = home win, the label convention fixed at training time
    let home_win_prob = artifact.classifier.predict_proba(&ordered);
    let away_win_prob = 1.0 - home_win_prob;

    Ok(MatchupPrediction {
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        home_win_prob,
        away_win_prob,
        home_form: features.home_form,
        away_form: features.away_form,
    })
}

/// Reorder named feature values into the artifact's column order, requiring
/// an exact name-set match in both directions.
fn align_to_columns(
    named: &[(String, f64)],
    expected: &[String],
) -> Result<Vec<f64>, PredictError> {
    let by_name: HashMap<&str, f64> = named.iter().map(|(n, v)| (n.as_str(), *v)).collect();

    let mismatch = || PredictError::SchemaMismatch {
        expected: expected.join(", "),
        actual: named
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    };

    if named.len() != expected.len() {
        return Err(mismatch());
    }
    let mut ordered = Vec::with_capacity(expected.len());
    for column in expected {
        match by_name.get(column.as_str()) {
            Some(&value) => ordered.push(value),
            None => return Err(mismatch()),
        }
    }
    Ok(ordered)
}
