pub mod classifier;
pub mod error;
pub mod features;
pub mod models;
pub mod predict;
pub mod teams;
pub mod training;
pub mod utils;

pub use error::{ArtifactError, PredictError};
pub use features::*;
pub use models::*;
pub use predict::predict_matchup;
pub use training::{train, ModelArtifact, TrainConfig, TrainReport, ARTIFACT_VERSION};

use anyhow::Result;
use chrono::NaiveDate;

/// Build the training rows and fit the classifier in one pass over an
/// in-memory game log. Season stats and player averages are optional; when
/// given, the matching feature families are enabled via `feature_config`.
pub fn train_from_games(
    games: Vec<GameRecord>,
    season_stats: Option<&[TeamSeasonStat]>,
    player_ppg: Option<&[PlayerScoringAvg]>,
    feature_config: &FeatureConfig,
    form_config: &FormConfig,
    train_config: &TrainConfig,
) -> Result<(ModelArtifact, TrainReport)> {
    let history = GameHistory::new(games);
    let season_index = season_stats.map(SeasonStatIndex::new);
    let ppg_index = player_ppg.map(player_ppg_index);

    let (columns, rows) = build_training_rows(
        &history,
        season_index.as_ref(),
        ppg_index.as_ref(),
        feature_config,
        form_config,
    );

    tracing::info!(rows = rows.len(), columns = columns.len(), "training set built");
    training::train(&columns, &rows, train_config)
}

/// One-shot prediction over a raw game log: index the history, recompute
/// both teams' rolling form as of `as_of`, and score the matchup with an
/// already-loaded artifact.
pub fn predict_from_games(
    games: Vec<GameRecord>,
    home_team: &str,
    away_team: &str,
    as_of: NaiveDate,
    season_stats: Option<&[TeamSeasonStat]>,
    player_ppg: Option<&[PlayerScoringAvg]>,
    form_config: &FormConfig,
    artifact: &ModelArtifact,
) -> std::result::Result<MatchupPrediction, PredictError> {
    let history = GameHistory::new(games);
    let season_index = season_stats.map(SeasonStatIndex::new);
    let ppg_index = player_ppg.map(player_ppg_index);

    predict_matchup(
        home_team,
        away_team,
        as_of,
        &history,
        season_index.as_ref(),
        ppg_index.as_ref(),
        form_config,
        artifact,
    )
}
