//! CSV and JSON I/O at the boundary to the external data collaborators.
//!
//! The game log, season stats and player averages arrive as CSV exports of
//! the upstream store. Loaders validate rather than trust: a row that cannot
//! be a completed game (missing score, tie) is skipped with a warning and a
//! count, never silently dropped or zero-filled.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ArtifactError;
use crate::models::{GameRecord, PlayerScoringAvg, TeamSeasonStat, TrainingRow};
use crate::training::{ModelArtifact, ARTIFACT_VERSION};

/// Raw game-log row as exported; points are optional because in-progress
/// games appear in the export with empty scores
#[derive(Debug, Deserialize)]
struct GameLogRow {
    game_date: NaiveDate,
    season: Option<String>,
    home_team: String,
    away_team: String,
    home_points: Option<u32>,
    away_points: Option<u32>,
}

/// Load completed games from a game-log CSV with columns
/// `game_date, season, home_team, away_team, home_points, away_points`.
/// Rows without both scores, and tied rows, are skipped with a warning.
pub fn load_games_from_csv(path: &Path) -> Result<Vec<GameRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open game log CSV at {}", path.display()))?;

    let mut games = Vec::new();
    let mut skipped = 0usize;

    for record in reader.deserialize() {
        let row: GameLogRow = record.context("Failed to parse game log row")?;
        let (home_points, away_points) = match (row.home_points, row.away_points) {
            (Some(h), Some(a)) if h != a => (h, a),
            _ => {
                // Incomplete or tied row: not a completed game
                skipped += 1;
                continue;
            }
        };
        games.push(GameRecord {
            date: row.game_date,
            season: row.season,
            home_team: row.home_team,
            away_team: row.away_team,
            home_points,
            away_points,
        });
    }

    if skipped > 0 {
        tracing::warn!(skipped, "game log rows skipped: missing score or tie");
    }
    if games.is_empty() {
        bail!("no completed games found in {}", path.display());
    }

    Ok(games)
}

/// Load team-season aggregates from a CSV with columns
/// `team, season, win_pct, points`
pub fn load_season_stats_from_csv(path: &Path) -> Result<Vec<TeamSeasonStat>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open season stats CSV at {}", path.display()))?;

    let mut stats = Vec::new();
    for record in reader.deserialize() {
        let stat: TeamSeasonStat = record.context("Failed to parse season stat row")?;
        stats.push(stat);
    }
    Ok(stats)
}

/// Load per-team player scoring averages from a CSV with columns
/// `team, avg_points`
pub fn load_player_ppg_from_csv(path: &Path) -> Result<Vec<PlayerScoringAvg>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open player stats CSV at {}", path.display()))?;

    let mut averages = Vec::new();
    for record in reader.deserialize() {
        let avg: PlayerScoringAvg = record.context("Failed to parse player stat row")?;
        averages.push(avg);
    }
    Ok(averages)
}

/// Column name the label is stored under in the training CSV
pub const LABEL_COLUMN: &str = "home_win_label";

/// Save feature rows to CSV; header = feature columns plus the label column
pub fn save_training_rows_to_csv(
    columns: &[String],
    rows: &[TrainingRow],
    path: &Path,
) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create training CSV at {}", path.display()))?;

    writeln!(file, "{},{}", columns.join(","), LABEL_COLUMN)?;
    for row in rows {
        let values: Vec<String> = row.features.iter().map(|v| v.to_string()).collect();
        writeln!(file, "{},{}", values.join(","), row.label)?;
    }
    Ok(())
}

/// Load feature rows back from a training CSV. The label column is required
/// by name; anything else in the header, in order, is a feature column.
pub fn load_training_rows_from_csv(path: &Path) -> Result<(Vec<String>, Vec<TrainingRow>)> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open training CSV at {}", path.display()))?;

    let headers = reader.headers().context("Training CSV has no header")?.clone();
    let label_idx = headers
        .iter()
        .position(|h| h == LABEL_COLUMN)
        .with_context(|| {
            format!(
                "Training CSV at {} is missing the required '{}' column",
                path.display(),
                LABEL_COLUMN
            )
        })?;
    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != label_idx)
        .map(|(_, h)| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read training CSV row")?;
        let mut features = Vec::with_capacity(columns.len());
        let mut label = 0u8;
        for (i, field) in record.iter().enumerate() {
            if i == label_idx {
                label = field
                    .parse()
                    .with_context(|| format!("Invalid label value '{field}'"))?;
            } else {
                features.push(
                    field
                        .parse()
                        .with_context(|| format!("Invalid feature value '{field}'"))?,
                );
            }
        }
        rows.push(TrainingRow { features, label });
    }

    Ok((columns, rows))
}

/// Persist a trained artifact as pretty JSON: classifier state and the
/// feature-column order in one container
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(artifact).context("Failed to serialize model artifact")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write model artifact to {}", path.display()))?;
    Ok(())
}

/// Load a persisted artifact, surfacing a missing file or a version drift as
/// a configuration error rather than a fallback
pub fn load_artifact(path: &Path) -> Result<ModelArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound {
            path: path.display().to_string(),
        });
    }
    let json = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let artifact: ModelArtifact =
        serde_json::from_str(&json).map_err(|source| ArtifactError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    if artifact.artifact_version != ARTIFACT_VERSION {
        return Err(ArtifactError::VersionMismatch {
            path: path.display().to_string(),
            found: artifact.artifact_version,
            supported: ARTIFACT_VERSION,
        });
    }
    Ok(artifact)
}
