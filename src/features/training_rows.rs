use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{PlayerScoringAvg, RollingForm, TeamSeasonStat, TrainingRow};
use crate::teams::normalize;

use super::rolling_form::{rolling_form, FormConfig, GameHistory};

/// Which feature families go into the matrix. The momentum features are
/// always present; season stats and player impact mirror the optional extras
/// of the richer model generation.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub include_season_stats: bool,
    pub include_player_impact: bool,
    /// Stand-in PPG for a team with no live player stats yet
    pub fallback_player_ppg: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            include_season_stats: false,
            include_player_impact: false,
            fallback_player_ppg: 15.0,
        }
    }
}

impl FeatureConfig {
    /// Recover the config a column list was built with. Used at inference
    /// time so the feature set always follows the artifact, not a guess.
    pub fn from_columns(columns: &[String]) -> Self {
        Self {
            include_season_stats: columns.iter().any(|c| c == "home_season_win_pct"),
            include_player_impact: columns.iter().any(|c| c == "home_player_ppg"),
            ..Self::default()
        }
    }
}

/// Canonical feature column names, in the exact order presented to the
/// classifier. Training and inference both read this one definition; nothing
/// else is allowed to decide column order.
pub fn feature_columns(config: &FeatureConfig) -> Vec<String> {
    let mut columns = vec![
        "home_last10_win_pct".to_string(),
        "away_last10_win_pct".to_string(),
        "home_last10_pts".to_string(),
        "away_last10_pts".to_string(),
    ];
    if config.include_season_stats {
        columns.push("home_season_win_pct".to_string());
        columns.push("away_season_win_pct".to_string());
        columns.push("home_season_pts".to_string());
        columns.push("away_season_pts".to_string());
    }
    if config.include_player_impact {
        columns.push("home_player_ppg".to_string());
        columns.push("away_player_ppg".to_string());
    }
    columns
}

/// Season stats keyed by normalized team name. A team spanning several
/// seasons in the input gets the mean of its per-season values.
pub struct SeasonStatIndex {
    by_team: HashMap<String, (f64, f64)>, // (win_pct, points)
}

impl SeasonStatIndex {
    pub fn new(stats: &[TeamSeasonStat]) -> Self {
        let mut sums: HashMap<String, (f64, f64, usize)> = HashMap::new();
        for stat in stats {
            let entry = sums
                .entry(normalize(&stat.team).to_string())
                .or_insert((0.0, 0.0, 0));
            entry.0 += stat.win_pct;
            entry.1 += stat.points;
            entry.2 += 1;
        }
        let by_team = sums
            .into_iter()
            .map(|(team, (wp, pts, n))| (team, (wp / n as f64, pts / n as f64)))
            .collect();
        Self { by_team }
    }

    pub fn get(&self, team: &str) -> Option<(f64, f64)> {
        self.by_team.get(normalize(team)).copied()
    }
}

/// Build the per-team player scoring lookup used by the player-impact feature
pub fn player_ppg_index(averages: &[PlayerScoringAvg]) -> HashMap<String, f64> {
    averages
        .iter()
        .map(|a| (normalize(&a.team).to_string(), a.avg_points))
        .collect()
}

/// Named feature values for one matchup, plus the forms they came from
#[derive(Debug, Clone)]
pub struct MatchupFeatures {
    pub home_form: RollingForm,
    pub away_form: RollingForm,
    /// (column name, value) pairs in canonical order
    pub named: Vec<(String, f64)>,
}

/// Assemble the full named feature vector for one matchup as of `as_of`.
/// Rolling form only sees games strictly before that date. Returns `None`
/// when season stats are enabled but either team has no season-stat match;
/// such matchups are skipped rather than zero-filled so a fabricated default
/// never leaks into the label-bearing signal.
pub fn matchup_features(
    home_team: &str,
    away_team: &str,
    as_of: NaiveDate,
    history: &GameHistory,
    season_stats: Option<&SeasonStatIndex>,
    player_ppg: Option<&HashMap<String, f64>>,
    feature_config: &FeatureConfig,
    form_config: &FormConfig,
) -> Option<MatchupFeatures> {
    let home_team = normalize(home_team);
    let away_team = normalize(away_team);

    let home_form = rolling_form(home_team, as_of, history, form_config);
    let away_form = rolling_form(away_team, as_of, history, form_config);

    let mut named = vec![
        ("home_last10_win_pct".to_string(), home_form.win_pct),
        ("away_last10_win_pct".to_string(), away_form.win_pct),
        ("home_last10_pts".to_string(), home_form.avg_points),
        ("away_last10_pts".to_string(), away_form.avg_points),
    ];

    if feature_config.include_season_stats {
        let index = season_stats?;
        let (home_wp, home_pts) = index.get(home_team)?;
        let (away_wp, away_pts) = index.get(away_team)?;
        named.push(("home_season_win_pct".to_string(), home_wp));
        named.push(("away_season_win_pct".to_string(), away_wp));
        named.push(("home_season_pts".to_string(), home_pts));
        named.push(("away_season_pts".to_string(), away_pts));
    }

    if feature_config.include_player_impact {
        let fallback = feature_config.fallback_player_ppg;
        let lookup = |team: &str| {
            player_ppg
                .and_then(|m| m.get(normalize(team)).copied())
                .unwrap_or(fallback)
        };
        named.push(("home_player_ppg".to_string(), lookup(home_team)));
        named.push(("away_player_ppg".to_string(), lookup(away_team)));
    }

    Some(MatchupFeatures {
        home_form,
        away_form,
        named,
    })
}

/// Build one labeled row per game, each game's features computed only from
/// games strictly before it, so the dataset carries no lookahead. Early
/// games fall back to neutral form values; they are low-information but
/// valid. Returns the column names alongside the rows.
pub fn build_training_rows(
    history: &GameHistory,
    season_stats: Option<&SeasonStatIndex>,
    player_ppg: Option<&HashMap<String, f64>>,
    feature_config: &FeatureConfig,
    form_config: &FormConfig,
) -> (Vec<String>, Vec<TrainingRow>) {
    let columns = feature_columns(feature_config);
    let mut rows = Vec::with_capacity(history.len());
    let mut skipped = 0usize;

    for game in history.games() {
        let Some(features) = matchup_features(
            &game.home_team,
            &game.away_team,
            game.date,
            history,
            season_stats,
            player_ppg,
            feature_config,
            form_config,
        ) else {
            skipped += 1;
            continue;
        };

        rows.push(TrainingRow {
            features: features.named.into_iter().map(|(_, v)| v).collect(),
            label: game.home_win() as u8,
        });
    }

    if skipped > 0 {
        tracing::warn!(
            skipped,
            "games dropped from training set: no season-stat match"
        );
    }

    (columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameRecord;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn game(d: u32, home: &str, away: &str, hs: u32, aws: u32) -> GameRecord {
        GameRecord {
            date: day(d),
            season: Some("2023-24".to_string()),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_points: hs,
            away_points: aws,
        }
    }

    fn history() -> GameHistory {
        GameHistory::new(vec![
            game(1, "Team A", "Team B", 110, 100),
            game(3, "Team A", "Team C", 120, 90),
            game(5, "Team B", "Team C", 105, 95),
        ])
    }

    #[test]
    fn test_momentum_column_order_is_stable() {
        let columns = feature_columns(&FeatureConfig::default());
        assert_eq!(
            columns,
            vec![
                "home_last10_win_pct",
                "away_last10_win_pct",
                "home_last10_pts",
                "away_last10_pts",
            ]
        );
    }

    #[test]
    fn test_full_column_set_and_config_round_trip() {
        let config = FeatureConfig {
            include_season_stats: true,
            include_player_impact: true,
            ..FeatureConfig::default()
        };
        let columns = feature_columns(&config);
        assert_eq!(columns.len(), 10);

        let recovered = FeatureConfig::from_columns(&columns);
        assert!(recovered.include_season_stats);
        assert!(recovered.include_player_impact);

        let momentum_only = FeatureConfig::from_columns(&feature_columns(&FeatureConfig::default()));
        assert!(!momentum_only.include_season_stats);
        assert!(!momentum_only.include_player_impact);
    }

    #[test]
    fn test_rows_have_no_lookahead() {
        let history = history();
        let (columns, rows) =
            build_training_rows(&history, None, None, &FeatureConfig::default(), &FormConfig::default());
        assert_eq!(rows.len(), 3);
        assert_eq!(columns.len(), rows[0].features.len());

        // First game: neither team has history yet, so both sides are neutral
        let first = &rows[0];
        assert_relative_eq!(first.features[0], 0.50);
        assert_relative_eq!(first.features[1], 0.50);
        assert_relative_eq!(first.features[2], 100.0);
        assert_relative_eq!(first.features[3], 100.0);
        assert_eq!(first.label, 1);

        // Third game (day 5): Team B is 0-1 scoring 100, Team C is 0-1 scoring 90
        let third = &rows[2];
        assert_relative_eq!(third.features[0], 0.0);
        assert_relative_eq!(third.features[1], 0.0);
        assert_relative_eq!(third.features[2], 100.0);
        assert_relative_eq!(third.features[3], 90.0);
        assert_eq!(third.label, 1);
    }

    #[test]
    fn test_games_without_season_stats_are_skipped() {
        let history = history();
        let stats = SeasonStatIndex::new(&[
            TeamSeasonStat {
                team: "Team A".to_string(),
                season: "2023-24".to_string(),
                win_pct: 0.7,
                points: 112.0,
            },
            TeamSeasonStat {
                team: "Team B".to_string(),
                season: "2023-24".to_string(),
                win_pct: 0.5,
                points: 104.0,
            },
        ]);
        let config = FeatureConfig {
            include_season_stats: true,
            ..FeatureConfig::default()
        };
        let (columns, rows) =
            build_training_rows(&history, Some(&stats), None, &config, &FormConfig::default());

        // Team C has no season stats, so only the A-vs-B game survives
        assert_eq!(rows.len(), 1);
        assert_eq!(columns.len(), 8);
        assert_relative_eq!(rows[0].features[4], 0.7);
        assert_relative_eq!(rows[0].features[5], 0.5);
    }

    #[test]
    fn test_missing_player_ppg_uses_fallback_not_skip() {
        let history = history();
        let ppg = player_ppg_index(&[PlayerScoringAvg {
            team: "Team A".to_string(),
            avg_points: 22.5,
        }]);
        let config = FeatureConfig {
            include_player_impact: true,
            ..FeatureConfig::default()
        };
        let (_, rows) =
            build_training_rows(&history, None, Some(&ppg), &config, &FormConfig::default());

        assert_eq!(rows.len(), 3);
        // Game 1: Team A home (known PPG), Team B away (fallback)
        assert_relative_eq!(rows[0].features[4], 22.5);
        assert_relative_eq!(rows[0].features[5], 15.0);
    }

    #[test]
    fn test_season_stats_average_across_seasons() {
        let index = SeasonStatIndex::new(&[
            TeamSeasonStat {
                team: "Team A".to_string(),
                season: "2022-23".to_string(),
                win_pct: 0.6,
                points: 110.0,
            },
            TeamSeasonStat {
                team: "Team A".to_string(),
                season: "2023-24".to_string(),
                win_pct: 0.8,
                points: 114.0,
            },
        ]);
        let (win_pct, points) = index.get("Team A").unwrap();
        assert_relative_eq!(win_pct, 0.7);
        assert_relative_eq!(points, 112.0);
        assert!(index.get("Team Z").is_none());
    }

    #[test]
    fn test_season_stats_join_through_aliases() {
        let index = SeasonStatIndex::new(&[TeamSeasonStat {
            team: "Seattle SuperSonics".to_string(),
            season: "2007-08".to_string(),
            win_pct: 0.24,
            points: 98.0,
        }]);
        assert!(index.get("Oklahoma City Thunder").is_some());
    }
}
