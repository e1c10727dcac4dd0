use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One completed game from the historical game log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub season: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_points: u32,
    pub away_points: u32,
}

impl GameRecord {
    /// Winning team name. Completed games never tie, so strictly-greater is enough.
    pub fn winner(&self) -> &str {
        if self.home_points > self.away_points {
            &self.home_team
        } else {
            &self.away_team
        }
    }

    pub fn loser(&self) -> &str {
        if self.home_points > self.away_points {
            &self.away_team
        } else {
            &self.home_team
        }
    }

    /// Points scored by the given team in this game, whichever side it played
    pub fn points_for(&self, team: &str) -> Option<u32> {
        if self.home_team == team {
            Some(self.home_points)
        } else if self.away_team == team {
            Some(self.away_points)
        } else {
            None
        }
    }

    /// True iff the home team won
    pub fn home_win(&self) -> bool {
        self.home_points > self.away_points
    }
}

/// Season-level aggregate for one team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSeasonStat {
    pub team: String,
    pub season: String,
    pub win_pct: f64, // 0.0 - 1.0
    pub points: f64,  // season scoring average
}

/// Average points scored per player game for one team, from live player stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerScoringAvg {
    pub team: String,
    pub avg_points: f64,
}

/// A team's recent form over its last N games before some reference date.
/// Derived value: always recomputed from the game log, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingForm {
    pub win_pct: f64,    // 0.0 - 1.0
    pub avg_points: f64, // >= 0
}

/// One labeled training example. Column names are carried separately and in
/// training-time order by whoever holds the row set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRow {
    pub features: Vec<f64>,
    pub label: u8, // 1 = home win
}

/// Win-probability output for one matchup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupPrediction {
    pub home_team: String,
    pub away_team: String,
    pub home_win_prob: f64,
    pub away_win_prob: f64,
    pub home_form: RollingForm,
    pub away_form: RollingForm,
}
