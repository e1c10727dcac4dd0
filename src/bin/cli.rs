use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nba_win_model::classifier::ClassifierConfig;
use nba_win_model::features::{
    build_training_rows, player_ppg_index, FeatureConfig, FormConfig, GameHistory, SeasonStatIndex,
};
use nba_win_model::predict::predict_matchup;
use nba_win_model::training::{train, TrainConfig};
use nba_win_model::utils::data::{
    load_artifact, load_games_from_csv, load_player_ppg_from_csv, load_season_stats_from_csv,
    load_training_rows_from_csv, save_artifact, save_training_rows_to_csv,
};

#[derive(Parser)]
#[command(name = "cli", about = "NBA win-probability model: build data, train, predict")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the labeled training CSV from a game-log export
    BuildData {
        /// Game log CSV (game_date, season, home_team, away_team, home_points, away_points)
        #[arg(long)]
        games: PathBuf,
        /// Output path for the training CSV
        #[arg(long, default_value = "models/win_training.csv")]
        out: PathBuf,
        /// Optional team-season stats CSV; enables the season-stat features
        #[arg(long)]
        season_stats: Option<PathBuf>,
        /// Optional per-team player scoring CSV; enables the player-impact features
        #[arg(long)]
        player_stats: Option<PathBuf>,
        /// Rolling-form window size
        #[arg(long, default_value_t = 10)]
        window: usize,
    },
    /// Train the win-probability classifier from a training CSV
    Train {
        #[arg(long, default_value = "models/win_training.csv")]
        data: PathBuf,
        /// Output path for the model artifact
        #[arg(long, default_value = "models/win_predictor.json")]
        out: PathBuf,
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 500)]
        epochs: usize,
    },
    /// Predict the win probability for one matchup
    Predict {
        #[arg(long)]
        games: PathBuf,
        #[arg(long, default_value = "models/win_predictor.json")]
        model: PathBuf,
        #[arg(long)]
        home: String,
        #[arg(long)]
        away: String,
        /// Reference date; only games strictly before it count (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        season_stats: Option<PathBuf>,
        #[arg(long)]
        player_stats: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        window: usize,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::BuildData {
            games,
            out,
            season_stats,
            player_stats,
            window,
        } => build_data(&games, &out, season_stats.as_deref(), player_stats.as_deref(), window),
        Command::Train {
            data,
            out,
            test_fraction,
            seed,
            epochs,
        } => train_model(&data, &out, test_fraction, seed, epochs),
        Command::Predict {
            games,
            model,
            home,
            away,
            date,
            season_stats,
            player_stats,
            window,
        } => predict(
            &games,
            &model,
            &home,
            &away,
            date,
            season_stats.as_deref(),
            player_stats.as_deref(),
            window,
        ),
    }
}

fn build_data(
    games_path: &std::path::Path,
    out: &std::path::Path,
    season_stats: Option<&std::path::Path>,
    player_stats: Option<&std::path::Path>,
    window: usize,
) -> Result<()> {
    println!("Building win predictor training dataset\n");

    let games = load_games_from_csv(games_path)?;
    println!("Loaded {} games from {}", games.len(), games_path.display());

    let season_index = match season_stats {
        Some(path) => {
            let stats = load_season_stats_from_csv(path)?;
            println!("Loaded {} team-season stat rows", stats.len());
            Some(SeasonStatIndex::new(&stats))
        }
        None => None,
    };
    let ppg_index = match player_stats {
        Some(path) => {
            let averages = load_player_ppg_from_csv(path)?;
            println!("Loaded {} player impact rows", averages.len());
            Some(player_ppg_index(&averages))
        }
        None => None,
    };

    let feature_config = FeatureConfig {
        include_season_stats: season_index.is_some(),
        include_player_impact: ppg_index.is_some(),
        ..FeatureConfig::default()
    };
    let form_config = FormConfig {
        window,
        ..FormConfig::default()
    };

    let history = GameHistory::new(games);
    let (columns, rows) = build_training_rows(
        &history,
        season_index.as_ref(),
        ppg_index.as_ref(),
        &feature_config,
        &form_config,
    );

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    save_training_rows_to_csv(&columns, &rows, out)?;

    println!("\nTraining rows: {}", rows.len());
    println!("Feature columns: {}", columns.join(", "));
    println!("Saved to {}", out.display());
    Ok(())
}

fn train_model(
    data: &std::path::Path,
    out: &std::path::Path,
    test_fraction: f64,
    seed: u64,
    epochs: usize,
) -> Result<()> {
    println!("Training win predictor\n");

    let (columns, rows) = load_training_rows_from_csv(data)?;
    println!("Loaded training dataset: {} rows", rows.len());

    let config = TrainConfig {
        test_fraction,
        seed,
        classifier: ClassifierConfig {
            epochs,
            ..ClassifierConfig::default()
        },
    };
    let (artifact, report) = train(&columns, &rows, &config)?;

    println!("Train rows: {}  Test rows: {}", report.train_rows, report.test_rows);
    println!("Model accuracy: {:.3}", report.accuracy);
    match report.roc_auc {
        Some(auc) => println!("ROC-AUC score: {:.3}", auc),
        None => println!("ROC-AUC score: undefined (single-class test fold)"),
    }

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    save_artifact(&artifact, out)?;
    println!("\nModel saved to {}", out.display());
    Ok(())
}

fn predict(
    games_path: &std::path::Path,
    model: &std::path::Path,
    home: &str,
    away: &str,
    date: Option<NaiveDate>,
    season_stats: Option<&std::path::Path>,
    player_stats: Option<&std::path::Path>,
    window: usize,
) -> Result<()> {
    let artifact = load_artifact(model)?;
    let games = load_games_from_csv(games_path)?;
    let as_of = date.unwrap_or_else(|| Local::now().date_naive());

    let season_index = match season_stats {
        Some(path) => Some(SeasonStatIndex::new(&load_season_stats_from_csv(path)?)),
        None => None,
    };
    let ppg_index = match player_stats {
        Some(path) => Some(player_ppg_index(&load_player_ppg_from_csv(path)?)),
        None => None,
    };
    let form_config = FormConfig {
        window,
        ..FormConfig::default()
    };

    let history = GameHistory::new(games);
    let prediction = predict_matchup(
        home,
        away,
        as_of,
        &history,
        season_index.as_ref(),
        ppg_index.as_ref(),
        &form_config,
        &artifact,
    )?;

    println!(
        "{} (home) vs {} (away), as of {}\n",
        prediction.home_team, prediction.away_team, as_of
    );
    println!(
        "{} last-{} form: {:.1}% wins, {:.1} pts/game",
        prediction.home_team,
        window,
        prediction.home_form.win_pct * 100.0,
        prediction.home_form.avg_points
    );
    println!(
        "{} last-{} form: {:.1}% wins, {:.1} pts/game\n",
        prediction.away_team,
        window,
        prediction.away_form.win_pct * 100.0,
        prediction.away_form.avg_points
    );
    println!(
        "Home win probability: {:.1}%",
        prediction.home_win_prob * 100.0
    );
    println!(
        "Away win probability: {:.1}%",
        prediction.away_win_prob * 100.0
    );

    let winner = if prediction.home_win_prob >= prediction.away_win_prob {
        &prediction.home_team
    } else {
        &prediction.away_team
    };
    println!("\nPredicted winner: {}", winner);
    Ok(())
}
