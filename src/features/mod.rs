pub mod rolling_form;
pub mod training_rows;

pub use rolling_form::{rolling_form, FormConfig, GameHistory};
pub use training_rows::{
    build_training_rows, feature_columns, matchup_features, player_ppg_index, FeatureConfig,
    MatchupFeatures, SeasonStatIndex,
};
