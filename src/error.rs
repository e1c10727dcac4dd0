use thiserror::Error;

/// Failures a prediction request can hit before or during feature assembly.
/// Missing game history is deliberately not here: it degrades to the neutral
/// rolling-form fallback instead of failing.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("home and away are both '{0}'; a matchup needs two different teams")]
    SameTeam(String),

    #[error(
        "the model was trained with season-stat features but '{0}' has no \
         season stats loaded; provide a season-stats file covering it or \
         retrain without season stats"
    )]
    MissingSeasonStats(String),

    #[error(
        "feature columns do not match the trained model: expected [{expected}], \
         built [{actual}]; retrain the model or match its feature flags"
    )]
    SchemaMismatch { expected: String, actual: String },
}

/// Failures loading or validating a persisted model artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {path}; run `cli train` first")]
    NotFound { path: String },

    #[error("artifact at {path} has version {found}, but this build reads version {supported}")]
    VersionMismatch {
        path: String,
        found: u32,
        supported: u32,
    },

    #[error("failed to read model artifact at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact at {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
