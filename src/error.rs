use thiserror::Error;

/// Failures in the data contract between the scraped stats, the feature table
/// and the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(
        "duplicate observation for player {player} ({team}) round {round} vs {opponent}: stat {stat}"
    )]
    SchemaConflict {
        player: String,
        team: String,
        round: u32,
        opponent: String,
        stat: String,
    },

    #[error("feature columns missing from table: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("model expects {expected} features, table provides {found}")]
    FeatureWidth { expected: usize, found: usize },

    #[error("stat {stat} has non-numeric value {value:?}")]
    InvalidStatValue { stat: String, value: String },

    #[error("invalid model artifact: {0}")]
    InvalidModel(String),
}
