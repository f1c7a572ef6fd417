use log::info;

use crate::error::PipelineError;
use crate::model::ScoringModel;
use crate::stats::OUTCOME_STAT;
use crate::transform::{FeatureRow, FeatureTable};

/// Identifier and label columns; never model input.
pub const NON_FEATURE_COLUMNS: [&str; 8] = [
    "player",
    "team",
    "opponents",
    "round",
    "year",
    OUTCOME_STAT,
    "game_id",
    "year_round",
];

/// A feature row with its model output. `model` is the artifact location and
/// doubles as the version tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub row: FeatureRow,
    pub weight: f32,
    pub model: String,
}

/// Column indices fed to the model, in the model's order.
pub fn feature_columns<M>(table: &FeatureTable, model: &M) -> Result<Vec<usize>, PipelineError>
where
    M: ScoringModel + ?Sized,
{
    let indices: Vec<usize> = if model.feature_names().is_empty() {
        table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !NON_FEATURE_COLUMNS.contains(&name.as_str()))
            .map(|(idx, _)| idx)
            .collect()
    } else {
        let mut found = Vec::with_capacity(model.feature_names().len());
        let mut missing = Vec::new();
        for name in model.feature_names() {
            match table.column_index(name) {
                Some(idx) => found.push(idx),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(PipelineError::SchemaMismatch { missing });
        }
        found
    };

    if indices.len() != model.input_width() {
        return Err(PipelineError::FeatureWidth {
            expected: model.input_width(),
            found: indices.len(),
        });
    }
    Ok(indices)
}

pub fn feature_vector(row: &FeatureRow, columns: &[usize]) -> Vec<f32> {
    columns
        .iter()
        .map(|idx| row.values.get(*idx).copied().unwrap_or(0.0) as f32)
        .collect()
}

/// Evaluates the model once per row.
pub fn score_rows<M>(
    table: &FeatureTable,
    model: &M,
    model_id: &str,
) -> Result<Vec<ScoredRow>, PipelineError>
where
    M: ScoringModel + ?Sized,
{
    let columns = feature_columns(table, model)?;
    let mut out = Vec::with_capacity(table.len());
    for row in &table.rows {
        let weight = model.score(&feature_vector(row, &columns))?;
        out.push(ScoredRow {
            row: row.clone(),
            weight,
            model: model_id.to_string(),
        });
    }
    info!("scored {} player-games with {model_id}", out.len());
    Ok(out)
}
