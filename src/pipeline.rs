use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::feature_source::{load_raw_stats, year_data_location};
use crate::inference::score_rows;
use crate::model::{ScoringModel, load_vote_model};
use crate::record::{VoteRecord, records_from_candidates};
use crate::rounds::{YearRound, resolve_target_round, select_round};
use crate::stats::RawStatRow;
use crate::store::{SqliteVoteStore, VoteStore};
use crate::transform::{FeatureTable, transform_gamebygame};
use crate::votes::allocate_votes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The next round has no data yet. Nothing was written.
    NoNewRound { year: i32, target_round: u32 },
    Scored {
        year: i32,
        round: u32,
        games: usize,
        records: usize,
    },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoNewRound { year, target_round } => write!(
                f,
                "no data for round {} yet, nothing to score",
                YearRound::new(*year, *target_round)
            ),
            RunOutcome::Scored {
                year,
                round,
                games,
                records,
            } => write!(
                f,
                "scored round {}: {games} games, {records} vote records written",
                YearRound::new(*year, *round)
            ),
        }
    }
}

/// Scores one round's rows and turns the 3-2-1 allocation into records.
pub fn vote_records_for_round<M>(
    round: &FeatureTable,
    model: &M,
    model_id: &str,
) -> Result<Vec<VoteRecord>, PipelineError>
where
    M: ScoringModel + ?Sized,
{
    let scored = score_rows(round, model, model_id)?;
    let candidates = allocate_votes(&scored);
    Ok(records_from_candidates(&candidates))
}

/// One incremental run for `year`: scores at most the single next unscored
/// round. `load_model` is only called when that round has data.
pub fn run_year<S, M, F>(
    raw: Vec<RawStatRow>,
    year: i32,
    store: &mut S,
    model_id: &str,
    load_model: F,
) -> Result<RunOutcome>
where
    S: VoteStore + ?Sized,
    M: ScoringModel,
    F: FnOnce() -> Result<M>,
{
    let table = transform_gamebygame(raw, year)
        .with_context(|| format!("transform game-by-game stats for {year}"))?;
    let prior = store.year_rounds(year)?;
    let target = resolve_target_round(&prior, year);

    let Some(round) = select_round(&table, target) else {
        warn!(
            "round {} not available yet (have rounds {:?}), skipping",
            YearRound::new(year, target.target_round),
            table.rounds()
        );
        return Ok(RunOutcome::NoNewRound {
            year,
            target_round: target.target_round,
        });
    };

    let model = load_model()?;
    let records = vote_records_for_round(&round, &model, model_id)
        .with_context(|| format!("score round {}", target.target_round))?;

    for record in &records {
        store.put_record(record)?;
    }

    let games = records
        .iter()
        .map(|r| r.game_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    info!("wrote {} vote records for {games} games", records.len());

    Ok(RunOutcome::Scored {
        year,
        round: target.target_round,
        games,
        records: records.len(),
    })
}

/// Reads the configured year file, opens the store and runs once.
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    let location = year_data_location(&config.data_path, config.year);
    let raw = load_raw_stats(&location)?;
    let mut store = SqliteVoteStore::open(&config.db_path)?;
    run_year(raw, config.year, &mut store, &config.model_path, || {
        load_vote_model(&config.model_path)
    })
}
