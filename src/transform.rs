use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};

use crate::error::PipelineError;
use crate::rounds::YearRound;
use crate::stats::{RawStatRow, SUBS_STAT, is_known_stat};
use crate::teams::opponent_slug;

/// One player's line for one game, one value per table column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub player: String,
    pub team: String,
    pub round: u32,
    pub opponent: Option<String>,
    pub year: i32,
    pub game_id: String,
    pub year_round: String,
    pub values: Vec<f64>,
}

/// Wide per-player-per-game table for a single year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    pub year: i32,
    pub columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: &FeatureRow, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        row.values.get(idx).copied()
    }

    pub fn rounds(&self) -> BTreeSet<u32> {
        self.rows.iter().map(|r| r.round).collect()
    }

    /// Same columns, only the rows of `round`.
    pub fn filter_round(&self, round: u32) -> FeatureTable {
        FeatureTable {
            year: self.year,
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.round == round)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PivotKey {
    player: String,
    team: String,
    round: u32,
    opponent: Option<String>,
}

/// Both sides of a match share an id: the two team slugs sorted, then the round.
pub fn game_id(team: &str, opponent: Option<&str>, round: u32) -> String {
    match opponent {
        Some(opponent) => {
            let mut pair = [team, opponent];
            pair.sort_unstable();
            format!("{}_{}_{}", pair[0], pair[1], round)
        }
        None => format!("{team}_{round}"),
    }
}

/// Pivots long-format scraped rows into one row per (player, team, round, opponent).
///
/// Substitution markers are discarded, `NA` reads as zero, and any other
/// non-numeric value fails the whole year. A second observation of the same
/// stat for the same key is a [`PipelineError::SchemaConflict`].
pub fn transform_gamebygame<I>(rows: I, year: i32) -> Result<FeatureTable, PipelineError>
where
    I: IntoIterator<Item = RawStatRow>,
{
    let mut pivot: BTreeMap<PivotKey, BTreeMap<String, f64>> = BTreeMap::new();
    let mut columns: BTreeSet<String> = BTreeSet::new();
    let mut skipped_markers = 0usize;

    for row in rows {
        if row.is_substitution_marker() {
            skipped_markers += 1;
            continue;
        }
        let Some(value) = row.numeric_value() else {
            return Err(PipelineError::InvalidStatValue {
                stat: row.stat,
                value: row.value,
            });
        };

        // Code and slug spellings of one opponent must land on the same key.
        let key = PivotKey {
            player: row.player,
            team: row.team,
            round: row.round,
            opponent: row.opponent.map(canonical_opponent),
        };
        let cells = match pivot.entry(key) {
            Entry::Occupied(entry) => {
                if entry.get().contains_key(&row.stat) {
                    return Err(conflict(entry.key(), row.stat));
                }
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(BTreeMap::new()),
        };
        cells.insert(row.stat.clone(), value);
        columns.insert(row.stat);
    }

    columns.remove(SUBS_STAT);
    let columns: Vec<String> = columns.into_iter().collect();
    for unknown in columns.iter().filter(|c| !is_known_stat(c)) {
        debug!("unrecognised stat column {unknown} kept as feature");
    }

    let mut unknown_opponents = BTreeSet::new();
    let mut out = Vec::with_capacity(pivot.len());
    for (key, cells) in pivot {
        let opponent = match key.opponent.as_deref() {
            Some(raw) => {
                let slug = opponent_slug(raw);
                if slug.is_none() {
                    unknown_opponents.insert(raw.to_string());
                }
                slug.map(str::to_string)
            }
            None => None,
        };
        let values = columns
            .iter()
            .map(|c| cells.get(c).copied().unwrap_or(0.0))
            .collect();
        out.push(FeatureRow {
            game_id: game_id(&key.team, opponent.as_deref(), key.round),
            year_round: YearRound::new(year, key.round).to_string(),
            player: key.player,
            team: key.team,
            round: key.round,
            opponent,
            year,
            values,
        });
    }

    if !unknown_opponents.is_empty() {
        warn!("unrecognised opponent codes left unmapped: {unknown_opponents:?}");
    }
    info!(
        "transformed {} player-games across {} stat columns for {year} ({skipped_markers} substitution markers dropped)",
        out.len(),
        columns.len()
    );

    Ok(FeatureTable {
        year,
        columns,
        rows: out,
    })
}

/// Team slug for a known code or slug, otherwise the raw cell unchanged.
fn canonical_opponent(raw: String) -> String {
    match opponent_slug(&raw) {
        Some(slug) => slug.to_string(),
        None => raw,
    }
}

fn conflict(key: &PivotKey, stat: String) -> PipelineError {
    PipelineError::SchemaConflict {
        player: key.player.clone(),
        team: key.team.clone(),
        round: key.round,
        opponent: key.opponent.clone().unwrap_or_default(),
        stat,
    }
}

#[cfg(test)]
mod tests {
    use super::game_id;

    #[test]
    fn game_id_is_order_independent() {
        assert_eq!(game_id("essendon", Some("carlton"), 4), "carlton_essendon_4");
        assert_eq!(game_id("carlton", Some("essendon"), 4), "carlton_essendon_4");
        assert_eq!(game_id("swans", None, 2), "swans_2");
    }
}
