use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use log::{info, warn};

use crate::transform::FeatureTable;

/// `{year}_{round}` key recording that a round has been scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearRound {
    pub year: i32,
    pub round: u32,
}

impl YearRound {
    pub fn new(year: i32, round: u32) -> Self {
        Self { year, round }
    }
}

impl fmt::Display for YearRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.year, self.round)
    }
}

impl FromStr for YearRound {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, round) = s
            .trim()
            .split_once('_')
            .ok_or_else(|| format!("missing '_' in year_round {s:?}"))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| format!("bad year in {s:?}: {e}"))?;
        let round = round
            .parse::<u32>()
            .map_err(|e| format!("bad round in {s:?}: {e}"))?;
        Ok(Self { year, round })
    }
}

/// Source of the `year_round` keys already persisted.
pub trait PriorResults {
    /// Distinct `year_round` values stored for `year`. Implementations may
    /// return values for other years too; callers filter.
    fn year_rounds(&self, year: i32) -> Result<BTreeSet<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTarget {
    pub year: i32,
    pub max_round_inferenced: u32,
    pub target_round: u32,
}

/// Next round to score for `year`: one past the highest round already stored,
/// or round 1 when nothing has been stored. Unparsable keys are skipped.
pub fn resolve_target_round<I, S>(prior: I, year: i32) -> RoundTarget
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut max_round_inferenced = 0;
    let mut seen_any = false;
    for raw in prior {
        let raw = raw.as_ref();
        match raw.parse::<YearRound>() {
            Ok(yr) if yr.year == year => {
                seen_any = true;
                max_round_inferenced = max_round_inferenced.max(yr.round);
            }
            Ok(_) => {}
            Err(err) => warn!("skipping stored year_round: {err}"),
        }
    }
    if !seen_any {
        warn!("no scored rounds stored for {year}");
    }

    RoundTarget {
        year,
        max_round_inferenced,
        target_round: max_round_inferenced + 1,
    }
}

/// Rows of the target round, or `None` when that round has not been played
/// or scraped yet.
pub fn select_round(table: &FeatureTable, target: RoundTarget) -> Option<FeatureTable> {
    let selected = table.filter_round(target.target_round);
    if selected.is_empty() {
        return None;
    }
    info!(
        "round to inference on: {} ({} player-games)",
        YearRound::new(target.year, target.target_round),
        selected.len()
    );
    Some(selected)
}

#[cfg(test)]
mod tests {
    use super::{YearRound, resolve_target_round};

    #[test]
    fn year_round_parses_and_prints() {
        let yr: YearRound = "2024_12".parse().unwrap();
        assert_eq!(yr, YearRound::new(2024, 12));
        assert_eq!(yr.to_string(), "2024_12");
        assert!("2024".parse::<YearRound>().is_err());
        assert!("2024_x".parse::<YearRound>().is_err());
    }

    #[test]
    fn resolves_next_round() {
        assert_eq!(resolve_target_round(["2024_1", "2024_2"], 2024).target_round, 3);
        assert_eq!(resolve_target_round(Vec::<String>::new(), 2024).target_round, 1);
    }

    #[test]
    fn ignores_other_years_and_garbage() {
        let prior = ["2023_20", "2024_5", "junk", "2024_3"];
        let target = resolve_target_round(prior, 2024);
        assert_eq!(target.max_round_inferenced, 5);
        assert_eq!(target.target_round, 6);
        assert_eq!(resolve_target_round(["2023_20"], 2024).target_round, 1);
    }
}
