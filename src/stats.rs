pub const COL_PLAYER: &str = "player";
pub const COL_TEAM: &str = "team";
pub const COL_ROUND: &str = "round";
pub const COL_OPPONENT: &str = "opponents";
pub const COL_STAT: &str = "stat";
pub const COL_VALUE: &str = "value";

/// Interchange markers: the player came off / went on. Not numeric.
pub const SUBSTITUTION_MARKERS: [&str; 2] = ["Off", "On"];
/// Empty or dash cell in the source tables.
pub const MISSING_MARKER: &str = "NA";

/// Substitute indicator table; carries no signal for the vote model.
pub const SUBS_STAT: &str = "subs";
/// Actual votes, present only in labelled training years.
pub const OUTCOME_STAT: &str = "brownlow_votes";

/// Statistic tables published on the game-by-game pages.
pub const AFL_STAT_NAMES: [&str; 22] = [
    "%_played",
    "behinds",
    "bounces",
    "clangers",
    "clearances",
    "contested_marks",
    "contested_possessions",
    "disposals",
    "frees",
    "frees_against",
    "goal_assists",
    "goals",
    "handballs",
    "hit_outs",
    "inside_50s",
    "kicks",
    "marks",
    "marks_inside_50",
    "one_percenters",
    "rebounds",
    "tackles",
    "uncontested_possessions",
];

/// One scraped (player, team, round, opponent, stat) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStatRow {
    pub player: String,
    pub team: String,
    pub round: u32,
    pub opponent: Option<String>,
    pub stat: String,
    pub value: String,
}

impl RawStatRow {
    pub fn is_substitution_marker(&self) -> bool {
        SUBSTITUTION_MARKERS.contains(&self.value.trim())
    }

    /// Numeric value with the missing marker read as zero.
    pub fn numeric_value(&self) -> Option<f64> {
        let v = self.value.trim();
        if v == MISSING_MARKER {
            return Some(0.0);
        }
        v.parse::<f64>().ok()
    }
}

pub fn is_known_stat(name: &str) -> bool {
    AFL_STAT_NAMES.contains(&name) || name == SUBS_STAT || name == OUTCOME_STAT
}

#[cfg(test)]
mod tests {
    use super::RawStatRow;

    fn row(value: &str) -> RawStatRow {
        RawStatRow {
            player: "Smith, John".to_string(),
            team: "carlton".to_string(),
            round: 1,
            opponent: Some("ES".to_string()),
            stat: "kicks".to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn numeric_value_reads_markers() {
        assert_eq!(row("12").numeric_value(), Some(12.0));
        assert_eq!(row(" 3.5 ").numeric_value(), Some(3.5));
        assert_eq!(row("NA").numeric_value(), Some(0.0));
        assert_eq!(row("abc").numeric_value(), None);
        assert!(row("Off").is_substitution_marker());
        assert!(row("On").is_substitution_marker());
        assert!(!row("NA").is_substitution_marker());
    }
}
