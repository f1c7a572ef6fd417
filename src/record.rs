use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::votes::VoteCandidate;

/// Persisted vote allocation for one player in one game.
///
/// `(hash_key, model)` is the storage key: the same player-game scored by the
/// same model always lands on the same item, a different model gets its own.
/// Serialized field names are the persisted attribute names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoteRecord {
    pub hash_key: String,
    pub model: String,
    pub year_round: String,
    pub year: i32,
    pub round: u32,
    pub player: String,
    pub team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    #[serde(rename = "GameID")]
    pub game_id: String,
    pub votes: u8,
}

/// SHA-256 over `{player}_{round}_{year}_{game_id}`, lowercase hex.
pub fn hash_key(player: &str, round: u32, year: i32, game_id: &str) -> String {
    let digest = Sha256::digest(format!("{player}_{round}_{year}_{game_id}").as_bytes());
    format!("{digest:x}")
}

impl VoteRecord {
    pub fn from_candidate(candidate: &VoteCandidate) -> Self {
        let scored = &candidate.scored;
        let row = &scored.row;
        Self {
            hash_key: hash_key(&row.player, row.round, row.year, &row.game_id),
            model: scored.model.clone(),
            year_round: row.year_round.clone(),
            year: row.year,
            round: row.round,
            player: row.player.clone(),
            team: row.team.clone(),
            opponent: row.opponent.clone(),
            game_id: row.game_id.clone(),
            votes: candidate.votes,
        }
    }

    /// String attributes keyed by the persisted attribute names. Missing
    /// values are left out rather than written empty.
    pub fn to_item(&self) -> serde_json::Result<BTreeMap<String, String>> {
        let Value::Object(fields) = serde_json::to_value(self)? else {
            return Ok(BTreeMap::new());
        };
        Ok(fields
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(text) => (name, text),
                other => (name, other.to_string()),
            })
            .collect())
    }
}

pub fn records_from_candidates(candidates: &[VoteCandidate]) -> Vec<VoteRecord> {
    candidates.iter().map(VoteRecord::from_candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::{VoteRecord, hash_key};

    #[test]
    fn hash_key_is_stable_and_sensitive() {
        let base = hash_key("Smith", 5, 2024, "X");
        assert_eq!(base, hash_key("Smith", 5, 2024, "X"));
        assert_eq!(base.len(), 64);
        assert!(base.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(base, hash_key("Smyth", 5, 2024, "X"));
        assert_ne!(base, hash_key("Smith", 6, 2024, "X"));
        assert_ne!(base, hash_key("Smith", 5, 2023, "X"));
        assert_ne!(base, hash_key("Smith", 5, 2024, "Y"));
    }

    #[test]
    fn item_uses_attribute_names() {
        let record = VoteRecord {
            hash_key: hash_key("Walsh, Sam", 1, 2024, "carlton_essendon_1"),
            model: "linear".to_string(),
            year_round: "2024_1".to_string(),
            year: 2024,
            round: 1,
            player: "Walsh, Sam".to_string(),
            team: "carlton".to_string(),
            opponent: Some("essendon".to_string()),
            game_id: "carlton_essendon_1".to_string(),
            votes: 2,
        };
        let item = record.to_item().unwrap();
        let names: Vec<&str> = item.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "GameID", "HashKey", "Model", "Opponent", "Player", "Round", "Team", "Votes",
                "Year", "YearRound"
            ]
        );
        assert_eq!(item["Year"], "2024");
        assert_eq!(item["Opponent"], "essendon");
    }
}
