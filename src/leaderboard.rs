use std::collections::HashMap;

use anyhow::Result;

use crate::record::VoteRecord;
use crate::store::VoteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub player: String,
    pub votes: u32,
}

/// Total votes per player, most votes first, ties by name. `model` narrows
/// the tally to one model's records.
pub fn leaderboard(records: &[VoteRecord], model: Option<&str>) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for record in records {
        if model.is_some_and(|m| m != record.model) {
            continue;
        }
        *totals.entry(record.player.as_str()).or_insert(0) += u32::from(record.votes);
    }

    let mut out: Vec<LeaderboardEntry> = totals
        .into_iter()
        .map(|(player, votes)| LeaderboardEntry {
            player: player.to_string(),
            votes,
        })
        .collect();
    out.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.player.cmp(&b.player)));
    out
}

pub fn leaderboard_from_store<S>(store: &S, model: Option<&str>) -> Result<Vec<LeaderboardEntry>>
where
    S: VoteStore + ?Sized,
{
    let records = store.scan()?;
    Ok(leaderboard(&records, model))
}
