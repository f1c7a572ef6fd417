use std::collections::BTreeMap;

use crate::inference::ScoredRow;

/// Votes for the best, second and third player in a game.
pub const VOTE_SCHEDULE: [u8; 3] = [3, 2, 1];

#[derive(Debug, Clone, PartialEq)]
pub struct VoteCandidate {
    pub scored: ScoredRow,
    pub votes: u8,
}

/// Top three weights per `game_id` get 3, 2 and 1 votes.
///
/// Equal weights keep their input order. Games with fewer than three players
/// get a truncated schedule. Output is ordered by `game_id`, then votes
/// descending.
pub fn allocate_votes(rows: &[ScoredRow]) -> Vec<VoteCandidate> {
    let mut games: BTreeMap<&str, Vec<&ScoredRow>> = BTreeMap::new();
    for row in rows {
        games.entry(row.row.game_id.as_str()).or_default().push(row);
    }

    let mut out = Vec::new();
    for (_, mut players) in games {
        // Stable sort: ties stay in input order. NaN weights sink to the bottom.
        players.sort_by(|a, b| match (a.weight.is_nan(), b.weight.is_nan()) {
            (false, false) => b.weight.total_cmp(&a.weight),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        for (scored, votes) in players.into_iter().zip(VOTE_SCHEDULE) {
            out.push(VoteCandidate {
                scored: scored.clone(),
                votes,
            });
        }
    }
    out
}
