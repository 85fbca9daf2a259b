use std::collections::HashMap;

use serde::Serialize;

use crate::types::VoteRecord;

/// Per-game line of the results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyEntry {
    pub game_id: i64,
    pub count: usize,
    /// Share of all votes, rounded to one decimal.
    pub percentage: f64,
    pub title: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub worth: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TallyResult {
    pub total: usize,
    pub ranking: Vec<TallyEntry>,
}

impl TallyResult {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Most-voted game, if any votes exist.
    pub fn leader(&self) -> Option<&TallyEntry> {
        self.ranking.first()
    }
}

/// Count votes per game and rank them.
///
/// Display fields come from the first vote seen for each game; later votes
/// never overwrite them. Ranking is by count descending, ties keep the order
/// in which each game was first encountered.
pub fn tally(votes: &[VoteRecord]) -> TallyResult {
    let total = votes.len();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut ranking: Vec<TallyEntry> = Vec::new();

    for vote in votes {
        match index.get(&vote.game_id) {
            Some(&i) => ranking[i].count += 1,
            None => {
                index.insert(vote.game_id, ranking.len());
                ranking.push(TallyEntry {
                    game_id: vote.game_id,
                    count: 1,
                    percentage: 0.0,
                    title: vote.game_title.clone(),
                    platform: vote.game_platform.clone(),
                    kind: vote.game_type.clone(),
                    worth: vote.game_worth.clone(),
                });
            }
        }
    }

    for entry in &mut ranking {
        entry.percentage = percentage(entry.count, total);
    }
    // `sort_by` is stable: equal counts stay in first-encounter order.
    ranking.sort_by(|a, b| b.count.cmp(&a.count));

    TallyResult { total, ranking }
}

/// `count / total * 100` rounded to one decimal; 0 when there are no votes.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
