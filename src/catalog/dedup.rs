use std::collections::HashSet;

use crate::types::{GiveawayRecord, VotableGame};

/// Derive the votable games from a fetched giveaway list.
///
/// The same game often appears several times (one giveaway per store). The
/// giveaway id is the dedup key: the first occurrence wins and encounter order
/// is kept. Records without a usable title are skipped.
pub fn unique_games(records: &[GiveawayRecord]) -> Vec<VotableGame> {
    let mut seen: HashSet<i64> = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter_map(VotableGame::from_record)
        .filter(|game| seen.insert(game.id))
        .collect()
}

/// Alphabetical copy of `games` for select-list display. Ties keep input order.
pub fn sorted_by_title(games: &[VotableGame]) -> Vec<VotableGame> {
    let mut sorted = games.to_vec();
    sorted.sort_by_cached_key(|g| g.title.to_lowercase());
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, title: &str, platforms: &str) -> GiveawayRecord {
        GiveawayRecord {
            id,
            title: title.to_string(),
            worth: "$9.99".to_string(),
            kind: "Game".to_string(),
            platforms: platforms.to_string(),
            thumbnail: String::new(),
            description: String::new(),
            end_date: "N/A".to_string(),
            open_giveaway_url: String::new(),
            users: None,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(unique_games(&[]).is_empty());
    }

    #[test]
    fn first_occurrence_wins() {
        let records = vec![
            record(5, "A", "PC"),
            record(5, "A-dup", "Steam"),
            record(6, "B", "PC"),
        ];
        let games = unique_games(&records);
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, 5);
        assert_eq!(games[0].title, "A");
        assert_eq!(games[0].platform, "PC");
        assert_eq!(games[1].id, 6);
    }

    #[test]
    fn output_ids_are_distinct_and_no_longer_than_input() {
        let records: Vec<_> = [1, 2, 1, 3, 2, 2, 4, 1]
            .iter()
            .map(|&id| record(id, &format!("g{id}"), "PC"))
            .collect();
        let games = unique_games(&records);
        assert!(games.len() <= records.len());
        let ids: Vec<i64> = games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn untitled_records_are_skipped() {
        let records = vec![record(1, "", "PC"), record(2, "Portal", "PC"), record(1, "Late", "PC")];
        let games = unique_games(&records);
        let ids: Vec<i64> = games.iter().map(|g| g.id).collect();
        // The blank-titled id 1 never claimed the key, so the later good record is kept.
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(games[1].title, "Late");
    }

    #[test]
    fn input_is_not_mutated() {
        let records = vec![record(2, "Zeta", "PC"), record(1, "alpha", "PC")];
        let before = records.clone();
        let games = unique_games(&records);
        let _ = sorted_by_title(&games);
        assert_eq!(records, before);
        assert_eq!(games[0].title, "Zeta");
    }

    #[test]
    fn sort_is_case_insensitive_copy() {
        let games = unique_games(&[
            record(1, "zork", "PC"),
            record(2, "Alan Wake", "PC"),
            record(3, "braid", "PC"),
        ]);
        let sorted = sorted_by_title(&games);
        let titles: Vec<&str> = sorted.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Alan Wake", "braid", "zork"]);
        assert_eq!(games[0].title, "zork");
    }
}
