use serde::Serialize;

use crate::types::{GiveawayRecord, VotableGame};

/// Platform / type filter shared by the giveaway listing and the voting selector.
///
/// Platform is a case-insensitive substring match ("steam" matches "PC, Steam").
/// Type is an exact match. Empty strings count as "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    platform: Option<String>,
    kind: Option<String>,
}

impl GameFilter {
    pub fn new(platform: Option<&str>, kind: Option<&str>) -> Self {
        Self {
            platform: platform
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_lowercase),
            kind: kind.filter(|k| !k.is_empty()).map(str::to_string),
        }
    }

    pub fn matches(&self, platforms: &str, kind: &str) -> bool {
        let platform_ok = self
            .platform
            .as_deref()
            .map_or(true, |p| platforms.to_lowercase().contains(p));
        let kind_ok = self.kind.as_deref().map_or(true, |k| kind == k);
        platform_ok && kind_ok
    }
}

/// Subsequence of `games` matching the filters, in input order.
pub fn filter_games(games: &[VotableGame], platform: Option<&str>, kind: Option<&str>) -> Vec<VotableGame> {
    let filter = GameFilter::new(platform, kind);
    games
        .iter()
        .filter(|g| filter.matches(&g.platform, &g.kind))
        .cloned()
        .collect()
}

/// Same predicate over the raw listing, matched against `platforms` and `type`.
pub fn filter_giveaways(records: &[GiveawayRecord], filter: &GameFilter) -> Vec<GiveawayRecord> {
    records
        .iter()
        .filter(|r| filter.matches(&r.platforms, &r.kind))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// The visible head of a listing plus the counters shown next to it.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub visible: usize,
    pub total: usize,
    pub has_more: bool,
}

/// First `visible` items of `items`. `visible` is clamped to at least one.
pub fn paginate<T: Clone>(items: &[T], visible: usize) -> Page<T> {
    let visible = visible.max(1).min(items.len());
    Page {
        items: items[..visible].to_vec(),
        visible,
        total: items.len(),
        has_more: visible < items.len(),
    }
}
