use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::types::{GiveawayRecord, VotableGame};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One fetched giveaway list together with its id index.
/// Both are built before publishing, so readers never see one without the other.
#[derive(Default)]
struct Snapshot {
    /// Full list in upstream order.
    records: Arc<Vec<GiveawayRecord>>,
    /// id → position of the record that represents it (first one with a usable title)
    by_id: HashMap<i64, usize>,
}

impl Snapshot {
    fn build(records: Vec<GiveawayRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if VotableGame::from_record(record).is_some() {
                by_id.entry(record.id).or_insert(pos);
            }
        }
        Self { records: Arc::new(records), by_id }
    }
}

// ---------------------------------------------------------------------------
// GiveawayCache
// ---------------------------------------------------------------------------

/// The most recently fetched giveaway list.
///
/// Readers take an `Arc` snapshot and run the pure catalog/tally functions on it,
/// so a refresh replacing the list never disturbs an in-flight request.
/// `find` resolves an id to the same record `unique_games` would pick.
#[derive(Default)]
pub struct GiveawayCache {
    current: RwLock<Arc<Snapshot>>,
}

impl GiveawayCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Swap in a freshly fetched list.
    pub fn replace(&self, records: Vec<GiveawayRecord>) {
        let next = Arc::new(Snapshot::build(records));
        let mut guard = match self.current.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = next;
    }

    fn current(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(g) => Arc::clone(&g),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<GiveawayRecord>> {
        Arc::clone(&self.current().records)
    }

    pub fn find(&self, id: i64) -> Option<GiveawayRecord> {
        let snap = self.current();
        snap.by_id.get(&id).map(|&pos| snap.records[pos].clone())
    }

    pub fn len(&self) -> usize {
        self.current().records.len()
    }
}
