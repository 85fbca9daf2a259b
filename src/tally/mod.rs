pub mod vote_tally;

pub use vote_tally::{tally, TallyEntry, TallyResult};
