pub mod giveaway_cache;

pub use giveaway_cache::GiveawayCache;
