pub mod dedup;
pub mod filter;

pub use dedup::{sorted_by_title, unique_games};
pub use filter::{filter_games, filter_giveaways, paginate, GameFilter, Page};
