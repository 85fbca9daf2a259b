use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::api::health::HealthState;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::fetch_giveaways;
use crate::state::GiveawayCache;

/// Fetch the giveaway list once and swap it into the cache.
/// On failure the previous list is kept. Returns the number of records cached.
pub async fn refresh_once(
    client: &reqwest::Client,
    cfg: &Config,
    cache: &GiveawayCache,
    health: &HealthState,
) -> Result<usize> {
    let (records, stats) = match fetch_giveaways(client, cfg).await {
        Ok(r) => r,
        Err(e) => {
            health.record_failure();
            return Err(e);
        }
    };

    if stats.rejected > 0 {
        warn!(
            "[REFRESH] skipped {} of {} malformed giveaways; samples: {:?}",
            stats.rejected, stats.api_total, stats.rejection_samples,
        );
    }

    let count = stats.decoded;
    cache.replace(records);
    health.record_success(Utc::now().timestamp_millis().max(0) as u64);
    info!(
        "[REFRESH] cached {count} giveaways ({} from API{})",
        stats.api_total,
        if stats.via_proxy { ", via proxy" } else { "" },
    );
    Ok(count)
}

/// Background task re-fetching the giveaway list every `refresh_interval_secs`.
pub struct GiveawayRefresher {
    cfg: Config,
    client: reqwest::Client,
    cache: Arc<GiveawayCache>,
    health: Arc<HealthState>,
}

impl GiveawayRefresher {
    pub fn new(
        cfg: Config,
        client: reqwest::Client,
        cache: Arc<GiveawayCache>,
        health: Arc<HealthState>,
    ) -> Self {
        Self { cfg, client, cache, health }
    }

    pub async fn run(self) {
        let mut ticker = interval(Duration::from_secs(self.cfg.refresh_interval_secs));
        ticker.tick().await; // skip immediate first tick, bootstrap already ran

        loop {
            ticker.tick().await;
            if let Err(e) = refresh_once(&self.client, &self.cfg, &self.cache, &self.health).await {
                error!("Giveaway refresh failed: {e}");
            }
        }
    }
}
