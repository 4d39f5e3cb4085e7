use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

use crate::collector::HkjcClient;
use crate::config::BacktestConfig;
use crate::domain::DrawRecord;
use crate::store::DrawStore;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Historical draw store (in-memory, snapshot-backed)
    pub store: Arc<DrawStore>,

    /// HKJC fetch client; absent in offline/test setups
    pub fetcher: Option<Arc<HkjcClient>>,

    /// Backtest report limits
    pub backtest: BacktestConfig,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<DrawStore>,
        fetcher: Option<Arc<HkjcClient>>,
        backtest: BacktestConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            backtest,
            start_time: Utc::now(),
        }
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }

    /// Optionally refresh the store from HKJC, then return the history.
    ///
    /// A failed fetch or persist degrades to the existing data with a
    /// warning; it never fails the request. The returned flag says whether
    /// fresh data actually replaced the store.
    pub async fn history_with_refresh(&self, skip_fetch: bool) -> (Vec<DrawRecord>, bool) {
        let mut fetched = false;
        if !skip_fetch {
            if let Some(fetcher) = &self.fetcher {
                match fetcher.fetch_all().await {
                    Ok(records) => match self.store.replace(records) {
                        Ok(()) => fetched = true,
                        Err(e) => {
                            warn!(error = %e, "failed to persist fetched draws; using existing data")
                        }
                    },
                    Err(e) => warn!(error = %e, "HKJC fetch failed; using existing data"),
                }
            }
        }
        (self.store.history(), fetched)
    }
}
