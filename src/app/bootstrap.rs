use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::FinnhubClient;
use crate::services::{MarketData, RequestAccounting};
use crate::storage::{FileStore, KeyStore};
use crate::utils::{Clock, SystemClock, ThreadRandom};

/// Long-lived state shared by every command: counters, credential and the data-access layer.
pub struct AppContext {
    pub config: Config,
    pub accounting: Arc<RequestAccounting>,
    pub keys: Arc<KeyStore>,
    pub market: MarketData<FinnhubClient>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let accounting = Arc::new(RequestAccounting::new(&config.quota, Arc::clone(&clock)));
        let keys = Arc::new(KeyStore::new(
            config.storage.key_name.clone(),
            config.api.default_key.clone(),
            Arc::new(FileStore::new(config.storage.key_file.clone())),
            Arc::clone(&accounting),
        ));
        let client = FinnhubClient::new(config.api.clone())?;
        let market = MarketData::new(
            client,
            &config,
            Arc::clone(&keys),
            Arc::clone(&accounting),
            clock,
            Arc::new(ThreadRandom),
        );

        Ok(Self {
            config,
            accounting,
            keys,
            market,
        })
    }

    pub fn log_usage(&self) {
        let counter = self.accounting.snapshot();
        log::info!(
            "API calls: {} total, {} this minute, {} remaining",
            counter.total,
            counter.minute,
            self.accounting.remaining()
        );
    }
}
