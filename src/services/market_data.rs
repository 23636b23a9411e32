use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::time::sleep;

use crate::config::{BatchConfig, Config};
use crate::fetch::{decode_quote, decode_search, Upstream};
use crate::models::{PriceChanges, Quote, SearchResult, Series, TimeRange};
use crate::storage::{ExpiringCache, KeyStore};
use crate::utils::{Clock, RandomSource};

use super::history::{synthesize_changes, synthesize_series};
use super::RequestAccounting;

/// Cache-first access to quotes, symbol search and (synthetic) price history.
///
/// Upstream failures never escape this type: they are logged and reported as `None` or an
/// empty collection so one bad symbol cannot abort a batch. Nothing is retried.
pub struct MarketData<U> {
    upstream: U,
    keys: Arc<KeyStore>,
    accounting: Arc<RequestAccounting>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    batch: BatchConfig,
    quotes: ExpiringCache<Quote>,
    searches: ExpiringCache<Vec<SearchResult>>,
    histories: ExpiringCache<Series>,
}

impl<U: Upstream> MarketData<U> {
    pub fn new(
        upstream: U,
        config: &Config,
        keys: Arc<KeyStore>,
        accounting: Arc<RequestAccounting>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            upstream,
            keys,
            accounting,
            batch: config.batch.clone(),
            quotes: ExpiringCache::new("quote", config.cache.quote_ttl, Arc::clone(&clock)),
            searches: ExpiringCache::new("search", config.cache.search_ttl, Arc::clone(&clock)),
            histories: ExpiringCache::new("history", config.cache.history_ttl, Arc::clone(&clock)),
            clock,
            random,
        }
    }

    pub fn accounting(&self) -> &RequestAccounting {
        &self.accounting
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        if let Some(quote) = self.quotes.get(symbol) {
            return Some(quote);
        }

        self.accounting.record();
        let credential = self.keys.get();
        let outcome = self
            .upstream
            .quote(symbol, &credential)
            .await
            .and_then(|body| decode_quote(symbol, &body));

        match outcome {
            Ok(quote) => {
                self.quotes.put(symbol, quote.clone());
                Some(quote)
            }
            Err(err) => {
                log::warn!("No quote for {}: {}", symbol, err);
                None
            }
        }
    }

    /// Synthetic series for `range`, anchored to the live quote. Empty when no quote is available.
    pub async fn fetch_history(&self, symbol: &str, range: TimeRange) -> Series {
        let key = history_key(symbol, range);
        if let Some(series) = self.histories.get(&key) {
            return series;
        }

        self.accounting.record();

        let Some(anchor) = self.fetch_quote(symbol).await else {
            log::warn!("No anchor quote for {} history ({})", symbol, range);
            return Series::new();
        };

        let series = synthesize_series(anchor.price, range, self.clock.now(), self.random.as_ref());
        self.histories.put(key, series.clone());
        series
    }

    pub async fn fetch_price_changes(&self, symbol: &str) -> PriceChanges {
        match self.fetch_quote(symbol).await {
            Some(quote) => synthesize_changes(quote.price, self.random.as_ref()),
            None => PriceChanges::default(),
        }
    }

    /// Live quote carrying the derived week/month figures.
    pub async fn fetch_quote_with_changes(&self, symbol: &str) -> Option<Quote> {
        let quote = self.fetch_quote(symbol).await?;
        let changes = synthesize_changes(quote.price, self.random.as_ref());
        Some(quote.with_changes(&changes))
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        if let Some(results) = self.searches.get(query) {
            return results;
        }

        self.accounting.record();
        let credential = self.keys.get();
        let outcome = self
            .upstream
            .search(query, &credential)
            .await
            .and_then(|body| decode_search(query, &body));

        match outcome {
            Ok(results) => {
                self.searches.put(query, results.clone());
                results
            }
            Err(err) => {
                log::warn!("Search for `{}` failed: {}", query, err);
                Vec::new()
            }
        }
    }

    /// Advisory quota message to show before issuing a search.
    pub fn search_warning(&self) -> Option<String> {
        self.accounting.quota_warning()
    }

    pub async fn fetch_quotes(&self, symbols: &[String]) -> Vec<Option<Quote>> {
        run_batched(&self.batch, symbols, |symbol| self.fetch_quote(symbol)).await
    }

    pub async fn fetch_quotes_with_changes(&self, symbols: &[String]) -> Vec<Option<Quote>> {
        run_batched(&self.batch, symbols, |symbol| {
            self.fetch_quote_with_changes(symbol)
        })
        .await
    }

    pub async fn fetch_histories(&self, symbols: &[String], range: TimeRange) -> Vec<Series> {
        run_batched(&self.batch, symbols, |symbol| self.fetch_history(symbol, range)).await
    }

    /// Drop every cached quote, search and series. Counters and credential are untouched.
    pub fn clear_all(&self) {
        self.quotes.clear();
        self.searches.clear();
        self.histories.clear();
        log::debug!("Cleared quote, search and history caches");
    }
}

pub fn history_key(symbol: &str, range: TimeRange) -> String {
    format!("{}-{}", symbol, range.label())
}

/// Run `fetch` over `symbols` in concurrent batches, pausing between batches.
/// Results keep the input order.
async fn run_batched<'a, T, F, Fut>(batch: &BatchConfig, symbols: &'a [String], fetch: F) -> Vec<T>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = T>,
{
    let size = batch.size.max(1);
    let mut results = Vec::with_capacity(symbols.len());

    for (idx, chunk) in symbols.chunks(size).enumerate() {
        if idx > 0 && !batch.pause.is_zero() {
            sleep(batch.pause).await;
        }
        let outcomes = join_all(chunk.iter().map(|symbol| fetch(symbol.as_str()))).await;
        results.extend(outcomes);
    }

    results
}
