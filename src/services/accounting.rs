use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Local};

use crate::config::QuotaConfig;
use crate::utils::Clock;

/// Upstream free-tier ceiling, in calls per minute.
pub const DEFAULT_MINUTE_LIMIT: u32 = 60;

const WINDOW_MS: i64 = 60_000;

/// Outbound call counters. `minute` approximates the upstream rolling window client-side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestCounter {
    pub total: u64,
    pub minute: u32,
    pub last_reset: DateTime<Local>,
}

pub struct RequestAccounting {
    limit: u32,
    warning_threshold: u32,
    clock: Arc<dyn Clock>,
    counter: Mutex<RequestCounter>,
}

impl RequestAccounting {
    pub fn new(quota: &QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        let counter = RequestCounter {
            total: 0,
            minute: 0,
            last_reset: clock.now(),
        };
        Self {
            limit: quota.per_minute_limit,
            warning_threshold: quota.warning_threshold,
            clock,
            counter: Mutex::new(counter),
        }
    }

    /// Count one upstream call. Must run immediately before the call is issued.
    pub fn record(&self) {
        let now = self.clock.now();
        let mut counter = self.lock();
        counter.total += 1;
        if now - counter.last_reset > Duration::milliseconds(WINDOW_MS) {
            counter.minute = 1;
            counter.last_reset = now;
        } else {
            counter.minute += 1;
        }
        log::debug!(
            "API call recorded: total {}, this minute {}",
            counter.total,
            counter.minute
        );
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.lock().minute)
    }

    /// Start a fresh minute window, e.g. after the credential changed.
    pub fn reset(&self) {
        let now = self.clock.now();
        let mut counter = self.lock();
        counter.minute = 0;
        counter.last_reset = now;
    }

    pub fn snapshot(&self) -> RequestCounter {
        *self.lock()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Advisory text shown before quota-hungry actions such as search-as-you-type.
    pub fn quota_warning(&self) -> Option<String> {
        let remaining = self.remaining();
        if remaining == 0 {
            Some(format!(
                "API rate limit reached ({} calls/minute). Wait a moment before searching again.",
                self.limit
            ))
        } else if remaining <= self.warning_threshold {
            Some(format!(
                "Approaching API rate limit: {remaining} of {} calls left this minute.",
                self.limit
            ))
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, RequestCounter> {
        self.counter
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
