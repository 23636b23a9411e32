use std::sync::Mutex;

use chrono::{DateTime, Duration, Local};

/// Source of "now" for every time-dependent component (caches, request accounting, history).
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|poison| poison.into_inner());
        *guard += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Local::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

pub fn format_timestamp(time: DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::default();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(61));
        assert_eq!(clock.now() - start, Duration::seconds(61));
    }
}
