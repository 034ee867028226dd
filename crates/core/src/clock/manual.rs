use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::clock::{AppTime, Clock};

/// Clock that only moves when told to. Lets expiry be exercised without sleeping.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self(AtomicU64::new(start_millis))
    }

    pub fn set(&self, millis: u64) {
        self.0.store(millis, Ordering::SeqCst);
    }

    /// Moves forward by `by`, saturating at the end of the range.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> AppTime {
        AppTime::new(self.0.load(Ordering::SeqCst))
    }
}
