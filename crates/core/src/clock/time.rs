use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AppTime {
    millis: u64,
}

impl AppTime {
    #[inline]
    pub fn new(millis: u64) -> Self {
        Self { millis }
    }

    pub fn is_before(&self, other: &AppTime) -> bool {
        self.millis < other.millis
    }

    pub fn is_before_or_eq(&self, other: &AppTime) -> bool {
        self.millis <= other.millis
    }

    /// Point in time `by` after `self`, saturating at the end of the range.
    pub fn plus(&self, by: Duration) -> AppTime {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        AppTime::new(self.millis.saturating_add(by))
    }

    pub fn as_millis_u64(&self) -> u64 {
        self.millis
    }
}

impl From<u128> for AppTime {
    fn from(value: u128) -> Self {
        AppTime::new(u64::try_from(value).unwrap_or(u64::MAX))
    }
}
