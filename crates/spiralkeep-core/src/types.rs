//! Shared types: timestamps, clocks and identifiers

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// Wall-clock instant used by every entity. Serialized as epoch milliseconds.
pub type Timestamp = DateTime<Utc>;

/// Source of "now" for every time-dependent decision.
///
/// Production code uses [`SystemClock`]; tests drive a [`ManualClock`] so that
/// deadlines and activity windows can be crossed deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at a fixed epoch-millisecond instant.
    pub fn at_millis(millis: i64) -> Self {
        let start = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Utc::now);
        Self::new(start)
    }

    pub fn set(&self, to: Timestamp) {
        *self.lock() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now = saturating_add(*now, by);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
        // A poisoned clock still holds a valid instant.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.lock()
    }
}

/// Shared clock handle handed to every component of one session.
pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

/// `at + by`, pinned to the representable range instead of overflowing.
pub fn saturating_add(at: Timestamp, by: Duration) -> Timestamp {
    at.checked_add_signed(by).unwrap_or(if by < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// `at - by`, pinned to the representable range instead of overflowing.
pub fn saturating_sub(at: Timestamp, by: Duration) -> Timestamp {
    at.checked_sub_signed(by).unwrap_or(if by < Duration::zero() {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}

/// Entity id: `<prefix>_<epoch ms>_<random suffix>`.
pub fn new_entity_id(prefix: &str, now: Timestamp) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, now.timestamp_millis(), &suffix[..9])
}

/// Stable per-device user identifier, generated once at first use.
pub fn new_user_id() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_carry_prefix_and_time() {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let id = new_entity_id("poll", clock.now());
        assert!(id.starts_with("poll_1700000000000_"));
        assert_eq!(id.len(), "poll_1700000000000_".len() + 9);
    }

    #[test]
    fn entity_ids_are_unique_at_same_instant() {
        let now = ManualClock::at_millis(0).now();
        assert_ne!(new_entity_id("input", now), new_entity_id("input", now));
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_millis(1_000);
        clock.advance(chrono::Duration::seconds(2));
        assert_eq!(clock.now().timestamp_millis(), 3_000);
    }

    #[test]
    fn timestamp_arithmetic_saturates() {
        let now = ManualClock::at_millis(0).now();
        assert_eq!(saturating_add(now, Duration::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(saturating_sub(now, Duration::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(saturating_add(now, Duration::hours(1)).timestamp_millis(), 3_600_000);
    }

    #[test]
    fn user_ids_are_prefixed() {
        let id = new_user_id();
        assert!(id.starts_with("user_"));
        assert_ne!(id, new_user_id());
    }
}
