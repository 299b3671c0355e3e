use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};

/// Source of "now" for default dates, times and identities.
pub trait Clock: Send + Sync {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().and_utc()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used for deterministic ids and times.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Hands out entity ids seeded from the clock's millisecond timestamp.
///
/// Every id is `max(now_ms, last + 1)`, so ids are strictly increasing for
/// the lifetime of the generator even when several are requested within the
/// same millisecond or the clock steps backwards.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now_millis: i64) -> i64 {
        let mut current = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now_millis.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }

    /// Ensures ids handed out later are greater than `id`.
    pub fn observe(&self, id: i64) {
        self.last.fetch_max(id, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(at(9, 0));
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), at(10, 30));
    }

    #[test]
    fn test_ids_follow_clock() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next(1_000), 1_000);
        assert_eq!(ids.next(2_000), 2_000);
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let ids = IdGenerator::new();
        let a = ids.next(5_000);
        let b = ids.next(5_000);
        let c = ids.next(4_000);
        assert_eq!((a, b, c), (5_000, 5_001, 5_002));
    }

    #[test]
    fn test_observe_bumps_floor() {
        let ids = IdGenerator::new();
        ids.observe(10_000);
        assert_eq!(ids.next(1), 10_001);
    }
}
