//! Implementations of the clock and identifier capabilities.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
///
/// Every call to [`Clock::now`] returns the instant the clock was created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Returns the frozen instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Mints opaque unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier. Two calls never return the same value.
    fn new_id(&self) -> String;
}

/// Random version 4 UUIDs in hyphenated form.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }
}

/// Deterministic identifiers of the form `{prefix}-{n}`, counting from 1.
///
/// The counter is atomic so a single generator can be shared across tasks.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose first identifier is `{prefix}-1`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_never_moves() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.instant());
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn uuid_generator_emits_hyphenated_v4() {
        let id = UuidGenerator.new_id();
        assert_eq!(id.len(), 36);
        let parsed = Uuid::parse_str(&id).expect("valid uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn uuid_generator_is_unique() {
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| UuidGenerator.new_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn sequential_generator_counts_from_one() {
        let ids = SequentialIdGenerator::new("gap");
        assert_eq!(ids.new_id(), "gap-1");
        assert_eq!(ids.new_id(), "gap-2");
        assert_eq!(ids.new_id(), "gap-3");
    }
}
