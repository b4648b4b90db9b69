//! Injected time and id sources.
//!
//! The engine never reads the wall clock or generates ids on its own, which
//! keeps session timing and record ids deterministic under test.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

pub trait IdSource {
    /// Returns a fresh opaque id starting with `prefix`.
    fn new_id(&mut self, prefix: &str) -> String;
}

/// `{prefix}_{ULID}` ids: unique and sortable by creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidIds;

impl IdSource for UlidIds {
    fn new_id(&mut self, prefix: &str) -> String {
        format!("{}_{}", prefix, ulid::Ulid::new())
    }
}

/// `{prefix}_1`, `{prefix}_2`, ... with one counter shared across prefixes.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdSource for SequentialIds {
    fn new_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}_{}", prefix, self.next)
    }
}
