//! Item ids and the clock they are derived from.
//!
//! Store-created items get an id made of the creation time in Unix
//! milliseconds. `IdGenerator` keeps those ids strictly increasing, so two
//! items created in the same millisecond still get distinct ids.

use std::fmt;

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant. Ids still advance through `IdGenerator`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Monotonic timestamp id generator.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for an item created at `at`: its Unix milliseconds, bumped past
    /// the previously issued id when the clock has not advanced.
    pub fn next_id(&mut self, at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis();
        let id = if millis > self.last {
            millis
        } else {
            self.last.saturating_add(1)
        };
        self.last = id;
        id.to_string()
    }
}
