// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Sources of the current time.
//!
//! Timestamps handed out by these clocks are truncated to microseconds, which is the finest
//! resolution that PostgreSQL can store.  This keeps values stable across database round trips.

use time::OffsetDateTime;

/// Something that knows what time it is.
pub trait Clock {
    /// Returns the current UTC time with microsecond resolution.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Drops any sub-microsecond component of `ts`.
fn truncate_to_micros(ts: OffsetDateTime) -> OffsetDateTime {
    let extra = ts.nanosecond() % 1000;
    ts.replace_nanosecond(ts.nanosecond() - extra).unwrap_or(ts)
}

/// Clock backed by the host's wall clock.
#[derive(Clone, Default)]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        truncate_to_micros(OffsetDateTime::now_utc())
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// A clock frozen at a given instant until explicitly moved forward.
    pub struct SettableClock {
        /// The instant reported by `now_utc`.
        now: Mutex<OffsetDateTime>,
    }

    impl SettableClock {
        /// Creates a clock frozen at `now`.  Sub-microsecond precision is discarded.
        pub fn new(now: OffsetDateTime) -> Self {
            Self { now: Mutex::new(truncate_to_micros(now)) }
        }

        /// Moves the clock forward by `delta`.  Sub-microsecond precision is discarded.
        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = truncate_to_micros(*now + delta);
        }
    }

    impl Clock for SettableClock {
        fn now_utc(&self) -> OffsetDateTime {
            *self.now.lock().unwrap()
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_truncate_to_micros() {
        assert_eq!(
            datetime!(1999-12-31 23:59:59.999999 UTC),
            truncate_to_micros(datetime!(1999-12-31 23:59:59.999999999 UTC))
        );
        assert_eq!(
            datetime!(2023-01-01 00:00:00 UTC),
            truncate_to_micros(datetime!(2023-01-01 00:00:00 UTC))
        );
    }

    #[test]
    fn test_systemclock_advances_in_microseconds() {
        let clock = SystemClock::default();
        let first = clock.now_utc();
        let second = clock.now_utc();
        assert!(first <= second);
        assert_eq!(0, first.nanosecond() % 1000);
        assert_eq!(0, second.nanosecond() % 1000);
    }
}
