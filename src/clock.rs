// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! All things time-related.

pub use chrono::{DateTime, TimeDelta, Utc};

/// Tells time and returns the time.
///
/// Generally you will want to retrieve time using [`SystemClock`],
/// but in tests you may want to implement a `Clock` with a fixed time.
pub trait Clock {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Interacts with the system clock to get the current time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Marks a thing that has a notion of when it was created.
pub trait HasAge {
    /// The date the item was created, in UTC.
    fn created_utc(&self) -> DateTime<Utc>;

    /// True if the item was created at or after `cutoff`.
    fn is_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_utc() >= cutoff
    }
}

/// A trailing span of whole days ending at the current time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    days: u32,
}

impl Window {
    /// A window covering the last `days` days.
    pub fn days(days: u32) -> Self {
        Self { days }
    }

    /// Number of days covered by the window.
    pub fn len_days(&self) -> u32 {
        self.days
    }

    /// The earliest instant inside the window, truncated to whole seconds.
    ///
    /// Reddit reports creation times in whole seconds, so anything created
    /// at exactly this instant is still inside the window. A window that
    /// reaches back before the earliest representable date starts at that
    /// date, so it covers everything.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtally::clock::{Clock, DateTime, Utc, Window};
    ///
    /// struct Noon;
    ///
    /// impl Clock for Noon {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         DateTime::parse_from_rfc3339("2025-05-23T12:00:00.750Z")
    ///             .unwrap()
    ///             .with_timezone(&Utc)
    ///     }
    /// }
    ///
    /// let cutoff = Window::days(7).cutoff(&Noon);
    /// assert_eq!(cutoff.to_rfc3339(), "2025-05-16T12:00:00+00:00");
    /// ```
    pub fn cutoff<C: Clock>(&self, clock: &C) -> DateTime<Utc> {
        let cutoff = TimeDelta::try_days(self.days.into())
            .and_then(|span| clock.now().checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        DateTime::from_timestamp(cutoff.timestamp(), 0).unwrap_or(cutoff)
    }
}

#[cfg(test)]
mod tests {
    mod clock {
        use super::super::*;
        use std::ops::Sub;

        #[test]
        fn it_returns_the_system_time() {
            let clock = SystemClock::default();
            let delta = Utc::now().sub(clock.now());
            let secs = delta.num_seconds();
            assert_eq!(secs, 0);
        }
    }

    mod has_age {
        use super::super::*;

        #[derive(Debug)]
        struct ThingWithAge {
            created_utc: DateTime<Utc>,
        }

        impl ThingWithAge {
            pub fn new(timestamp: i64) -> Self {
                let created_utc = DateTime::from_timestamp(timestamp, 0).unwrap();
                Self { created_utc }
            }
        }

        impl HasAge for ThingWithAge {
            fn created_utc(&self) -> DateTime<Utc> {
                self.created_utc
            }
        }

        #[test]
        fn it_is_since_an_earlier_cutoff() {
            let cutoff = DateTime::from_timestamp(1747415580, 0).unwrap();
            assert!(ThingWithAge::new(1747415581).is_since(cutoff));
        }

        #[test]
        fn it_is_since_a_cutoff_at_the_same_instant() {
            let cutoff = DateTime::from_timestamp(1747415580, 0).unwrap();
            assert!(ThingWithAge::new(1747415580).is_since(cutoff));
        }

        #[test]
        fn it_is_not_since_a_later_cutoff() {
            let cutoff = DateTime::from_timestamp(1747415580, 0).unwrap();
            assert!(!ThingWithAge::new(1747415579).is_since(cutoff));
        }
    }

    mod window {
        use super::super::*;
        use crate::test_utils::FrozenClock;

        #[test]
        fn it_returns_its_length() {
            assert_eq!(Window::days(7).len_days(), 7);
        }

        #[test]
        fn it_computes_a_cutoff_in_the_past() {
            let clock = FrozenClock::default();
            let cutoff = Window::days(7).cutoff(&clock);
            let expected = DateTime::parse_from_rfc3339("2025-05-16T17:13:00Z").unwrap();
            assert_eq!(cutoff, expected);
        }

        #[test]
        fn it_truncates_the_cutoff_to_whole_seconds() {
            let now = DateTime::parse_from_rfc3339("2025-05-23T17:13:00.999Z")
                .unwrap()
                .with_timezone(&Utc);
            let cutoff = Window::days(1).cutoff(&FrozenClock::new(now));
            assert_eq!(cutoff.timestamp_subsec_nanos(), 0);
            assert_eq!(cutoff.timestamp(), 1747933980);
        }

        #[test]
        fn it_starts_at_the_earliest_date_when_the_window_is_too_long() {
            let cutoff = Window::days(u32::MAX).cutoff(&FrozenClock::default());
            assert_eq!(cutoff, DateTime::<Utc>::MIN_UTC);
        }

        #[test]
        fn it_includes_everything_when_the_window_is_too_long() {
            let cutoff = Window::days(u32::MAX).cutoff(&FrozenClock::default());
            let created = DateTime::from_timestamp(0, 0).unwrap();
            assert!(created >= cutoff);
        }
    }
}
