// EMA - ema-platform
// Module: Wall-clock time
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(unsafe_code)]

//! Nanosecond wall-clock timestamps.
//!
//! [`Time`] is a Unix timestamp split into whole seconds and a
//! nanosecond remainder, the shape `clock_gettime` reports and device
//! certificates carry. [`Duration`] is a signed nanosecond count, so
//! arithmetic both forward and backward in time goes through one
//! [`Time::add`].

use core::fmt;

use ema_error::Result;

/// FFI declarations for reading the realtime clock.
#[allow(non_camel_case_types)]
mod ffi {
    use core::ffi::{c_int, c_long};

    pub const CLOCK_REALTIME: c_int = 0;

    #[repr(C)]
    pub struct timespec {
        pub tv_sec: c_long,
        pub tv_nsec: c_long,
    }

    extern "C" {
        pub fn clock_gettime(clockid: c_int, tp: *mut timespec) -> c_int;
    }
}

/// Signed time span in nanoseconds.
pub type Duration = i64;

/// One nanosecond.
pub const NANOSECOND: Duration = 1;
/// One microsecond.
pub const MICROSECOND: Duration = 1_000 * NANOSECOND;
/// One millisecond.
pub const MILLISECOND: Duration = 1_000 * MICROSECOND;
/// One second.
pub const SECOND: Duration = 1_000 * MILLISECOND;
/// One minute.
pub const MINUTE: Duration = 60 * SECOND;
/// One hour.
pub const HOUR: Duration = 60 * MINUTE;
/// One day.
pub const DAY: Duration = 24 * HOUR;

/// Mean Gregorian year, used for coarse certificate-style horizons.
const YEAR: Duration = 31_556_952 * SECOND;

/// Duration of `count` mean years.
#[must_use]
pub const fn years(count: i64) -> Duration {
    count * YEAR
}

/// A wall-clock timestamp: seconds since the Unix epoch plus a
/// nanosecond remainder in `[0, 1_000_000_000)`.
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    sec: i64,
    nsec: i64,
}

impl Time {
    /// Reads the realtime clock.
    pub fn now() -> Result<Self> {
        let mut ts = ffi::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid timespec and CLOCK_REALTIME is
        // supported on every target libc.
        ema_error::check_os(unsafe { ffi::clock_gettime(ffi::CLOCK_REALTIME, &mut ts) })?;
        Ok(Self {
            sec: ts.tv_sec,
            nsec: ts.tv_nsec,
        })
    }

    /// Builds a timestamp from raw parts.
    ///
    /// `nsec` outside `[0, 1_000_000_000)` is normalized into `sec`.
    #[must_use]
    pub const fn unix(sec: i64, nsec: i64) -> Self {
        Self { sec: 0, nsec: 0 }.add(sec * SECOND + nsec)
    }

    /// The zero value, the Unix epoch.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.sec == 0 && self.nsec == 0
    }

    /// Whole seconds since the epoch.
    #[must_use]
    pub const fn unix_sec(&self) -> i64 {
        self.sec
    }

    /// Nanosecond remainder, in `[0, 1_000_000_000)`.
    #[must_use]
    pub const fn nanosecond(&self) -> i64 {
        self.nsec
    }

    /// Nanoseconds since the epoch.
    ///
    /// Overflows for timestamps beyond the year 2262; the split
    /// representation itself has no such horizon.
    #[must_use]
    pub const fn unix_nano(&self) -> i64 {
        self.sec * SECOND + self.nsec
    }

    /// Adds a signed duration, keeping the nanosecond remainder
    /// normalized. Subtraction is addition of a negative duration.
    #[must_use]
    pub const fn add(self, duration: Duration) -> Self {
        let mut sec = self.sec + duration / SECOND;
        let mut nsec = self.nsec + duration % SECOND;
        if nsec >= SECOND {
            nsec -= SECOND;
            sec += 1;
        } else if nsec < 0 {
            nsec += SECOND;
            sec -= 1;
        }
        Self { sec, nsec }
    }
}

impl fmt::Display for Time {
    /// ISO 8601 UTC with second precision, `2024-02-29T12:00:00Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.sec.div_euclid(DAY / SECOND);
        let secs = self.sec.rem_euclid(DAY / SECOND);
        let (year, month, day) = civil_from_days(days);
        write!(
            f,
            "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        )
    }
}

/// Gregorian date for a day count relative to 1970-01-01, after
/// Howard Hinnant's `civil_from_days`.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::string::ToString;

    #[test]
    fn epoch_formats_as_iso8601() {
        assert_eq!(Time::unix(0, 0).to_string(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn known_timestamps_format_correctly() {
        assert_eq!(
            Time::unix(1_700_000_000, 0).to_string(),
            "2023-11-14T22:13:20Z"
        );
        // Leap day.
        assert_eq!(
            Time::unix(1_709_164_800, 0).to_string(),
            "2024-02-29T00:00:00Z"
        );
        // Before the epoch.
        assert_eq!(Time::unix(-1, 0).to_string(), "1969-12-31T23:59:59Z");
    }

    #[test]
    fn formats_into_fixed_capacity_sink() {
        use core::fmt::Write;

        let mut line = ema_foundation::StaticString::<32>::new();
        write!(line, "{}", Time::unix(1_700_000_000, 0)).unwrap();
        assert_eq!(line, "2023-11-14T22:13:20Z");

        // A sink too small for the timestamp reports the overflow.
        let mut tiny = ema_foundation::StaticString::<8>::new();
        assert!(write!(tiny, "{}", Time::unix(0, 0)).is_err());
    }

    #[test]
    fn add_normalizes_negative_remainder() {
        let time = Time::unix(10, 100).add(-200);
        assert_eq!(time.unix_sec(), 9);
        assert_eq!(time.nanosecond(), 999_999_900);
    }

    #[test]
    fn add_carries_overflowing_remainder() {
        let time = Time::unix(10, 999_999_900).add(200);
        assert_eq!(time.unix_sec(), 11);
        assert_eq!(time.nanosecond(), 100);
    }

    #[test]
    fn ordering_is_chronological() {
        let a = Time::unix(5, 999_999_999);
        let b = Time::unix(6, 0);
        assert!(a < b);
        assert!(b < b.add(NANOSECOND));
        assert_eq!(b.add(NANOSECOND).add(-NANOSECOND), b);
    }

    #[test]
    fn now_is_past_2024() {
        let now = Time::now().unwrap();
        assert!(now > Time::unix(1_704_067_200, 0));
        assert!(!now.is_zero());
    }

    #[test]
    fn year_horizon_is_coarse_but_sane() {
        let start = Time::unix(0, 0);
        let horizon = start.add(years(30));
        // 30 mean years land within a day of 2000-01-01.
        assert!(horizon > Time::unix(946_598_400, 0));
        assert!(horizon < Time::unix(946_771_200, 0));
    }

    proptest! {
        // The remainder stays normalized for any duration.
        #[test]
        fn add_keeps_remainder_normalized(
            sec in -2_000_000_000i64..2_000_000_000,
            nsec in 0i64..1_000_000_000,
            duration in -2_000_000_000_000_000_000i64..2_000_000_000_000_000_000,
        ) {
            let time = Time::unix(sec, nsec).add(duration);
            prop_assert!(time.nanosecond() >= 0);
            prop_assert!(time.nanosecond() < 1_000_000_000);
        }

        // Adding and removing the same duration is the identity.
        #[test]
        fn add_roundtrips(
            sec in -2_000_000_000i64..2_000_000_000,
            nsec in 0i64..1_000_000_000,
            duration in -1_000_000_000_000_000_000i64..1_000_000_000_000_000_000,
        ) {
            let time = Time::unix(sec, nsec);
            prop_assert_eq!(time.add(duration).add(-duration), time);
        }
    }
}
