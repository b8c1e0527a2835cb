//! Record timestamps
//!
//! The `createdAt` index stores Unix milliseconds. Stored records also keep
//! the nanoseconds below the millisecond, so a timestamp of any precision
//! survives a store round-trip unchanged.

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Wall-clock timestamp attached to records
pub type Timestamp = DateTime<Utc>;

/// Current time truncated to whole milliseconds
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Unix milliseconds for a timestamp
pub fn to_millis(ts: &Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Nanoseconds of a timestamp below its whole millisecond
pub fn sub_millis_nanos(ts: &Timestamp) -> u32 {
    ts.timestamp_subsec_nanos() % 1_000_000
}

/// Timestamp from Unix milliseconds
///
/// Out-of-range values collapse to the Unix epoch.
pub fn from_millis(millis: i64) -> Timestamp {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Timestamp from Unix milliseconds plus the nanoseconds below them
pub fn from_millis_nanos(millis: i64, nanos: u32) -> Timestamp {
    let base = from_millis(millis);
    base.checked_add_signed(Duration::nanoseconds(i64::from(nanos)))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_round_trips_through_millis() {
        let ts = now();
        assert_eq!(from_millis(to_millis(&ts)), ts);
        assert_eq!(sub_millis_nanos(&ts), 0);
    }

    #[test]
    fn test_sub_millisecond_round_trip() {
        let ts = now() + Duration::microseconds(123) + Duration::nanoseconds(45);
        assert_eq!(sub_millis_nanos(&ts), 123_045);
        assert_eq!(from_millis_nanos(to_millis(&ts), sub_millis_nanos(&ts)), ts);

        let before_epoch = from_millis(-1_500) + Duration::nanoseconds(7);
        assert_eq!(
            from_millis_nanos(to_millis(&before_epoch), sub_millis_nanos(&before_epoch)),
            before_epoch
        );
    }

    #[test]
    fn test_out_of_range_millis() {
        assert_eq!(from_millis(i64::MAX), Timestamp::default());
    }
}
