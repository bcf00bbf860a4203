//! Calendar/timestamp conversions and date-input normalisation.
//!
//! Every date exchanged with the store or the user is a string in the
//! canonical `YYYY-MM-DD HH:MM:SS` format ([`DATE_FORMAT`]). Timestamps are
//! epoch seconds in the local timezone. All functions here are pure; the
//! conversation layer calls them before any store query is issued.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;

/// The sole textual date representation used across the system.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length of `YYYY-MM-DD HH:MM:SS`.
pub const DATE_LEN_WITH_TIME: usize = 19;
/// Length of `YYYY-MM-DD`.
pub const DATE_LEN_WITHOUT_TIME: usize = 10;
/// Two date-only stamps separated by one space.
pub const DUAL_DATE_LEN_WITHOUT_TIME: usize = DATE_LEN_WITHOUT_TIME * 2 + 1;
/// Two full datetime stamps separated by one space.
pub const DUAL_DATE_LEN_WITH_TIME: usize = DATE_LEN_WITH_TIME * 2 + 1;

// ---------------------------------------------------------------------------
// DateError
// ---------------------------------------------------------------------------

/// Errors from date parsing and conversion.
#[derive(Debug, Clone, Error)]
pub enum DateError {
    /// The input does not match the canonical format.
    #[error("malformed date {0:?}: expected `YYYY-MM-DD HH:MM:SS`")]
    Malformed(String),

    /// A timestamp that cannot be represented as a local datetime.
    #[error("timestamp {0} is out of the representable range")]
    OutOfRange(i64),
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Current local time in canonical format.
pub fn now_date() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Parse a canonical date string into epoch seconds (local timezone).
pub fn date_to_timestamp(date: &str) -> Result<i64, DateError> {
    let naive = NaiveDateTime::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| DateError::Malformed(date.to_string()))?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| DateError::Malformed(date.to_string()))
}

/// Render epoch seconds back into the canonical format.
///
/// Exact inverse of [`date_to_timestamp`] for any valid canonical string.
pub fn timestamp_to_date(timestamp: i64) -> Result<String, DateError> {
    Local
        .timestamp_opt(timestamp, 0)
        .earliest()
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .ok_or(DateError::OutOfRange(timestamp))
}

/// Midnight of `days` days before today, canonical format.
///
/// `days = 0` is today's midnight; negative values go forward.
pub fn days_ago(days: i64) -> String {
    days_ago_from(days, Local::now().date_naive())
}

/// Midnight of `days` days before `anchor`, canonical format.
pub fn days_ago_from(days: i64, anchor: NaiveDate) -> String {
    (anchor - Duration::days(days))
        .format("%Y-%m-%d 00:00:00")
        .to_string()
}

/// Epoch seconds of the midnight following the day of `day_start`.
///
/// Used as the exclusive upper bound of a whole-day range; computed through
/// the calendar rather than `+86_400` so DST transitions stay correct.
pub fn next_day_timestamp(day_start: &str) -> Result<i64, DateError> {
    let naive = NaiveDateTime::parse_from_str(day_start, DATE_FORMAT)
        .map_err(|_| DateError::Malformed(day_start.to_string()))?;
    let next = days_ago_from(-1, naive.date());
    date_to_timestamp(&next)
}

// ---------------------------------------------------------------------------
// User-input normalisation
// ---------------------------------------------------------------------------

/// Normalise a single date input from the user.
///
/// * 10 characters (`YYYY-MM-DD`) — widened to midnight, `is_exact = false`
///   ("match the whole day").
/// * 19 characters (`YYYY-MM-DD HH:MM:SS`) — kept as-is, `is_exact = true`.
/// * Anything else, or content that does not parse — `None`. The caller
///   issues no query for `None`; partial input is dropped silently instead
///   of crashing the conversation.
pub fn normalize_date_input(raw: &str) -> Option<(String, bool)> {
    match raw.len() {
        DATE_LEN_WITHOUT_TIME => {
            let widened = format!("{raw} 00:00:00");
            date_to_timestamp(&widened).ok()?;
            Some((widened, false))
        }
        DATE_LEN_WITH_TIME => {
            date_to_timestamp(raw).ok()?;
            Some((raw.to_string(), true))
        }
        _ => None,
    }
}

/// Split a dual-date input into two canonical datetime strings.
///
/// Accepts either two date-only stamps (widened to `00:00:00` / `23:59:59`
/// so a date-only pair covers both days fully) or two full datetime stamps.
/// Any other length, or a half that does not parse, yields `None`.
pub fn split_dual_date_input(raw: &str) -> Option<(String, String)> {
    // Canonical dates are ASCII; anything else would split mid-character
    // below.
    if !raw.is_ascii() {
        return None;
    }

    let widened = match raw.len() {
        DUAL_DATE_LEN_WITHOUT_TIME => format!(
            "{} 00:00:00 {} 23:59:59",
            &raw[..DATE_LEN_WITHOUT_TIME],
            &raw[DATE_LEN_WITHOUT_TIME + 1..]
        ),
        DUAL_DATE_LEN_WITH_TIME => raw.to_string(),
        _ => return None,
    };

    let first = widened[..DATE_LEN_WITH_TIME].to_string();
    let second = widened[DATE_LEN_WITH_TIME + 1..].to_string();

    date_to_timestamp(&first).ok()?;
    date_to_timestamp(&second).ok()?;
    Some((first, second))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- round trips ---

    #[test]
    fn date_round_trips_through_timestamp() {
        let date = "2024-03-15 12:34:56";
        let ts = date_to_timestamp(date).unwrap();
        assert_eq!(timestamp_to_date(ts).unwrap(), date);
    }

    #[test]
    fn midnight_round_trips() {
        let date = "2024-01-01 00:00:00";
        let ts = date_to_timestamp(date).unwrap();
        assert_eq!(timestamp_to_date(ts).unwrap(), date);
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(matches!(
            date_to_timestamp("not a date"),
            Err(DateError::Malformed(_))
        ));
        assert!(matches!(
            date_to_timestamp("2024-13-40 99:99:99"),
            Err(DateError::Malformed(_))
        ));
        // Date-only input is not canonical either.
        assert!(date_to_timestamp("2024-03-15").is_err());
    }

    // --- days_ago ---

    #[test]
    fn days_ago_offsets_by_whole_days() {
        let anchor = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(days_ago_from(0, anchor), "2024-03-15 00:00:00");
        assert_eq!(days_ago_from(1, anchor), "2024-03-14 00:00:00");
        assert_eq!(days_ago_from(7, anchor), "2024-03-08 00:00:00");
        assert_eq!(days_ago_from(-1, anchor), "2024-03-16 00:00:00");
    }

    #[test]
    fn days_ago_timestamps_differ_by_86400_without_dst() {
        // Mid-January in any timezone without a DST switch in between.
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let today = date_to_timestamp(&days_ago_from(0, anchor)).unwrap();
        let three_ago = date_to_timestamp(&days_ago_from(3, anchor)).unwrap();
        assert_eq!(today - three_ago, 3 * 86_400);
    }

    #[test]
    fn next_day_timestamp_is_following_midnight() {
        let start = "2024-03-15 00:00:00";
        let next = next_day_timestamp(start).unwrap();
        assert_eq!(
            next,
            date_to_timestamp("2024-03-16 00:00:00").unwrap()
        );
    }

    // --- normalize_date_input ---

    #[test]
    fn date_only_input_widens_to_midnight() {
        let (date, is_exact) = normalize_date_input("2024-03-15").unwrap();
        assert_eq!(date, "2024-03-15 00:00:00");
        assert!(!is_exact);
    }

    #[test]
    fn full_datetime_input_is_exact() {
        let (date, is_exact) = normalize_date_input("2024-03-15 08:30:00").unwrap();
        assert_eq!(date, "2024-03-15 08:30:00");
        assert!(is_exact);
    }

    #[test]
    fn other_lengths_yield_no_query() {
        assert!(normalize_date_input("").is_none());
        assert!(normalize_date_input("2024-03").is_none());
        assert!(normalize_date_input("2024-03-15 08:30").is_none());
        assert!(normalize_date_input("2024-03-15 08:30:00 extra").is_none());
    }

    #[test]
    fn right_length_wrong_content_yields_no_query() {
        assert!(normalize_date_input("garbagegar").is_none());
        assert!(normalize_date_input("2024-99-99 08:30:00").is_none());
    }

    // --- split_dual_date_input ---

    #[test]
    fn date_only_pair_widens_to_full_days() {
        let (d1, d2) = split_dual_date_input("2024-01-01 2024-01-05").unwrap();
        assert_eq!(d1, "2024-01-01 00:00:00");
        assert_eq!(d2, "2024-01-05 23:59:59");
    }

    #[test]
    fn full_pair_splits_directly() {
        let (d1, d2) =
            split_dual_date_input("2024-01-01 08:00:00 2024-01-05 20:00:00").unwrap();
        assert_eq!(d1, "2024-01-01 08:00:00");
        assert_eq!(d2, "2024-01-05 20:00:00");
    }

    #[test]
    fn dual_other_lengths_yield_no_query() {
        assert!(split_dual_date_input("2024-01-01").is_none());
        assert!(split_dual_date_input("2024-01-01 2024-01-05 08:00:00").is_none());
        assert!(split_dual_date_input("").is_none());
    }

    #[test]
    fn dual_wrong_content_yields_no_query() {
        assert!(split_dual_date_input("aaaa-bb-cc dddd-ee-ff").is_none());
    }

    #[test]
    fn dual_non_ascii_input_is_dropped_without_panicking() {
        // Exactly 21 bytes of multibyte text — must not be sliced
        // mid-character.
        let input = "дддддддддabc";
        assert_eq!(input.len(), 21);
        assert!(split_dual_date_input(input).is_none());
    }
}
