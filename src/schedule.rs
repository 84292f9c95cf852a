//! Pure derivations over the fixed daily prayer schedule.
//!
//! The frontend used to duplicate this logic in several views; it lives here
//! once so "which prayer is next" and "is it prayer time right now" are
//! unit-testable without a UI or a clock.

use crate::store::PrayerTime;
use chrono::{NaiveTime, Timelike};

/// Half-width of the "currently prayer time" window, in seconds.
const PRAYER_WINDOW_SECS: i64 = 15 * 60;

/// Parse a stored prayer time, accepting 24h ("05:30") and 12h ("5:30 AM")
/// display formats.
pub fn parse_prayer_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%I:%M %p"))
        .ok()
}

/// Find the next prayer after `now`.
///
/// Returns the earliest entry whose time is strictly greater than `now`;
/// exact equality counts as already passed, so at 19:45 sharp the answer
/// wraps to the first entry of the next day. Entries with unparseable times
/// are skipped. `None` only when no entry parses at all.
pub fn next_prayer<'a>(times: &'a [PrayerTime], now: NaiveTime) -> Option<&'a PrayerTime> {
    let mut parsed: Vec<(&PrayerTime, NaiveTime)> = times
        .iter()
        .filter_map(|entry| parse_prayer_time(&entry.time).map(|t| (entry, t)))
        .collect();
    parsed.sort_by_key(|(_, t)| *t);

    parsed
        .iter()
        .find(|(_, t)| *t > now)
        .or_else(|| parsed.first())
        .map(|(entry, _)| *entry)
}

/// True when `now` falls within ±15 minutes of any scheduled prayer.
///
/// The boundary is inclusive at exactly 15 minutes; one second beyond is
/// outside the window.
pub fn is_prayer_window(times: &[PrayerTime], now: NaiveTime) -> bool {
    let now_secs = i64::from(now.num_seconds_from_midnight());
    times
        .iter()
        .filter_map(|entry| parse_prayer_time(&entry.time))
        .any(|t| {
            let diff = (now_secs - i64::from(t.num_seconds_from_midnight())).abs();
            diff <= PRAYER_WINDOW_SECS
        })
}
