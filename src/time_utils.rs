// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with milliseconds and a `Z` suffix.
///
/// Fixed width, so lexicographic order matches chronological order.
pub fn format_utc_rfc3339_millis(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp for a record that must sort after `previous`.
///
/// Returns `now`, unless `now` would format to the same millisecond as
/// `previous` (or earlier), in which case it returns one millisecond past
/// `previous`. An unparsable `previous` is ignored.
pub fn next_created_at(now: DateTime<Utc>, previous: Option<&str>) -> DateTime<Utc> {
    previous
        .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
        .map(|p| p.with_timezone(&Utc) + Duration::milliseconds(1))
        .filter(|floor| *floor > now)
        .unwrap_or(now)
}

/// Short US-style date used in plan names, e.g. `3/7/2026`.
pub fn format_plan_date(date: DateTime<Utc>) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
