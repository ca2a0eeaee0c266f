//! Timeline bucket boundaries (SPEC_FULL §4.4 "Aggregation into list
//! view"): daily for windows ≤35 days, weekly for ≤150 days, otherwise
//! monthly on the first of the month. The first/last bucket is widened to
//! the true window edge rather than truncated (DESIGN.md Open Question #3).

use crate::model::TimelineGranularity;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

pub fn granularity_for_window(from: DateTime<Utc>, to: DateTime<Utc>) -> TimelineGranularity {
    let days = (to - from).num_days();
    if days <= 35 {
        TimelineGranularity::Daily
    } else if days <= 150 {
        TimelineGranularity::Weekly
    } else {
        TimelineGranularity::Monthly
    }
}

/// Bucket start boundaries spanning `[from, to]`, widened so the first
/// boundary is never later than `from` and the walk never needs a
/// separate "trailing partial bucket" case.
pub fn bucket_boundaries(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    granularity: TimelineGranularity,
) -> Vec<DateTime<Utc>> {
    let mut boundaries = Vec::new();
    let mut cursor = match granularity {
        TimelineGranularity::Daily | TimelineGranularity::Weekly => from,
        TimelineGranularity::Monthly => Utc
            .with_ymd_and_hms(from.year(), from.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(from),
    };

    while cursor < to {
        boundaries.push(cursor);
        cursor = match granularity {
            TimelineGranularity::Daily => cursor + Duration::days(1),
            TimelineGranularity::Weekly => cursor + Duration::days(7),
            TimelineGranularity::Monthly => next_month(cursor),
        };
    }
    if boundaries.is_empty() {
        boundaries.push(from);
    }
    boundaries
}

fn next_month(t: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if t.month() == 12 { (t.year() + 1, 1) } else { (t.year(), t.month() + 1) };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single().unwrap_or(t)
}

/// Finds the bucket start a timestamp belongs to (the last boundary not
/// after it), widening anything before the first boundary into it.
pub fn bucket_for(boundaries: &[DateTime<Utc>], ts: DateTime<Utc>) -> DateTime<Utc> {
    boundaries
        .iter()
        .rev()
        .find(|b| **b <= ts)
        .copied()
        .unwrap_or_else(|| boundaries[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(days: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::days(days)
    }

    #[test]
    fn short_window_is_daily() {
        assert_eq!(granularity_for_window(t(0), t(10)), TimelineGranularity::Daily);
    }

    #[test]
    fn medium_window_is_weekly() {
        assert_eq!(granularity_for_window(t(0), t(100)), TimelineGranularity::Weekly);
    }

    #[test]
    fn long_window_is_monthly() {
        assert_eq!(granularity_for_window(t(0), t(400)), TimelineGranularity::Monthly);
    }

    #[test]
    fn timestamp_before_first_boundary_widens_into_it() {
        let boundaries = bucket_boundaries(t(0), t(10), TimelineGranularity::Daily);
        assert_eq!(bucket_for(&boundaries, t(0) - Duration::hours(5)), boundaries[0]);
    }
}
