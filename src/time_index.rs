//! Anchor run selection and per-offset forecast requests.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::Serialize;

/// One (issue-time, lead-hour) pair to fetch for a relative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ForecastRequest {
    /// Hours relative to the anchor run
    pub offset: i32,
    /// Model run that will be fetched
    pub issue_time: DateTime<Utc>,
    /// Forecast hour within that run, never negative
    pub lead_hours: u32,
}

impl ForecastRequest {
    /// The instant this snapshot is valid for
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.issue_time + Duration::hours(self.lead_hours as i64)
    }
}

/// Latest model run expected to be fully published at `now`.
///
/// `now - latency_hours` floored to a multiple of `cycle_hours` within its
/// UTC day. `cycle_hours` must divide 24.
pub fn anchor_time(now: DateTime<Utc>, cycle_hours: u32, latency_hours: u32) -> DateTime<Utc> {
    let available = now - Duration::hours(latency_hours as i64);
    let cycle = cycle_hours.max(1);
    let run_hour = (available.hour() / cycle) * cycle;
    let naive = available
        .date_naive()
        .and_hms_opt(run_hour, 0, 0)
        .unwrap_or_else(|| available.naive_utc());
    Utc.from_utc_datetime(&naive)
}

/// Whether `time` sits exactly on a model cycle boundary.
pub fn is_cycle_aligned(time: DateTime<Utc>, cycle_hours: u32) -> bool {
    cycle_hours > 0
        && time.hour() % cycle_hours == 0
        && time.minute() == 0
        && time.second() == 0
        && time.nanosecond() == 0
}

/// Requests for each offset, in the order given.
///
/// Past offsets are served by an earlier run's analysis (lead 0) instead of a
/// negative lead time.
pub fn forecast_requests(anchor: DateTime<Utc>, offsets: &[i32]) -> Vec<ForecastRequest> {
    offsets
        .iter()
        .map(|&offset| forecast_request(anchor, offset))
        .collect()
}

pub fn forecast_request(anchor: DateTime<Utc>, offset: i32) -> ForecastRequest {
    if offset >= 0 {
        ForecastRequest {
            offset,
            issue_time: anchor,
            lead_hours: offset as u32,
        }
    } else {
        ForecastRequest {
            offset,
            issue_time: anchor + Duration::hours(offset as i64),
            lead_hours: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_request_rules() {
        let anchor = utc(2025, 1, 10, 12, 0);

        let now = forecast_request(anchor, 0);
        assert_eq!(now.issue_time, anchor);
        assert_eq!(now.lead_hours, 0);

        let past = forecast_request(anchor, -36);
        assert_eq!(past.issue_time, utc(2025, 1, 9, 0, 0));
        assert_eq!(past.lead_hours, 0);

        let future = forecast_request(anchor, 24);
        assert_eq!(future.issue_time, anchor);
        assert_eq!(future.lead_hours, 24);
    }

    #[test]
    fn test_valid_time_matches_offset() {
        let anchor = utc(2025, 1, 10, 12, 0);
        for offset in [-48, -12, 0, 6, 48] {
            let request = forecast_request(anchor, offset);
            assert_eq!(request.valid_time(), anchor + Duration::hours(offset as i64));
        }
    }

    #[test]
    fn test_requests_preserve_order() {
        let anchor = utc(2025, 1, 10, 12, 0);
        let offsets = [-48, -36, -24, -12, 0, 12, 24, 36, 48];
        let requests = forecast_requests(anchor, &offsets);
        let got: Vec<i32> = requests.iter().map(|r| r.offset).collect();
        assert_eq!(got, offsets.to_vec());
    }

    #[test]
    fn test_anchor_time_snaps_to_cycle() {
        // 10:30 - 7h = 03:30 -> 00Z run
        assert_eq!(anchor_time(utc(2025, 1, 10, 10, 30), 6, 7), utc(2025, 1, 10, 0, 0));
        // 13:00 - 7h = 06:00 -> 06Z run
        assert_eq!(anchor_time(utc(2025, 1, 10, 13, 0), 6, 7), utc(2025, 1, 10, 6, 0));
        // 02:00 - 7h crosses midnight -> previous day 18Z
        assert_eq!(anchor_time(utc(2025, 1, 10, 2, 0), 6, 7), utc(2025, 1, 9, 18, 0));
    }

    #[test]
    fn test_anchor_time_invariants() {
        let mut now = utc(2025, 3, 1, 0, 0);
        for _ in 0..96 {
            let anchor = anchor_time(now, 6, 7);
            assert!(anchor <= now - Duration::hours(7));
            assert!(is_cycle_aligned(anchor, 6));
            now += Duration::minutes(17);
        }
    }
}
