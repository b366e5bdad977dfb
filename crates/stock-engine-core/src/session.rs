use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Asia::Kolkata;
use serde::{Deserialize, Serialize};

/// NSE trading session classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    /// Pre-open auction: 9:00 - 9:15 IST
    PreOpen,
    /// Regular market hours: 9:15 - 15:30 IST
    Regular,
}

impl Session {
    /// Classify a UTC timestamp into an NSE trading session.
    /// Returns `None` outside market hours and on weekends.
    pub fn classify(timestamp: &DateTime<Utc>) -> Option<Self> {
        let ist = timestamp.with_timezone(&Kolkata);
        if matches!(ist.weekday(), Weekday::Sat | Weekday::Sun) {
            return None;
        }

        let total_minutes = ist.hour() * 60 + ist.minute();

        // Pre-open: 9:00 (540) to 9:14 (554)
        // Regular: 9:15 (555) to 15:29 (929)
        match total_minutes {
            540..555 => Some(Session::PreOpen),
            555..930 => Some(Session::Regular),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    /// IST is UTC+5:30 year-round (no DST).
    fn utc_from_ist(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap();
        let utc_naive = naive - chrono::Duration::hours(5) - chrono::Duration::minutes(30);
        Utc.from_utc_datetime(&utc_naive)
    }

    #[test]
    fn classify_preopen_start() {
        // Wednesday 9:00 IST = PreOpen
        let ts = utc_from_ist(2025, 1, 15, 9, 0);
        assert_eq!(Session::classify(&ts), Some(Session::PreOpen));
    }

    #[test]
    fn classify_preopen_end() {
        // 9:14 IST = PreOpen
        let ts = utc_from_ist(2025, 1, 15, 9, 14);
        assert_eq!(Session::classify(&ts), Some(Session::PreOpen));
    }

    #[test]
    fn classify_regular_start() {
        // 9:15 IST = Regular
        let ts = utc_from_ist(2025, 1, 15, 9, 15);
        assert_eq!(Session::classify(&ts), Some(Session::Regular));
    }

    #[test]
    fn classify_morning_alert_time() {
        // 9:25 IST, when the morning report tells the reader to act
        let ts = utc_from_ist(2025, 1, 15, 9, 25);
        assert_eq!(Session::classify(&ts), Some(Session::Regular));
    }

    #[test]
    fn classify_regular_end() {
        // 15:29 IST = Regular
        let ts = utc_from_ist(2025, 1, 15, 15, 29);
        assert_eq!(Session::classify(&ts), Some(Session::Regular));
    }

    #[test]
    fn classify_outside_sessions() {
        // 15:30 IST = closed
        let ts = utc_from_ist(2025, 1, 15, 15, 30);
        assert_eq!(Session::classify(&ts), None);

        // 8:59 IST = closed
        let ts = utc_from_ist(2025, 1, 15, 8, 59);
        assert_eq!(Session::classify(&ts), None);
    }

    #[test]
    fn classify_weekend_closed() {
        // Saturday 10:00 IST during what would be regular hours
        let ts = utc_from_ist(2025, 1, 18, 10, 0);
        assert_eq!(Session::classify(&ts), None);
    }
}
