//! Unit tests for the Temporal module
//!
//! Tests cover Timezone parsing and serialization, clocks, and the
//! saturating day arithmetic used by the enrollment rules.

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{add_days, sub_days, Clock, FixedClock, SystemClock, TemporalError, Timezone};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod timezone {
    use super::*;

    #[test]
    fn test_default_is_utc() {
        assert_eq!(Timezone::default().name(), "UTC");
    }

    #[test]
    fn test_parse_valid_zone() {
        let tz: Timezone = "America/Sao_Paulo".parse().unwrap();
        assert_eq!(tz.name(), "America/Sao_Paulo");
    }

    #[test]
    fn test_parse_invalid_zone() {
        let result = "Mars/Olympus_Mons".parse::<Timezone>();
        assert_eq!(
            result,
            Err(TemporalError::InvalidTimezone("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn test_serde_round_trip_uses_zone_name() {
        let tz: Timezone = "Europe/Lisbon".parse().unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/Lisbon\"");
        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }

    #[test]
    fn test_date_of_ahead_of_utc() {
        let tz: Timezone = "Asia/Tokyo".parse().unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 1, 31, 20, 0, 0).unwrap();
        assert_eq!(tz.date_of(instant), date(2024, 2, 1));
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_system_clock_matches_utc_today_in_utc_zone() {
        let clock = SystemClock::new(Timezone::default());
        let before = Utc::now().date_naive();
        let today = clock.today();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock(date(2024, 2, 29));
        assert_eq!(clock.today(), clock.today());
    }
}

mod day_arithmetic {
    use super::*;

    #[test]
    fn test_thirty_days_across_month_end() {
        assert_eq!(add_days(date(2024, 1, 1), 30), date(2024, 1, 31));
        assert_eq!(add_days(date(2024, 1, 20), 30), date(2024, 2, 19));
        assert_eq!(sub_days(date(2024, 1, 31), 30), date(2024, 1, 1));
    }

    #[test]
    fn test_leap_year() {
        assert_eq!(add_days(date(2024, 2, 15), 30), date(2024, 3, 16));
        assert_eq!(add_days(date(2023, 2, 15), 30), date(2023, 3, 17));
    }
}

proptest! {
    #[test]
    fn add_then_sub_is_identity(days_from_epoch in 0i64..100_000, offset in 0u64..1000) {
        let start = date(1970, 1, 1) + chrono::Duration::days(days_from_epoch);
        prop_assert_eq!(sub_days(add_days(start, offset), offset), start);
    }
}
