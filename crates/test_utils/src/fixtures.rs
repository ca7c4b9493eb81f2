//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the enrollment
//! system. These fixtures are designed to be consistent and predictable for
//! unit tests.

use chrono::NaiveDate;
use core_kernel::{FixedClock, PaymentId, StudentId};
use domain_enrollment::{PaymentDraft, PaymentMethod, StudentProfile};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Shorthand for building a calendar date in tests
///
/// # Panics
///
/// Panics if the date does not exist
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Fixture for date test data
pub struct DateFixtures;

impl DateFixtures {
    /// Standard enrollment date (Jan 1, 2024)
    pub fn enrollment_day() -> NaiveDate {
        date(2024, 1, 1)
    }

    /// Due date of a window opened on the enrollment day (Jan 31, 2024)
    pub fn due_day() -> NaiveDate {
        date(2024, 1, 31)
    }

    /// A day inside the first window (Jan 15, 2024)
    pub fn mid_window() -> NaiveDate {
        date(2024, 1, 15)
    }

    /// The first day after the due date (Feb 1, 2024)
    pub fn day_after_due() -> NaiveDate {
        date(2024, 2, 1)
    }

    /// Start of the delinquency lookback for the standard due date (Jan 1, 2024)
    pub fn lookback_start() -> NaiveDate {
        date(2024, 1, 1)
    }

    /// A day before the lookback starts (Dec 31, 2023)
    pub fn before_lookback() -> NaiveDate {
        date(2023, 12, 31)
    }

    /// Leap day, for calendar arithmetic tests
    pub fn leap_day() -> NaiveDate {
        date(2024, 2, 29)
    }
}

/// Fixture for clocks pinned to well-known dates
pub struct ClockFixtures;

impl ClockFixtures {
    /// Clock pinned to the standard enrollment day
    pub fn enrollment_day() -> FixedClock {
        FixedClock(DateFixtures::enrollment_day())
    }

    /// Clock pinned to an arbitrary date
    pub fn on(day: NaiveDate) -> FixedClock {
        FixedClock(day)
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    /// A student id that is never assigned by the stores in tests
    pub fn missing_student_id() -> StudentId {
        StudentId::new(999_999)
    }

    /// A payment id that is never assigned by the stores in tests
    pub fn missing_payment_id() -> PaymentId {
        PaymentId::new(999_999)
    }
}

/// Fixture for student profiles
pub struct ProfileFixtures;

impl ProfileFixtures {
    /// A complete profile
    pub fn complete() -> StudentProfile {
        StudentProfile::new("Maria Silva")
            .with_address("Rua das Flores, 120")
            .with_city("Fortaleza")
            .with_state("CE")
            .with_phone("+55 85 99999-0000")
    }

    /// A profile with only the required name
    pub fn minimal() -> StudentProfile {
        StudentProfile::new("João Souza")
    }

    /// A profile in another state, for filter tests
    pub fn in_state(name: &str, state: &str) -> StudentProfile {
        StudentProfile::new(name).with_state(state)
    }
}

/// Fixture for payment amounts
pub struct AmountFixtures;

impl AmountFixtures {
    /// Standard monthly fee
    pub fn monthly_fee() -> Decimal {
        dec!(150.00)
    }

    /// A free payment, which is still a valid payment
    pub fn zero() -> Decimal {
        Decimal::ZERO
    }

    /// Negative amount, always rejected
    pub fn negative() -> Decimal {
        dec!(-10.00)
    }
}

/// Fixture for raw payment drafts
pub struct DraftFixtures;

impl DraftFixtures {
    /// A cash payment of the monthly fee on the given date
    pub fn cash_on(day: NaiveDate) -> PaymentDraft {
        PaymentDraft {
            date: Some(day),
            amount: Some(AmountFixtures::monthly_fee()),
            method: Some(PaymentMethod::Cash.to_string()),
        }
    }

    /// A card payment of the monthly fee dated today
    pub fn card_today() -> PaymentDraft {
        PaymentDraft {
            date: None,
            amount: Some(AmountFixtures::monthly_fee()),
            method: Some(PaymentMethod::Card.to_string()),
        }
    }
}
