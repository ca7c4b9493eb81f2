//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data that
//! maintains domain invariants, plus `fake`-backed profile generation.

use chrono::{Duration, NaiveDate};
use core_kernel::{PaymentId, StudentId};
use domain_enrollment::{Payment, PaymentMethod, StudentProfile};
use fake::faker::address::en::{CityName, StateAbbr, StreetName};
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::TestStudentBuilder;
use crate::fixtures::date;

/// Strategy for generating dates between 2000 and roughly 2049
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..18_000i64).prop_map(|offset| date(2000, 1, 1) + Duration::days(offset))
}

/// Strategy for generating day offsets within +/- 120 days
pub fn day_offset_strategy() -> impl Strategy<Value = i64> {
    -120i64..120i64
}

/// Strategy for generating valid (non-negative) amounts with two decimals
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating negative amounts
pub fn negative_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy for generating payment methods
pub fn method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![Just(PaymentMethod::Cash), Just(PaymentMethod::Card)]
}

/// Strategy for generating method strings that are never accepted
pub fn invalid_method_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,10}".prop_filter("must not be a known method", |s| {
        s != "cash" && s != "card"
    })
}

/// Strategy for generating optional lifecycle dates in any combination
pub fn lifecycle_dates_strategy(
) -> impl Strategy<Value = (Option<NaiveDate>, Option<NaiveDate>, Option<NaiveDate>)> {
    (
        proptest::option::of(date_strategy()),
        proptest::option::of(date_strategy()),
        proptest::option::of(date_strategy()),
    )
}

/// Strategy for generating students with arbitrary lifecycle dates
pub fn student_strategy() -> impl Strategy<Value = domain_enrollment::Student> {
    (1i64..1_000i64, lifecycle_dates_strategy()).prop_map(|(id, (enrolled, due, disenrolled))| {
        TestStudentBuilder::new()
            .with_id(id)
            .with_dates(enrolled, due, disenrolled)
            .build()
    })
}

/// Strategy for generating payment histories of one student
pub fn payments_strategy(
    student_id: StudentId,
    max_len: usize,
) -> impl Strategy<Value = Vec<Payment>> {
    proptest::collection::vec(
        (date_strategy(), amount_strategy(), method_strategy()),
        0..max_len,
    )
    .prop_map(move |entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (date, amount, method))| Payment {
                id: PaymentId::new(i as i64 + 1),
                student_id,
                date,
                amount,
                method,
            })
            .collect()
    })
}

/// Generates a complete profile with realistic random values
pub fn fake_profile() -> StudentProfile {
    let name: String = Name().fake();
    let street: String = StreetName().fake();
    let city: String = CityName().fake();
    let state: String = StateAbbr().fake();
    let phone: String = PhoneNumber().fake();
    StudentProfile::new(name)
        .with_address(format!("{} {}", (1u32..999).fake::<u32>(), street))
        .with_city(city)
        .with_state(state)
        .with_phone(phone)
}
