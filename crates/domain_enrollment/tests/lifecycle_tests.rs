//! Lifecycle Rules Tests
//!
//! Scenario tests for the enrollment state machine plus property tests
//! over arbitrary lifecycle dates.

use chrono::Duration;
use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::StudentId;
use domain_enrollment::lifecycle::{self, DelinquencyOutcome};
use domain_enrollment::{LifecycleState, NewPayment, PaymentMethod};
use test_utils::*;

mod scenarios {
    use super::*;

    #[test]
    fn test_unpaid_student_is_disenrolled_after_due_date() {
        let mut student = TestStudentBuilder::new().enrolled_on(date(2024, 1, 1)).build();
        assert_dates(&student, Some(date(2024, 1, 1)), Some(date(2024, 1, 31)), None);

        let outcome = lifecycle::evaluate_delinquency(&mut student, &[], date(2024, 2, 5));

        assert_eq!(outcome, DelinquencyOutcome::Disenrolled { on: date(2024, 2, 5) });
        assert_eq!(student.disenrolled_on, Some(date(2024, 2, 5)));
        assert_inactive(&student, date(2024, 2, 5));
        assert_state(&student, date(2024, 2, 5), LifecycleState::Disenrolled);
    }

    #[test]
    fn test_recent_payment_extends_due_date() {
        let mut student = TestStudentBuilder::new().enrolled_on(date(2024, 1, 1)).build();
        let payment = TestPaymentBuilder::new()
            .for_student(student.id)
            .on(date(2024, 1, 20))
            .build();

        let outcome = lifecycle::evaluate_delinquency(&mut student, &[payment], date(2024, 2, 5));

        assert_eq!(outcome, DelinquencyOutcome::Extended { due_on: date(2024, 2, 19) });
        assert_dates(&student, Some(date(2024, 1, 1)), Some(date(2024, 2, 19)), None);
        assert_active(&student, date(2024, 2, 5));
    }

    #[test]
    fn test_payment_on_lookback_start_keeps_student_enrolled() {
        let mut student = TestStudentBuilder::new().enrolled().build();
        let before = student.clone();
        let payment = TestPaymentBuilder::new().on(DateFixtures::lookback_start()).build();

        let outcome =
            lifecycle::evaluate_delinquency(&mut student, &[payment], DateFixtures::day_after_due());

        // The payment counts, but its window ends on the current due date
        assert_eq!(outcome, DelinquencyOutcome::Unchanged);
        assert_eq!(student, before);
        assert_inactive(&student, DateFixtures::day_after_due());
    }

    #[test]
    fn test_payment_after_lookback_start_extends() {
        let mut student = TestStudentBuilder::new().enrolled().build();
        let payment = TestPaymentBuilder::new()
            .on(DateFixtures::lookback_start() + Duration::days(1))
            .build();

        let outcome =
            lifecycle::evaluate_delinquency(&mut student, &[payment], DateFixtures::day_after_due());

        assert_eq!(outcome, DelinquencyOutcome::Extended { due_on: DateFixtures::day_after_due() });
    }

    #[test]
    fn test_payment_before_lookback_does_not_count() {
        let mut student = TestStudentBuilder::new().enrolled().build();
        let payment = TestPaymentBuilder::new().on(DateFixtures::before_lookback()).build();

        let outcome =
            lifecycle::evaluate_delinquency(&mut student, &[payment], DateFixtures::day_after_due());

        assert_eq!(
            outcome,
            DelinquencyOutcome::Disenrolled { on: DateFixtures::day_after_due() }
        );
    }

    #[test]
    fn test_only_the_latest_payment_is_considered() {
        let mut student = TestStudentBuilder::new().enrolled().build();
        let old = TestPaymentBuilder::new().with_id(1).on(date(2023, 11, 1)).build();
        let recent = TestPaymentBuilder::new().with_id(2).on(date(2024, 1, 10)).build();

        let outcome =
            lifecycle::evaluate_delinquency(&mut student, &[recent, old], date(2024, 2, 3));

        assert_eq!(outcome, DelinquencyOutcome::Extended { due_on: date(2024, 2, 9) });
    }

    #[test]
    fn test_latest_payment_tie_breaks_on_amount_then_id() {
        let day = DateFixtures::mid_window();
        let small = TestPaymentBuilder::new().with_id(3).on(day).with_amount(dec!(10)).build();
        let large = TestPaymentBuilder::new().with_id(1).on(day).with_amount(dec!(20)).build();
        let twin = TestPaymentBuilder::new().with_id(2).on(day).with_amount(dec!(20)).build();

        let payments = [small, large, twin];
        let latest = lifecycle::latest_payment(&payments).unwrap();
        assert_eq!(latest.id.value(), 2);
        assert!(lifecycle::latest_payment(&[]).is_none());
    }

    #[test]
    fn test_evaluation_is_unchanged_on_due_date() {
        let mut student = TestStudentBuilder::new().enrolled().build();
        let before = student.clone();

        let outcome = lifecycle::evaluate_delinquency(&mut student, &[], DateFixtures::due_day());

        assert_eq!(outcome, DelinquencyOutcome::Unchanged);
        assert_eq!(student, before);
        // Still not active on the due date itself
        assert_state(&student, DateFixtures::due_day(), LifecycleState::Lapsed);
    }

    #[test]
    fn test_evaluation_skips_disenrolled_and_unenrolled_students() {
        let mut disenrolled = TestStudentBuilder::new()
            .enrolled()
            .disenrolled_on(DateFixtures::mid_window())
            .build();
        let mut unenrolled = TestStudentBuilder::new().build();
        let later = date(2024, 6, 1);

        assert_eq!(
            lifecycle::evaluate_delinquency(&mut disenrolled, &[], later),
            DelinquencyOutcome::Unchanged
        );
        assert_eq!(disenrolled.disenrolled_on, Some(DateFixtures::mid_window()));
        assert_eq!(
            lifecycle::evaluate_delinquency(&mut unenrolled, &[], later),
            DelinquencyOutcome::Unchanged
        );
        assert_state(&unenrolled, later, LifecycleState::Unenrolled);
    }

    #[test]
    fn test_first_payment_enrolls_student() {
        let mut student = TestStudentBuilder::new().build();
        let payment = TestPaymentBuilder::new().on(date(2024, 3, 10)).build_new();

        lifecycle::record_payment(&mut student, &payment);

        assert_dates(&student, Some(date(2024, 3, 10)), Some(date(2024, 4, 9)), None);
        assert_active(&student, date(2024, 3, 10));
    }

    #[test]
    fn test_payment_reactivates_disenrolled_student() {
        let mut student = TestStudentBuilder::new()
            .enrolled()
            .disenrolled_on(DateFixtures::day_after_due())
            .build();
        let payment = TestPaymentBuilder::new().on(date(2024, 2, 10)).build_new();

        lifecycle::record_payment(&mut student, &payment);

        assert_dates(
            &student,
            Some(DateFixtures::enrollment_day()),
            Some(date(2024, 3, 11)),
            None,
        );
    }

    #[test]
    fn test_window_crosses_leap_day() {
        let mut student = TestStudentBuilder::new().build();
        lifecycle::enroll(&mut student, date(2024, 2, 15));
        assert_eq!(student.due_on, Some(date(2024, 3, 16)));
        assert_active(&student, DateFixtures::leap_day());
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let err = NewPayment::new(StudentId::new(1), date(2024, 1, 1), dec!(-1), PaymentMethod::Cash)
            .unwrap_err();
        assert_eq!(err.field, "amount");

        let zero = NewPayment::new(
            StudentId::new(1),
            date(2024, 1, 1),
            AmountFixtures::zero(),
            PaymentMethod::Card,
        );
        assert!(zero.is_ok());
    }

    #[test]
    fn test_only_disenrolled_students_are_deletable() {
        let unenrolled = TestStudentBuilder::new().build();
        let active = TestStudentBuilder::new().enrolled().build();
        let gone = TestStudentBuilder::new()
            .enrolled()
            .disenrolled_on(DateFixtures::mid_window())
            .build();

        assert_precondition(&lifecycle::ensure_deletable(&unenrolled).unwrap_err());
        assert_precondition(&lifecycle::ensure_deletable(&active).unwrap_err());
        assert!(lifecycle::ensure_deletable(&gone).is_ok());
    }
}

mod properties {
    use super::*;

    proptest! {
        #[test]
        fn inactive_without_enrollment(student in student_strategy(), today in date_strategy()) {
            prop_assume!(student.enrolled_on.is_none());
            prop_assert!(!lifecycle::is_active(&student, today));
        }

        #[test]
        fn inactive_once_disenrolled(student in student_strategy(), today in date_strategy()) {
            prop_assume!(student.disenrolled_on.is_some());
            prop_assert!(!lifecycle::is_active(&student, today));
        }

        #[test]
        fn inactive_from_due_date_on(student in student_strategy(), offset in 0i64..120) {
            if let Some(due) = student.due_on {
                prop_assert!(!lifecycle::is_active(&student, due + Duration::days(offset)));
            }
        }

        #[test]
        fn inactive_when_window_is_empty(student in student_strategy(), today in date_strategy()) {
            if let (Some(enrolled), Some(due)) = (student.enrolled_on, student.due_on) {
                if due <= enrolled {
                    prop_assert!(!lifecycle::is_active(&student, today));
                }
            }
        }

        #[test]
        fn enroll_opens_a_fresh_window(mut student in student_strategy(), today in date_strategy()) {
            lifecycle::enroll(&mut student, today);
            prop_assert_eq!(student.enrolled_on, Some(today));
            prop_assert_eq!(student.due_on, Some(today + Duration::days(30)));
            prop_assert_eq!(student.disenrolled_on, None);
            prop_assert!(lifecycle::is_active(&student, today));
        }

        #[test]
        fn disenroll_always_deactivates(mut student in student_strategy(), today in date_strategy()) {
            lifecycle::disenroll(&mut student, today);
            prop_assert_eq!(student.disenrolled_on, Some(today));
            prop_assert!(!lifecycle::is_active(&student, today));
            prop_assert!(lifecycle::ensure_deletable(&student).is_ok());
        }

        #[test]
        fn record_payment_keeps_existing_enrollment_date(
            mut student in student_strategy(),
            paid_on in date_strategy(),
            amount in amount_strategy(),
            method in method_strategy(),
        ) {
            let original = student.enrolled_on;
            let payment = NewPayment::new(student.id, paid_on, amount, method).unwrap();

            lifecycle::record_payment(&mut student, &payment);

            prop_assert_eq!(student.enrolled_on, Some(original.unwrap_or(paid_on)));
            prop_assert_eq!(student.due_on, Some(paid_on + Duration::days(30)));
            prop_assert_eq!(student.disenrolled_on, None);
        }

        #[test]
        fn evaluation_is_a_noop_until_due(
            student in student_strategy(),
            back in 0i64..60,
        ) {
            prop_assume!(student.due_on.is_some());
            let payments = qualifying_payments(&student);
            let today = student.due_on.unwrap() - Duration::days(back);
            let mut evaluated = student.clone();

            let outcome = lifecycle::evaluate_delinquency(&mut evaluated, &payments, today);

            prop_assert_eq!(outcome, DelinquencyOutcome::Unchanged);
            prop_assert_eq!(evaluated, student);
        }

        #[test]
        fn past_due_evaluation_outcome_matches_student(
            (student, payments) in student_strategy().prop_flat_map(|s| {
                let id = s.id;
                (Just(s), payments_strategy(id, 5))
            }),
            ahead in 1i64..60,
        ) {
            prop_assume!(student.disenrolled_on.is_none());
            let Some(due) = student.due_on else { return Ok(()); };
            let today = due + Duration::days(ahead);
            let mut evaluated = student.clone();

            match lifecycle::evaluate_delinquency(&mut evaluated, &payments, today) {
                DelinquencyOutcome::Extended { due_on } => {
                    prop_assert_eq!(evaluated.due_on, Some(due_on));
                    prop_assert!(evaluated.disenrolled_on.is_none());
                }
                DelinquencyOutcome::Disenrolled { on } => {
                    prop_assert_eq!(on, today);
                    prop_assert_eq!(evaluated.due_on, student.due_on);
                }
                DelinquencyOutcome::Unchanged => {
                    // Only when the latest payment's window ends on the old due date
                    let latest = lifecycle::latest_payment(&payments);
                    prop_assert_eq!(latest.map(|p| p.date + Duration::days(30)), Some(due));
                    prop_assert_eq!(evaluated, student);
                }
            }
        }

        #[test]
        fn negative_amounts_never_validate(amount in negative_amount_strategy()) {
            let result = NewPayment::new(StudentId::new(1), date(2024, 1, 1), amount, PaymentMethod::Cash);
            prop_assert!(result.is_err());
        }

        #[test]
        fn unknown_methods_never_parse(method in invalid_method_strategy()) {
            prop_assert!(method.parse::<PaymentMethod>().is_err());
        }
    }

    /// Payments dated on and just before the due date
    fn qualifying_payments(student: &domain_enrollment::Student) -> Vec<domain_enrollment::Payment> {
        let Some(due) = student.due_on else { return Vec::new() };
        (0..3)
            .map(|i| {
                TestPaymentBuilder::new()
                    .with_id(i + 1)
                    .for_student(student.id)
                    .on(due - Duration::days(i))
                    .build()
            })
            .collect()
    }
}
