//! Payment records
//!
//! Payments belong to exactly one student. Amount and method are validated
//! when a payment is constructed, when it is patched, and when it is loaded
//! back from a store.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{PaymentId, StudentId};

use crate::error::ValidationError;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash at the front desk
    Cash,
    /// Debit or credit card
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Cash, PaymentMethod::Card];

    /// Returns the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ValidationError::new("method", "must be one of: cash, card"))
    }
}

/// Cents are the smallest unit a payment can carry
pub const AMOUNT_SCALE: u32 = 2;

/// Exclusive upper bound, matching the `NUMERIC(12,2)` column
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Rejects negative amounts, sub-cent precision, and amounts of 10^10 or more
pub fn validate_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::new(
            "amount",
            "must be greater than or equal to 0",
        ));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(ValidationError::new(
            "amount",
            "must have at most 2 decimal places",
        ));
    }
    if amount >= AMOUNT_LIMIT {
        return Err(ValidationError::new(
            "amount",
            "must be less than 10000000000",
        ));
    }
    Ok(())
}

/// A validated payment that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
}

impl NewPayment {
    /// Creates a payment, rejecting negative amounts
    pub fn new(
        student_id: StudentId,
        date: NaiveDate,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Self, ValidationError> {
        validate_amount(amount)?;
        Ok(Self {
            student_id,
            date,
            amount,
            method,
        })
    }
}

/// Raw payment input as received from a caller
///
/// The owning student is never part of the draft; it is supplied by the
/// caller that attaches the payment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDraft {
    /// Payment date, defaults to today
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub method: Option<String>,
}

impl PaymentDraft {
    /// Validates the draft into a payment for `student_id`
    pub fn into_new_payment(
        self,
        student_id: StudentId,
        today: NaiveDate,
    ) -> Result<NewPayment, ValidationError> {
        let amount = self.amount.ok_or_else(|| ValidationError::required("amount"))?;
        let method: PaymentMethod = self
            .method
            .ok_or_else(|| ValidationError::required("method"))?
            .parse()?;
        NewPayment::new(student_id, self.date.unwrap_or(today), amount, method)
    }
}

/// A persisted payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Owning student, immutable after creation
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
}

impl Payment {
    /// Materializes a new payment under its assigned id
    pub fn from_new(id: PaymentId, new: NewPayment) -> Self {
        Self {
            id,
            student_id: new.student_id,
            date: new.date,
            amount: new.amount,
            method: new.method,
        }
    }

    /// Re-checks field constraints on a payment loaded from storage
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_amount(self.amount)
    }
}

/// Partial update of a payment
///
/// The owning student cannot be changed. Applying a patch never touches
/// the student's lifecycle dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentPatch {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub method: Option<String>,
}

impl PaymentPatch {
    /// Validates every present field, then applies them all
    pub fn apply(&self, payment: &mut Payment) -> Result<(), ValidationError> {
        let method = self
            .method
            .as_deref()
            .map(PaymentMethod::from_str)
            .transpose()?;
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }

        if let Some(date) = self.date {
            payment.date = date;
        }
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(method) = method {
            payment.method = method;
        }
        Ok(())
    }
}
