//! Payment DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::StudentId;
use domain_enrollment::{Payment, PaymentDraft, PaymentMethod, PaymentPatch, ValidationError};

/// Body of `POST /payments` and `POST /students/:id/payments`
///
/// `student_id` is read from the body only on `/payments`.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentRequest {
    pub student_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub method: Option<String>,
}

impl CreatePaymentRequest {
    /// The owning student named in the body
    pub fn student_id(&self) -> Result<StudentId, ValidationError> {
        self.student_id
            .map(StudentId::new)
            .ok_or_else(|| ValidationError::required("student_id"))
    }

    pub fn into_draft(self) -> PaymentDraft {
        PaymentDraft {
            date: self.date,
            amount: self.amount,
            method: self.method,
        }
    }
}

/// Body of `PUT /payments/:id`; a `student_id` in the body is ignored
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaymentRequest {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub method: Option<String>,
}

impl From<UpdatePaymentRequest> for PaymentPatch {
    fn from(req: UpdatePaymentRequest) -> Self {
        PaymentPatch {
            date: req.date,
            amount: req.amount,
            method: req.method,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.value(),
            student_id: payment.student_id.value(),
            date: payment.date,
            amount: payment.amount,
            method: payment.method,
        }
    }
}
