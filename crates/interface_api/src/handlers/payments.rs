//! Payment handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use core_kernel::PaymentId;

use crate::dto::payment::*;
use crate::handlers::{ApiJson, ApiPath};
use crate::{error::ApiError, AppState};

/// Records a payment for the student named in the body
pub async fn create_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let student_id = request.student_id()?;
    let payment = state
        .service
        .record_payment(student_id, request.into_draft())
        .await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// Lists all payments
pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state.service.list_payments().await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Gets a payment by ID
pub async fn get_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state.service.get_payment(PaymentId::new(id)).await?;
    Ok(Json(payment.into()))
}

/// Updates date, amount or method of a payment
pub async fn update_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state
        .service
        .update_payment(PaymentId::new(id), request.into())
        .await?;
    Ok(Json(payment.into()))
}

/// Deletes a payment
pub async fn delete_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_payment(PaymentId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
