// src/handlers/casual.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::casual::{
        CasualPayment, CasualPaymentDeduction, CasualPaymentStatus, PaymentFrequency,
    },
    models::payroll::PaymentMethod,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCasualPaymentPayload {
    pub employee_id: Uuid,

    #[schema(example = "daily")]
    pub payment_frequency: PaymentFrequency,

    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,

    /// Obrigatório quando nenhum agendamento é informado
    #[schema(example = "8.50")]
    pub total_hours_worked: Option<Decimal>,

    /// Ausente = tarifa resolvida pela estrutura do funcionário
    #[schema(example = "500.00")]
    pub hourly_rate: Option<Decimal>,

    /// Agendamentos concluídos cujas horas compõem o pagamento
    #[serde(default)]
    pub work_assignment_ids: Vec<Uuid>,

    #[serde(default)]
    pub notes: String,
}

// POST /api/casual-payments
#[utoipa::path(
    post,
    path = "/api/casual-payments",
    tag = "CasualPayments",
    request_body = CreateCasualPaymentPayload,
    responses(
        (status = 201, description = "Pagamento avulso criado e calculado", body = CasualPayment),
        (status = 422, description = "Horas ou tarifa inválidas")
    )
)]
pub async fn create_casual_payment(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCasualPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let payment = app_state
        .casual_service
        .create(
            payload.employee_id,
            payload.payment_frequency,
            payload.period_start_date,
            payload.period_end_date,
            payload.total_hours_worked,
            payload.hourly_rate,
            &payload.work_assignment_ids,
            &payload.notes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListCasualPaymentsQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<CasualPaymentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/casual-payments
#[utoipa::path(
    get,
    path = "/api/casual-payments",
    tag = "CasualPayments",
    params(ListCasualPaymentsQuery),
    responses(
        (status = 200, description = "Lista de pagamentos avulsos", body = [CasualPayment])
    )
)]
pub async fn list_casual_payments(
    State(app_state): State<AppState>,
    Query(query): Query<ListCasualPaymentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state
        .casual_service
        .list(query.employee_id, query.status, query.from, query.to)
        .await?;
    Ok(Json(payments))
}

// GET /api/casual-payments/{id}
#[utoipa::path(
    get,
    path = "/api/casual-payments/{id}",
    tag = "CasualPayments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento avulso", body = CasualPayment),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn get_casual_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state.casual_service.get(id).await?;
    Ok(Json(payment))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDeductionPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "advance")]
    pub category: String,

    #[schema(example = "1000.00")]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Adiantamento salarial")]
    pub reason: String,

    #[serde(default)]
    pub description: String,
}

// POST /api/casual-payments/{id}/deductions
#[utoipa::path(
    post,
    path = "/api/casual-payments/{id}/deductions",
    tag = "CasualPayments",
    request_body = AddDeductionPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento com o desconto aplicado", body = CasualPayment),
        (status = 409, description = "Pagamento já quitado ou cancelado")
    )
)]
pub async fn add_deduction(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddDeductionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (payment, _deduction) = app_state
        .casual_service
        .add_deduction(
            id,
            &payload.category,
            payload.amount,
            &payload.reason,
            &payload.description,
        )
        .await?;
    Ok(Json(payment))
}

// GET /api/casual-payments/{id}/deductions
#[utoipa::path(
    get,
    path = "/api/casual-payments/{id}/deductions",
    tag = "CasualPayments",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Razão de descontos", body = [CasualPaymentDeduction]),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn list_deductions(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deductions = app_state.casual_service.list_deductions(id).await?;
    Ok(Json(deductions))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePayload {
    /// Funcionário que aprovou
    pub approved_by: Option<Uuid>,
}

// POST /api/casual-payments/{id}/approve
#[utoipa::path(
    post,
    path = "/api/casual-payments/{id}/approve",
    tag = "CasualPayments",
    request_body = ApprovePayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento aprovado", body = CasualPayment),
        (status = 409, description = "Pagamento fora do status pendente")
    )
)]
pub async fn approve_casual_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state
        .casual_service
        .approve(id, payload.approved_by)
        .await?;
    Ok(Json(payment))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayCasualPayload {
    /// Ausente = quitação integral do valor líquido
    #[schema(example = "2000.00")]
    pub partial_amount: Option<Decimal>,

    pub payment_date: Option<NaiveDate>,

    #[schema(example = "cash")]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub payment_reference: String,
}

// POST /api/casual-payments/{id}/pay
#[utoipa::path(
    post,
    path = "/api/casual-payments/{id}/pay",
    tag = "CasualPayments",
    request_body = PayCasualPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento quitado com lançamentos contábeis", body = CasualPayment),
        (status = 409, description = "Pagamento não aprovado")
    )
)]
pub async fn pay_casual_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PayCasualPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let payment_date = payload.payment_date.unwrap_or_else(|| Utc::now().date_naive());
    let payment = app_state
        .casual_service
        .pay(
            id,
            payload.partial_amount,
            payment_date,
            payload.payment_method,
            &payload.payment_reference,
        )
        .await?;
    Ok(Json(payment))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelCasualPayload {
    #[serde(default)]
    #[schema(example = "Lançamento duplicado")]
    pub reason: String,
}

// POST /api/casual-payments/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/casual-payments/{id}/cancel",
    tag = "CasualPayments",
    request_body = CancelCasualPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento cancelado", body = CasualPayment),
        (status = 409, description = "Pagamento já quitado")
    )
)]
pub async fn cancel_casual_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelCasualPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payment = app_state
        .casual_service
        .cancel(id, &payload.reason)
        .await?;
    Ok(Json(payment))
}
