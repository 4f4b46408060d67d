// src/handlers/payroll.rs

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
    models::employee::EmploymentType,
    models::payroll::{
        DeductionCategory, DeductionType, EmployeePayroll, PayrollItem, PayrollItemType,
        PayrollPeriod, PayrollStatus, PaymentMethod, PeriodStatus,
    },
    services::payroll_service::{PeriodSummary, ProcessOutcome},
};

// =============================================================================
//  CATEGORIAS DE DESCONTO E ITENS DE FOLHA
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeductionCategoryPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Adiantamento salarial")]
    pub name: String,

    #[schema(example = "advance")]
    pub deduction_type: DeductionType,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub affects_accounting: bool,
}

// POST /api/deduction-categories
#[utoipa::path(
    post,
    path = "/api/deduction-categories",
    tag = "Payroll",
    request_body = CreateDeductionCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = DeductionCategory),
        (status = 409, description = "Nome já cadastrado")
    )
)]
pub async fn create_deduction_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateDeductionCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .payroll_service
        .create_deduction_category(
            &payload.name,
            payload.deduction_type,
            &payload.description,
            payload.affects_accounting,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/deduction-categories
#[utoipa::path(
    get,
    path = "/api/deduction-categories",
    tag = "Payroll",
    responses(
        (status = 200, description = "Lista de categorias", body = [DeductionCategory])
    )
)]
pub async fn list_deduction_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.payroll_service.list_deduction_categories().await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayrollItemPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Vale transporte")]
    pub name: String,

    #[schema(example = "allowance")]
    pub item_type: PayrollItemType,

    #[serde(default)]
    #[schema(example = "5000.00")]
    pub amount: Decimal,

    #[serde(default)]
    #[schema(example = "10.00")]
    pub percentage: Decimal,

    #[serde(default)]
    pub is_percentage: bool,

    /// Vazio = vale para todos os tipos de contratação
    #[serde(default)]
    pub applicable_employment_types: Vec<EmploymentType>,

    /// Ausente = item válido para a empresa inteira
    pub branch_id: Option<Uuid>,

    pub deduction_category_id: Option<Uuid>,
}

// POST /api/payroll-items
#[utoipa::path(
    post,
    path = "/api/payroll-items",
    tag = "Payroll",
    request_body = CreatePayrollItemPayload,
    responses(
        (status = 201, description = "Item criado", body = PayrollItem),
        (status = 422, description = "Percentual ou valor inválido")
    )
)]
pub async fn create_payroll_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePayrollItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .payroll_service
        .create_payroll_item(
            &payload.name,
            payload.item_type,
            payload.amount,
            payload.percentage,
            payload.is_percentage,
            &payload.applicable_employment_types,
            payload.branch_id,
            payload.deduction_category_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPayrollItemsQuery {
    pub branch_id: Option<Uuid>,
}

// GET /api/payroll-items
#[utoipa::path(
    get,
    path = "/api/payroll-items",
    tag = "Payroll",
    params(ListPayrollItemsQuery),
    responses(
        (status = 200, description = "Itens visíveis para a filial", body = [PayrollItem])
    )
)]
pub async fn list_payroll_items(
    State(app_state): State<AppState>,
    Query(query): Query<ListPayrollItemsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state
        .payroll_service
        .list_payroll_items(query.branch_id)
        .await?;
    Ok(Json(items))
}

// =============================================================================
//  PERÍODOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeriodPayload {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub branch_id: Option<Uuid>,
    #[serde(default)]
    pub notes: String,
}

// POST /api/payroll-periods
#[utoipa::path(
    post,
    path = "/api/payroll-periods",
    tag = "Payroll",
    request_body = CreatePeriodPayload,
    responses(
        (status = 201, description = "Período criado", body = PayrollPeriod),
        (status = 200, description = "Período já existia", body = PayrollPeriod)
    )
)]
pub async fn create_period(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePeriodPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (period, created) = app_state
        .payroll_service
        .create_period(
            payload.start_date,
            payload.end_date,
            payload.branch_id,
            &payload.notes,
        )
        .await?;

    let code = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((code, Json(period)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPeriodsQuery {
    pub status: Option<PeriodStatus>,
    pub branch_id: Option<Uuid>,
}

// GET /api/payroll-periods
#[utoipa::path(
    get,
    path = "/api/payroll-periods",
    tag = "Payroll",
    params(ListPeriodsQuery),
    responses(
        (status = 200, description = "Lista de períodos", body = [PayrollPeriod])
    )
)]
pub async fn list_periods(
    State(app_state): State<AppState>,
    Query(query): Query<ListPeriodsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let periods = app_state
        .payroll_service
        .list_periods(query.status, query.branch_id)
        .await?;
    Ok(Json(periods))
}

// GET /api/payroll-periods/{id}
#[utoipa::path(
    get,
    path = "/api/payroll-periods/{id}",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses(
        (status = 200, description = "Período com totais", body = PeriodSummary),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn get_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.payroll_service.period_summary(id).await?;
    Ok(Json(summary))
}

// DELETE /api/payroll-periods/{id}
#[utoipa::path(
    delete,
    path = "/api/payroll-periods/{id}",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses(
        (status = 204, description = "Período excluído"),
        (status = 409, description = "Período fora do rascunho")
    )
)]
pub async fn delete_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.payroll_service.delete_period(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/payroll-periods/{id}/process
#[utoipa::path(
    post,
    path = "/api/payroll-periods/{id}/process",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses(
        (status = 200, description = "Relatório do processamento", body = ProcessOutcome),
        (status = 409, description = "Período concluído ou fechado")
    )
)]
pub async fn process_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.payroll_service.process_period(id).await?;
    Ok(Json(outcome))
}

// POST /api/payroll-periods/{id}/approve
#[utoipa::path(
    post,
    path = "/api/payroll-periods/{id}/approve",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses(
        (status = 200, description = "Período concluído", body = PayrollPeriod),
        (status = 409, description = "Período fora de processamento"),
        (status = 422, description = "Folhas ainda sem cálculo")
    )
)]
pub async fn approve_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (period, _approved) = app_state.payroll_service.approve_period(id).await?;
    Ok(Json(period))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayAllPayload {
    pub payment_date: Option<NaiveDate>,
    #[schema(example = "bank_transfer")]
    pub payment_method: PaymentMethod,
}

// POST /api/payroll-periods/{id}/pay
#[utoipa::path(
    post,
    path = "/api/payroll-periods/{id}/pay",
    tag = "Payroll",
    request_body = PayAllPayload,
    params(("id" = Uuid, Path, description = "ID do período")),
    responses(
        (status = 200, description = "Quantidade de folhas pagas"),
        (status = 409, description = "Período não concluído")
    )
)]
pub async fn pay_all(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PayAllPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let payment_date = payload.payment_date.unwrap_or_else(|| Utc::now().date_naive());
    let paid = app_state
        .payroll_service
        .pay_all(id, payment_date, payload.payment_method)
        .await?;
    Ok(Json(serde_json::json!({ "paid": paid })))
}

// POST /api/payroll-periods/{id}/close
#[utoipa::path(
    post,
    path = "/api/payroll-periods/{id}/close",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID do período")),
    responses(
        (status = 200, description = "Período fechado", body = PayrollPeriod),
        (status = 422, description = "Folhas pendentes bloqueiam o fechamento")
    )
)]
pub async fn close_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let period = app_state.payroll_service.close_period(id).await?;
    Ok(Json(period))
}

// =============================================================================
//  FOLHAS INDIVIDUAIS
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPayrollsQuery {
    pub status: Option<PayrollStatus>,
}

// GET /api/payroll-periods/{id}/payrolls
#[utoipa::path(
    get,
    path = "/api/payroll-periods/{id}/payrolls",
    tag = "Payroll",
    params(
        ("id" = Uuid, Path, description = "ID do período"),
        ListPayrollsQuery
    ),
    responses(
        (status = 200, description = "Folhas do período", body = [EmployeePayroll])
    )
)]
pub async fn list_period_payrolls(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListPayrollsQuery>,
) -> Result<impl IntoResponse, AppError> {
    // 404 para período inexistente antes de listar
    app_state.payroll_service.get_period(id).await?;
    let payrolls = app_state
        .payroll_service
        .list_payrolls_for_period(id, query.status)
        .await?;
    Ok(Json(payrolls))
}

// GET /api/employee-payrolls/{id}
#[utoipa::path(
    get,
    path = "/api/employee-payrolls/{id}",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID da folha")),
    responses(
        (status = 200, description = "Folha", body = EmployeePayroll),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn get_employee_payroll(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payroll = app_state.payroll_service.get_employee_payroll(id).await?;
    Ok(Json(payroll))
}

// POST /api/employee-payrolls/{id}/calculate
#[utoipa::path(
    post,
    path = "/api/employee-payrolls/{id}/calculate",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID da folha")),
    responses(
        (status = 200, description = "Folha recalculada", body = EmployeePayroll),
        (status = 409, description = "Folha não aceita recálculo")
    )
)]
pub async fn calculate_employee_payroll(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payroll = app_state.payroll_service.calculate_employee_payroll(id).await?;
    Ok(Json(payroll))
}

// POST /api/employee-payrolls/{id}/approve
#[utoipa::path(
    post,
    path = "/api/employee-payrolls/{id}/approve",
    tag = "Payroll",
    params(("id" = Uuid, Path, description = "ID da folha")),
    responses(
        (status = 200, description = "Folha aprovada", body = EmployeePayroll),
        (status = 409, description = "Folha fora do status calculada")
    )
)]
pub async fn approve_employee_payroll(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payroll = app_state.payroll_service.approve_payroll(id).await?;
    Ok(Json(payroll))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayPayrollPayload {
    pub payment_date: Option<NaiveDate>,
    #[schema(example = "bank_transfer")]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    #[schema(example = "TED 1234")]
    pub payment_reference: String,
}

// POST /api/employee-payrolls/{id}/pay
#[utoipa::path(
    post,
    path = "/api/employee-payrolls/{id}/pay",
    tag = "Payroll",
    request_body = PayPayrollPayload,
    params(("id" = Uuid, Path, description = "ID da folha")),
    responses(
        (status = 200, description = "Folha paga com despesa lançada", body = EmployeePayroll),
        (status = 409, description = "Folha não aprovada")
    )
)]
pub async fn pay_employee_payroll(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PayPayrollPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let payment_date = payload.payment_date.unwrap_or_else(|| Utc::now().date_naive());
    let payroll = app_state
        .payroll_service
        .mark_payroll_paid(id, payment_date, payload.payment_method, &payload.payment_reference)
        .await?;
    Ok(Json(payroll))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelPayload {
    #[serde(default)]
    #[schema(example = "Contratação encerrada")]
    pub reason: String,
}

// POST /api/employee-payrolls/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/employee-payrolls/{id}/cancel",
    tag = "Payroll",
    request_body = CancelPayload,
    params(("id" = Uuid, Path, description = "ID da folha")),
    responses(
        (status = 200, description = "Folha cancelada", body = EmployeePayroll),
        (status = 409, description = "Folha paga não pode ser cancelada")
    )
)]
pub async fn cancel_employee_payroll(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payroll = app_state
        .payroll_service
        .cancel_payroll(id, &payload.reason)
        .await?;
    Ok(Json(payroll))
}
