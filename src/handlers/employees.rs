// src/handlers/employees.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::employee::{Branch, Employee, EmploymentType, RateStructure, RateType},
};

// =============================================================================
//  FILIAIS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Filial Centro")]
    pub name: String,
}

// POST /api/branches
#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "Employees",
    request_body = CreateBranchPayload,
    responses(
        (status = 201, description = "Filial criada", body = Branch),
        (status = 409, description = "Nome já cadastrado")
    )
)]
pub async fn create_branch(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateBranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let branch = app_state.employee_service.create_branch(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

// GET /api/branches
#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Employees",
    responses(
        (status = 200, description = "Lista de filiais", body = [Branch])
    )
)]
pub async fn list_branches(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let branches = app_state.employee_service.list_branches().await?;
    Ok(Json(branches))
}

// =============================================================================
//  ESTRUTURAS DE TARIFA
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRateStructurePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Garçom - horista")]
    pub name: String,

    #[schema(example = "hourly")]
    pub rate_type: RateType,

    #[schema(example = "500.00")]
    pub base_amount: Decimal,

    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,

    /// Acréscimo percentual aplicado em sábados e domingos
    #[schema(example = "20.00")]
    pub weekend_bonus: Option<Decimal>,

    /// Horas a partir das quais o multiplicador de extra é aplicado
    #[schema(example = "8.00")]
    pub overtime_threshold: Option<Decimal>,

    #[schema(example = "1.50")]
    pub overtime_multiplier: Option<Decimal>,
}

// POST /api/rate-structures
#[utoipa::path(
    post,
    path = "/api/rate-structures",
    tag = "Employees",
    request_body = CreateRateStructurePayload,
    responses(
        (status = 201, description = "Estrutura de tarifa criada", body = RateStructure)
    )
)]
pub async fn create_rate_structure(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateRateStructurePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let rate = app_state
        .employee_service
        .create_rate_structure(
            &payload.name,
            payload.rate_type,
            payload.base_amount,
            payload.effective_from,
            payload.effective_to,
            payload.weekend_bonus,
            payload.overtime_threshold,
            payload.overtime_multiplier,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

// GET /api/rate-structures/{id}
#[utoipa::path(
    get,
    path = "/api/rate-structures/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID da estrutura de tarifa")),
    responses(
        (status = 200, description = "Estrutura de tarifa", body = RateStructure),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn get_rate_structure(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let rate = app_state.employee_service.get_rate_structure(id).await?;
    Ok(Json(rate))
}

// =============================================================================
//  FUNCIONÁRIOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    pub branch_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub full_name: String,

    #[schema(example = "casual")]
    pub employment_type: EmploymentType,

    #[schema(example = "80000.00")]
    pub salary: Decimal,

    pub rate_structure_id: Option<Uuid>,
}

// POST /api/employees
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Funcionário criado", body = Employee)
    )
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let employee = app_state
        .employee_service
        .create_employee(
            payload.branch_id,
            &payload.full_name,
            payload.employment_type,
            payload.salary,
            payload.rate_structure_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

// GET /api/employees
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Lista de funcionários", body = [Employee])
    )
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let employees = app_state.employee_service.list_employees().await?;
    Ok(Json(employees))
}

// GET /api/employees/{id}
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Funcionário", body = Employee),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let employee = app_state.employee_service.get_employee(id).await?;
    Ok(Json(employee))
}
