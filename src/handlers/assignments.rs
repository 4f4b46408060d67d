// src/handlers/assignments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::assignment::{AssignmentStatus, WorkAssignment},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentPayload {
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    #[schema(example = "09:00:00")]
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    #[schema(example = "8.00")]
    pub expected_hours: Decimal,
    #[serde(default)]
    #[schema(example = "Cobertura do turno da noite")]
    pub work_description: String,
    #[serde(default)]
    pub notes: String,
}

// POST /api/assignments
#[utoipa::path(
    post,
    path = "/api/assignments",
    tag = "Assignments",
    request_body = CreateAssignmentPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = WorkAssignment),
        (status = 409, description = "Funcionário já agendado nessa data e horário")
    )
)]
pub async fn create_assignment(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assignment = app_state
        .assignment_service
        .create_assignment(
            payload.employee_id,
            payload.work_date,
            payload.start_time,
            payload.end_time,
            payload.expected_hours,
            &payload.work_description,
            &payload.notes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<AssignmentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/assignments
#[utoipa::path(
    get,
    path = "/api/assignments",
    tag = "Assignments",
    params(ListAssignmentsQuery),
    responses(
        (status = 200, description = "Lista de agendamentos", body = [WorkAssignment])
    )
)]
pub async fn list_assignments(
    State(app_state): State<AppState>,
    Query(query): Query<ListAssignmentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = app_state
        .assignment_service
        .list(query.employee_id, query.status, query.from, query.to)
        .await?;
    Ok(Json(assignments))
}

// GET /api/assignments/today
#[utoipa::path(
    get,
    path = "/api/assignments/today",
    tag = "Assignments",
    responses(
        (status = 200, description = "Agendamentos de hoje", body = [WorkAssignment])
    )
)]
pub async fn list_today(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = app_state.assignment_service.list_today().await?;
    Ok(Json(assignments))
}

// GET /api/assignments/overdue
#[utoipa::path(
    get,
    path = "/api/assignments/overdue",
    tag = "Assignments",
    responses(
        (status = 200, description = "Agendamentos vencidos ainda abertos", body = [WorkAssignment])
    )
)]
pub async fn list_overdue(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = app_state.assignment_service.list_overdue().await?;
    Ok(Json(assignments))
}

// GET /api/assignments/{id}
#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    tag = "Assignments",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento", body = WorkAssignment),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn get_assignment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state.assignment_service.get(id).await?;
    Ok(Json(assignment))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckPayload {
    /// Ausente = agora
    pub at: Option<DateTime<Utc>>,
}

// POST /api/assignments/{id}/check-in
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/check-in",
    tag = "Assignments",
    request_body = CheckPayload,
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Turno em andamento", body = WorkAssignment),
        (status = 409, description = "Agendamento fora do status pendente")
    )
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state.assignment_service.check_in(id, payload.at).await?;
    Ok(Json(assignment))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutPayload {
    /// Ausente = agora
    pub at: Option<DateTime<Utc>>,
    /// Ausente = derivado do intervalo entre check-in e check-out
    #[schema(example = "6.50")]
    pub actual_hours: Option<Decimal>,
}

// POST /api/assignments/{id}/check-out
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/check-out",
    tag = "Assignments",
    request_body = CheckOutPayload,
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Turno concluído com horas e pagamento", body = WorkAssignment),
        (status = 409, description = "Agendamento não está em andamento"),
        (status = 422, description = "Horas inválidas ou check-out anterior ao check-in")
    )
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckOutPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state
        .assignment_service
        .check_out(id, payload.at, payload.actual_hours)
        .await?;
    Ok(Json(assignment))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReasonPayload {
    #[serde(default)]
    #[schema(example = "Evento cancelado pelo cliente")]
    pub reason: String,
}

// POST /api/assignments/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/cancel",
    tag = "Assignments",
    request_body = ReasonPayload,
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento cancelado", body = WorkAssignment),
        (status = 409, description = "Agendamento já encerrado")
    )
)]
pub async fn cancel_assignment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state
        .assignment_service
        .cancel(id, &payload.reason)
        .await?;
    Ok(Json(assignment))
}

// POST /api/assignments/{id}/no-show
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/no-show",
    tag = "Assignments",
    request_body = ReasonPayload,
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Falta registrada", body = WorkAssignment),
        (status = 409, description = "Agendamento fora do status pendente")
    )
)]
pub async fn mark_no_show(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReasonPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state
        .assignment_service
        .mark_no_show(id, &payload.reason)
        .await?;
    Ok(Json(assignment))
}

// DELETE /api/assignments/{id}
#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    tag = "Assignments",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 204, description = "Agendamento excluído"),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn delete_assignment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.assignment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
