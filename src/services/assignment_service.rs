// src/services/assignment_service.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, EmployeeRepository},
    models::assignment::{checkout_hours, new_assignment_number, AssignmentStatus, WorkAssignment},
    models::employee::Employee,
};

#[derive(Clone)]
pub struct AssignmentService {
    repo: AssignmentRepository,
    employee_repo: EmployeeRepository,
}

impl AssignmentService {
    pub fn new(repo: AssignmentRepository, employee_repo: EmployeeRepository) -> Self {
        Self {
            repo,
            employee_repo,
        }
    }

    /// Agenda um turno. O valor previsto é calculado já na criação, sobre as
    /// horas esperadas, para o funcionário saber quanto o turno rende.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_assignment(
        &self,
        employee_id: Uuid,
        work_date: NaiveDate,
        start_time: NaiveTime,
        end_time: Option<NaiveTime>,
        expected_hours: Decimal,
        work_description: &str,
        notes: &str,
    ) -> Result<WorkAssignment, AppError> {
        if expected_hours <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Horas previstas devem ser maiores que zero".into(),
            ));
        }

        let mut tx = self.repo.pool().begin().await?;
        let employee = self
            .employee_repo
            .get_employee(&mut *tx, employee_id)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))?;
        if !employee.is_active {
            return Err(AppError::Validation(
                "Funcionário inativo não pode ser agendado".into(),
            ));
        }

        let calculated_rate = self
            .payment_for_hours(&mut tx, &employee, work_date, expected_hours)
            .await?;

        let assignment = self
            .repo
            .create(
                &mut *tx,
                employee_id,
                &new_assignment_number(),
                work_date,
                start_time,
                end_time,
                expected_hours,
                work_description,
                calculated_rate,
                notes,
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            assignment_number = %assignment.assignment_number,
            employee_id = %employee_id,
            "agendamento criado"
        );
        Ok(assignment)
    }

    /// Valor devido por um turno: estrutura de tarifa vigente na data, senão
    /// o fallback do salário cadastrado para horistas.
    async fn payment_for_hours(
        &self,
        conn: &mut sqlx::PgConnection,
        employee: &Employee,
        work_date: NaiveDate,
        hours: Decimal,
    ) -> Result<Option<Decimal>, AppError> {
        if let Some(rate_id) = employee.rate_structure_id {
            if let Some(rate) = self.employee_repo.get_rate_structure(&mut *conn, rate_id).await? {
                if rate.is_effective_on(work_date) {
                    return Ok(Some(rate.calculate_rate(Some(work_date), hours)));
                }
            }
        }

        if employee.employment_type.is_hourly() {
            return Ok(Some(employee.fallback_payment(hours)));
        }

        Ok(None)
    }

    pub async fn get(&self, id: Uuid) -> Result<WorkAssignment, AppError> {
        self.repo
            .get(self.repo.pool(), id)
            .await?
            .ok_or(AppError::NotFound("Agendamento"))
    }

    pub async fn list(
        &self,
        employee_id: Option<Uuid>,
        status: Option<AssignmentStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WorkAssignment>, AppError> {
        self.repo
            .list(self.repo.pool(), employee_id, status, from, to)
            .await
    }

    pub async fn list_today(&self) -> Result<Vec<WorkAssignment>, AppError> {
        self.repo
            .list_for_date(self.repo.pool(), Utc::now().date_naive())
            .await
    }

    pub async fn list_overdue(&self) -> Result<Vec<WorkAssignment>, AppError> {
        self.repo
            .list_overdue(self.repo.pool(), Utc::now().date_naive())
            .await
    }

    /// Check-in: só agendamentos ainda em `scheduled`.
    pub async fn check_in(
        &self,
        id: Uuid,
        at: Option<DateTime<Utc>>,
    ) -> Result<WorkAssignment, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let assignment = self
            .repo
            .get(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Agendamento"))?;

        if assignment.status != AssignmentStatus::Scheduled {
            return Err(AppError::InvalidTransition(
                "Check-in só é permitido em agendamentos pendentes".into(),
            ));
        }

        let updated = self
            .repo
            .record_check_in(&mut *tx, id, at.unwrap_or_else(Utc::now))
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Check-out: congela as horas reais e o pagamento total do turno. As
    /// horas podem vir informadas pelo operador; na ausência, são derivadas
    /// do intervalo entre check-in e check-out.
    pub async fn check_out(
        &self,
        id: Uuid,
        at: Option<DateTime<Utc>>,
        actual_hours: Option<Decimal>,
    ) -> Result<WorkAssignment, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let assignment = self
            .repo
            .get(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Agendamento"))?;

        if assignment.status != AssignmentStatus::InProgress {
            return Err(AppError::InvalidTransition(
                "Check-out exige um agendamento em andamento".into(),
            ));
        }
        let check_in_time = assignment.check_in_time.ok_or_else(|| {
            AppError::Validation("Agendamento em andamento sem check-in registrado".into())
        })?;

        if let Some(hours) = actual_hours {
            if hours <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "Horas reais informadas devem ser maiores que zero".into(),
                ));
            }
        }

        let check_out_time = at.unwrap_or_else(Utc::now);
        let actual_hours =
            checkout_hours(check_in_time, check_out_time, actual_hours).ok_or_else(|| {
                AppError::Validation("Check-out não pode ser anterior ao check-in".into())
            })?;

        let employee = self
            .employee_repo
            .get_employee(&mut *tx, assignment.employee_id)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))?;
        let total_payment = self
            .payment_for_hours(&mut tx, &employee, assignment.work_date, actual_hours)
            .await?;

        let updated = self
            .repo
            .record_check_out(&mut *tx, id, check_out_time, actual_hours, total_payment)
            .await?;
        tx.commit().await?;

        tracing::info!(
            assignment_number = %updated.assignment_number,
            actual_hours = %actual_hours,
            "check-out registrado"
        );
        Ok(updated)
    }

    pub async fn cancel(&self, id: Uuid, reason: &str) -> Result<WorkAssignment, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let assignment = self
            .repo
            .get(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Agendamento"))?;

        if assignment.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "Agendamento concluído ou encerrado não pode ser cancelado".into(),
            ));
        }

        let note = if reason.is_empty() {
            String::new()
        } else {
            format!("Cancelado: {}", reason)
        };
        let updated = self
            .repo
            .update_status(&mut *tx, id, AssignmentStatus::Cancelled, &note)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Falta: saída lateral disponível em qualquer estado não-terminal,
    /// inclusive turnos já em andamento que foram abandonados.
    pub async fn mark_no_show(&self, id: Uuid, reason: &str) -> Result<WorkAssignment, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let assignment = self
            .repo
            .get(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Agendamento"))?;

        if assignment.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "Agendamento encerrado não pode ser marcado como falta".into(),
            ));
        }

        let note = if reason.is_empty() {
            String::new()
        } else {
            format!("Falta: {}", reason)
        };
        let updated = self
            .repo
            .update_status(&mut *tx, id, AssignmentStatus::NoShow, &note)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self.repo.soft_delete(self.repo.pool(), id).await?;
        if !deleted {
            return Err(AppError::NotFound("Agendamento"));
        }
        Ok(())
    }
}
