// src/db/assignment_repo.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::assignment::{AssignmentStatus, WorkAssignment},
};

use super::employee_repo::duplicate_as_conflict;

#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        assignment_number: &str,
        work_date: NaiveDate,
        start_time: NaiveTime,
        end_time: Option<NaiveTime>,
        expected_hours: Decimal,
        work_description: &str,
        calculated_rate: Option<Decimal>,
        notes: &str,
    ) -> Result<WorkAssignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, WorkAssignment>(
            r#"
            INSERT INTO work_assignments (
                employee_id, assignment_number, work_date, start_time, end_time,
                expected_hours, work_description, calculated_rate, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(assignment_number)
        .bind(work_date)
        .bind(start_time)
        .bind(end_time)
        .bind(expected_hours)
        .bind(work_description)
        .bind(calculated_rate)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(duplicate_as_conflict(
            "Funcionário já possui agendamento nessa data e horário",
        ))?;

        Ok(assignment)
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WorkAssignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, WorkAssignment>(
            "SELECT * FROM work_assignments WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(assignment)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        employee_id: Option<Uuid>,
        status: Option<AssignmentStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WorkAssignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignments = sqlx::query_as::<_, WorkAssignment>(
            r#"
            SELECT * FROM work_assignments
            WHERE deleted_at IS NULL
              AND ($1::uuid IS NULL OR employee_id = $1)
              AND ($2::assignment_status IS NULL OR status = $2)
              AND ($3::date IS NULL OR work_date >= $3)
              AND ($4::date IS NULL OR work_date <= $4)
            ORDER BY work_date DESC, start_time ASC
            "#,
        )
        .bind(employee_id)
        .bind(status)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;

        Ok(assignments)
    }

    pub async fn list_for_date<'e, E>(
        &self,
        executor: E,
        work_date: NaiveDate,
    ) -> Result<Vec<WorkAssignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignments = sqlx::query_as::<_, WorkAssignment>(
            r#"
            SELECT * FROM work_assignments
            WHERE deleted_at IS NULL AND work_date = $1
            ORDER BY start_time ASC
            "#,
        )
        .bind(work_date)
        .fetch_all(executor)
        .await?;

        Ok(assignments)
    }

    /// Agendamentos vencidos: ainda abertos com data estritamente anterior
    /// a `today`.
    pub async fn list_overdue<'e, E>(
        &self,
        executor: E,
        today: NaiveDate,
    ) -> Result<Vec<WorkAssignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignments = sqlx::query_as::<_, WorkAssignment>(
            r#"
            SELECT * FROM work_assignments
            WHERE deleted_at IS NULL
              AND work_date < $1
              AND status IN ('scheduled', 'in_progress')
            ORDER BY work_date ASC, start_time ASC
            "#,
        )
        .bind(today)
        .fetch_all(executor)
        .await?;

        Ok(assignments)
    }

    /// Horas trabalhadas dos agendamentos concluídos de um funcionário no
    /// intervalo, para montar pagamentos avulsos a partir dos agendamentos.
    pub async fn completed_in_range<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkAssignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignments = sqlx::query_as::<_, WorkAssignment>(
            r#"
            SELECT * FROM work_assignments
            WHERE deleted_at IS NULL
              AND employee_id = $1
              AND status = 'completed'
              AND work_date BETWEEN $2 AND $3
            ORDER BY work_date ASC, start_time ASC
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;

        Ok(assignments)
    }

    pub async fn record_check_in<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        check_in_time: DateTime<Utc>,
    ) -> Result<WorkAssignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, WorkAssignment>(
            r#"
            UPDATE work_assignments
            SET status = 'in_progress',
                check_in_time = $2,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(check_in_time)
        .fetch_one(executor)
        .await?;

        Ok(assignment)
    }

    pub async fn record_check_out<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        check_out_time: DateTime<Utc>,
        actual_hours: Decimal,
        total_payment: Option<Decimal>,
    ) -> Result<WorkAssignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, WorkAssignment>(
            r#"
            UPDATE work_assignments
            SET status = 'completed',
                check_out_time = $2,
                actual_hours = $3,
                total_payment = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(check_out_time)
        .bind(actual_hours)
        .bind(total_payment)
        .fetch_one(executor)
        .await?;

        Ok(assignment)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AssignmentStatus,
        reason: &str,
    ) -> Result<WorkAssignment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, WorkAssignment>(
            r#"
            UPDATE work_assignments
            SET status = $2,
                notes = CASE WHEN $3 = '' THEN notes
                             ELSE $3 || E'\n' || notes END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(assignment)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE work_assignments SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
