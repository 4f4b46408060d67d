// src/db/casual_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::casual::{
        CasualPayment, CasualPaymentDeduction, CasualPaymentStatus, PaymentFrequency,
    },
    models::payroll::PaymentMethod,
};

use super::employee_repo::duplicate_as_conflict;

#[derive(Clone)]
pub struct CasualPaymentRepository {
    pool: PgPool,
}

impl CasualPaymentRepository {
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
        payment_number: &str,
        payment_frequency: PaymentFrequency,
        period_start_date: NaiveDate,
        period_end_date: NaiveDate,
        total_hours_worked: Decimal,
        hourly_rate: Decimal,
        base_amount: Decimal,
        gross_amount: Decimal,
        net_amount: Decimal,
        amount_held: Decimal,
        notes: &str,
    ) -> Result<CasualPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, CasualPayment>(
            r#"
            INSERT INTO casual_payments (
                employee_id, payment_number, payment_frequency,
                period_start_date, period_end_date,
                total_hours_worked, hourly_rate,
                base_amount, gross_amount, net_amount, amount_held, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(payment_number)
        .bind(payment_frequency)
        .bind(period_start_date)
        .bind(period_end_date)
        .bind(total_hours_worked)
        .bind(hourly_rate)
        .bind(base_amount)
        .bind(gross_amount)
        .bind(net_amount)
        .bind(amount_held)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(duplicate_as_conflict("Número de pagamento já utilizado"))?;

        Ok(payment)
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<CasualPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, CasualPayment>(
            "SELECT * FROM casual_payments WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(payment)
    }

    /// Versão com trava de linha. O razão de descontos e a ponte contábil
    /// mexem nos valores em cache, então toda mutação passa por aqui.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CasualPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, CasualPayment>(
            "SELECT * FROM casual_payments WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(payment)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        employee_id: Option<Uuid>,
        status: Option<CasualPaymentStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CasualPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, CasualPayment>(
            r#"
            SELECT * FROM casual_payments
            WHERE deleted_at IS NULL
              AND ($1::uuid IS NULL OR employee_id = $1)
              AND ($2::casual_payment_status IS NULL OR status = $2)
              AND ($3::date IS NULL OR period_end_date >= $3)
              AND ($4::date IS NULL OR period_start_date <= $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(employee_id)
        .bind(status)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;

        Ok(payments)
    }

    // =========================================================================
    //  RAZÃO DE DESCONTOS (somente INSERT)
    // =========================================================================

    pub async fn insert_deduction<'e, E>(
        &self,
        executor: E,
        casual_payment_id: Uuid,
        category: &str,
        amount: Decimal,
        reason: &str,
        description: &str,
    ) -> Result<CasualPaymentDeduction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deduction = sqlx::query_as::<_, CasualPaymentDeduction>(
            r#"
            INSERT INTO casual_payment_deductions (casual_payment_id, category, amount, reason, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(casual_payment_id)
        .bind(category)
        .bind(amount)
        .bind(reason)
        .bind(description)
        .fetch_one(executor)
        .await?;

        Ok(deduction)
    }

    pub async fn list_deductions<'e, E>(
        &self,
        executor: E,
        casual_payment_id: Uuid,
    ) -> Result<Vec<CasualPaymentDeduction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deductions = sqlx::query_as::<_, CasualPaymentDeduction>(
            r#"
            SELECT * FROM casual_payment_deductions
            WHERE casual_payment_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(casual_payment_id)
        .fetch_all(executor)
        .await?;

        Ok(deductions)
    }

    // =========================================================================
    //  MUTAÇÕES
    // =========================================================================

    /// Persiste os valores recalculados no modelo. A linha precisa estar
    /// travada pela transação corrente (`get_for_update`).
    pub async fn update_amounts<'e, E>(
        &self,
        executor: E,
        payment: &CasualPayment,
    ) -> Result<CasualPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, CasualPayment>(
            r#"
            UPDATE casual_payments
            SET total_hours_worked = $2,
                hourly_rate = $3,
                base_amount = $4,
                total_deductions = $5,
                gross_amount = $6,
                net_amount = $7,
                amount_paid = $8,
                amount_held = $9,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.total_hours_worked)
        .bind(payment.hourly_rate)
        .bind(payment.base_amount)
        .bind(payment.total_deductions)
        .bind(payment.gross_amount)
        .bind(payment.net_amount)
        .bind(payment.amount_paid)
        .bind(payment.amount_held)
        .fetch_one(executor)
        .await?;

        Ok(updated)
    }

    pub async fn approve<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        approved_by: Option<Uuid>,
        approved_at: DateTime<Utc>,
    ) -> Result<CasualPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, CasualPayment>(
            r#"
            UPDATE casual_payments
            SET status = 'approved',
                approved_by = $2,
                approved_at = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approved_by)
        .bind(approved_at)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn settle<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: CasualPaymentStatus,
        amount_paid: Decimal,
        amount_held: Decimal,
        payment_date: NaiveDate,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> Result<CasualPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, CasualPayment>(
            r#"
            UPDATE casual_payments
            SET status = $2,
                amount_paid = $3,
                amount_held = $4,
                payment_date = $5,
                payment_method = $6,
                payment_reference = $7,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(amount_paid)
        .bind(amount_held)
        .bind(payment_date)
        .bind(payment_method)
        .bind(payment_reference)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    pub async fn cancel<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        reason: &str,
    ) -> Result<CasualPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, CasualPayment>(
            r#"
            UPDATE casual_payments
            SET status = 'cancelled',
                notes = CASE WHEN $2 = '' THEN notes
                             ELSE 'Cancelado: ' || $2 || E'\n' || notes END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    /// Grava os vínculos um-para-um com despesa e receita geradas pela ponte
    /// contábil, dentro da transação que segura a trava da linha.
    pub async fn set_ledger_links<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expense_id: Option<Uuid>,
        revenue_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE casual_payments
            SET expense_id = COALESCE($2, expense_id),
                revenue_id = COALESCE($3, revenue_id),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(expense_id)
        .bind(revenue_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE casual_payments SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
