// src/db/payroll_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::employee::EmploymentType,
    models::payroll::{
        DeductionCategory, DeductionType, EmployeePayroll, PayrollAmounts, PayrollItem,
        PayrollItemType, PayrollPeriod, PayrollStatus, PaymentMethod, PeriodStatus,
    },
};

use super::employee_repo::duplicate_as_conflict;

#[derive(Clone)]
pub struct PayrollRepository {
    pool: PgPool,
}

impl PayrollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  CATEGORIAS DE DESCONTO
    // =========================================================================

    pub async fn create_deduction_category<'e, E>(
        &self,
        executor: E,
        name: &str,
        deduction_type: DeductionType,
        description: &str,
        affects_accounting: bool,
    ) -> Result<DeductionCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, DeductionCategory>(
            r#"
            INSERT INTO deduction_categories (name, deduction_type, description, affects_accounting)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(deduction_type)
        .bind(description)
        .bind(affects_accounting)
        .fetch_one(executor)
        .await
        .map_err(duplicate_as_conflict("Categoria de desconto já cadastrada"))?;

        Ok(category)
    }

    pub async fn list_deduction_categories<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<DeductionCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, DeductionCategory>(
            "SELECT * FROM deduction_categories ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(categories)
    }

    // =========================================================================
    //  ITENS DE FOLHA
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_payroll_item<'e, E>(
        &self,
        executor: E,
        name: &str,
        item_type: PayrollItemType,
        amount: Decimal,
        percentage: Decimal,
        is_percentage: bool,
        applicable_employment_types: &[EmploymentType],
        branch_id: Option<Uuid>,
        deduction_category_id: Option<Uuid>,
    ) -> Result<PayrollItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, PayrollItem>(
            r#"
            INSERT INTO payroll_items (
                name, item_type, amount, percentage, is_percentage,
                applicable_employment_types, branch_id, deduction_category_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(item_type)
        .bind(amount)
        .bind(percentage)
        .bind(is_percentage)
        .bind(applicable_employment_types.to_vec())
        .bind(branch_id)
        .bind(deduction_category_id)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    /// Lista itens visíveis para uma filial: os dela mais os da empresa toda.
    pub async fn list_payroll_items<'e, E>(
        &self,
        executor: E,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<PayrollItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, PayrollItem>(
            r#"
            SELECT * FROM payroll_items
            WHERE deleted_at IS NULL
              AND ($1::uuid IS NULL OR branch_id = $1 OR branch_id IS NULL)
            ORDER BY name ASC
            "#,
        )
        .bind(branch_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Itens ativos dos tipos pedidos. O predicado de escopo
    /// (filial/tipo de contratação) é aplicado em código, no modelo.
    pub async fn get_active_items_by_types<'e, E>(
        &self,
        executor: E,
        item_types: &[PayrollItemType],
    ) -> Result<Vec<PayrollItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, PayrollItem>(
            r#"
            SELECT * FROM payroll_items
            WHERE deleted_at IS NULL
              AND is_active = TRUE
              AND item_type = ANY($1)
            ORDER BY name ASC
            "#,
        )
        .bind(item_types.to_vec())
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    // =========================================================================
    //  PERÍODOS
    // =========================================================================

    /// Get-or-create atômico: o INSERT com ON CONFLICT corre contra a chave
    /// única `(start_date, end_date, branch_id)`, então duas chamadas
    /// concorrentes convergem para a mesma linha.
    pub async fn get_or_create_period<'e, E>(
        &self,
        executor: E,
        start_date: NaiveDate,
        end_date: NaiveDate,
        branch_id: Option<Uuid>,
        notes: &str,
    ) -> Result<(PayrollPeriod, bool), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let inserted = sqlx::query_as::<_, PayrollPeriod>(
            r#"
            INSERT INTO payroll_periods (start_date, end_date, branch_id, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (start_date, end_date, branch_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .bind(branch_id)
        .bind(notes)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(period) => (period, true),
            None => {
                let period = sqlx::query_as::<_, PayrollPeriod>(
                    r#"
                    SELECT * FROM payroll_periods
                    WHERE start_date = $1
                      AND end_date = $2
                      AND branch_id IS NOT DISTINCT FROM $3
                    "#,
                )
                .bind(start_date)
                .bind(end_date)
                .bind(branch_id)
                .fetch_one(&mut *tx)
                .await?;
                (period, false)
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    pub async fn get_period<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<PayrollPeriod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let period = sqlx::query_as::<_, PayrollPeriod>(
            "SELECT * FROM payroll_periods WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(period)
    }

    pub async fn list_periods<'e, E>(
        &self,
        executor: E,
        status: Option<PeriodStatus>,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<PayrollPeriod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let periods = sqlx::query_as::<_, PayrollPeriod>(
            r#"
            SELECT * FROM payroll_periods
            WHERE deleted_at IS NULL
              AND ($1::period_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR branch_id = $2)
            ORDER BY start_date DESC
            "#,
        )
        .bind(status)
        .bind(branch_id)
        .fetch_all(executor)
        .await?;

        Ok(periods)
    }

    pub async fn update_period_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: PeriodStatus,
    ) -> Result<PayrollPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let period = sqlx::query_as::<_, PayrollPeriod>(
            r#"
            UPDATE payroll_periods
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(period)
    }

    pub async fn soft_delete_period<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE payroll_periods SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Total líquido e número de folhas de um período, para os resumos.
    pub async fn period_totals<'e, E>(
        &self,
        executor: E,
        period_id: Uuid,
    ) -> Result<(Decimal, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, (Decimal, i64)>(
            r#"
            SELECT COALESCE(SUM(net_pay), 0), COUNT(*)
            FROM employee_payrolls
            WHERE payroll_period_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(period_id)
        .fetch_one(executor)
        .await?;

        Ok(totals)
    }

    // =========================================================================
    //  FOLHAS POR FUNCIONÁRIO
    // =========================================================================

    /// Get-or-create atômico contra a chave única `(employee, period)`:
    /// chamadas concorrentes para o mesmo par convergem para uma linha só.
    pub async fn upsert_employee_payroll<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        period_id: Uuid,
        rate_structure_id: Option<Uuid>,
    ) -> Result<(EmployeePayroll, bool), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let inserted = sqlx::query_as::<_, EmployeePayroll>(
            r#"
            INSERT INTO employee_payrolls (employee_id, payroll_period_id, rate_structure_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (employee_id, payroll_period_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(period_id)
        .bind(rate_structure_id)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(payroll) => (payroll, true),
            None => {
                let payroll = sqlx::query_as::<_, EmployeePayroll>(
                    r#"
                    SELECT * FROM employee_payrolls
                    WHERE employee_id = $1 AND payroll_period_id = $2
                    "#,
                )
                .bind(employee_id)
                .bind(period_id)
                .fetch_one(&mut *tx)
                .await?;
                (payroll, false)
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    pub async fn get_employee_payroll<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<EmployeePayroll>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payroll = sqlx::query_as::<_, EmployeePayroll>(
            "SELECT * FROM employee_payrolls WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(payroll)
    }

    /// Versão com trava de linha, usada pela ponte contábil para impedir
    /// dupla materialização em confirmações concorrentes.
    pub async fn get_employee_payroll_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<EmployeePayroll>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payroll = sqlx::query_as::<_, EmployeePayroll>(
            "SELECT * FROM employee_payrolls WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(payroll)
    }

    pub async fn list_payrolls_for_period<'e, E>(
        &self,
        executor: E,
        period_id: Uuid,
        status: Option<PayrollStatus>,
    ) -> Result<Vec<EmployeePayroll>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payrolls = sqlx::query_as::<_, EmployeePayroll>(
            r#"
            SELECT * FROM employee_payrolls
            WHERE payroll_period_id = $1
              AND deleted_at IS NULL
              AND ($2::payroll_status IS NULL OR status = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(period_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(payrolls)
    }

    /// Ids das folhas que ainda bloqueiam o fechamento do período.
    pub async fn list_blocking_payrolls<'e, E>(
        &self,
        executor: E,
        period_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM employee_payrolls
            WHERE payroll_period_id = $1
              AND deleted_at IS NULL
              AND status IN ('draft', 'calculated')
            ORDER BY created_at ASC
            "#,
        )
        .bind(period_id)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    pub async fn count_unpaid_approved<'e, E>(
        &self,
        executor: E,
        period_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM employee_payrolls
            WHERE payroll_period_id = $1
              AND deleted_at IS NULL
              AND status = 'approved'
            "#,
        )
        .bind(period_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Sobrescreve os valores calculados e marca a folha como `calculated`.
    /// Recalcular nunca acumula: os quatro valores são substituídos.
    pub async fn update_payroll_amounts<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        rate_structure_id: Option<Uuid>,
        amounts: &PayrollAmounts,
    ) -> Result<EmployeePayroll, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payroll = sqlx::query_as::<_, EmployeePayroll>(
            r#"
            UPDATE employee_payrolls
            SET rate_structure_id = $2,
                basic_salary = $3,
                gross_pay = $4,
                total_deductions = $5,
                net_pay = $6,
                status = 'calculated',
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(rate_structure_id)
        .bind(amounts.basic_salary)
        .bind(amounts.gross_pay)
        .bind(amounts.total_deductions)
        .bind(amounts.net_pay)
        .fetch_one(executor)
        .await?;

        Ok(payroll)
    }

    pub async fn update_payroll_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: PayrollStatus,
    ) -> Result<EmployeePayroll, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payroll = sqlx::query_as::<_, EmployeePayroll>(
            r#"
            UPDATE employee_payrolls
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(payroll)
    }

    pub async fn mark_payroll_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payment_date: NaiveDate,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> Result<EmployeePayroll, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payroll = sqlx::query_as::<_, EmployeePayroll>(
            r#"
            UPDATE employee_payrolls
            SET status = 'paid',
                payment_date = $2,
                payment_method = $3,
                payment_reference = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_date)
        .bind(payment_method)
        .bind(payment_reference)
        .fetch_one(executor)
        .await?;

        Ok(payroll)
    }

    pub async fn cancel_payroll<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        reason: &str,
    ) -> Result<EmployeePayroll, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payroll = sqlx::query_as::<_, EmployeePayroll>(
            r#"
            UPDATE employee_payrolls
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

        Ok(payroll)
    }

    /// Grava o vínculo um-para-um com a despesa. Só pode acontecer dentro da
    /// transação que segura a trava da linha.
    pub async fn set_payroll_expense<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expense_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE employee_payrolls SET expense_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(expense_id)
        .execute(executor)
        .await?;

        Ok(())
    }
}
