// src/db/employee_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::employee::{Branch, Employee, EmploymentType, RateStructure, RateType},
};

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  FILIAIS
    // =========================================================================

    pub async fn create_branch<'e, E>(&self, executor: E, name: &str) -> Result<Branch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branch = sqlx::query_as::<_, Branch>(
            r#"
            INSERT INTO branches (name)
            VALUES ($1)
            RETURNING id, name, is_active, created_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(duplicate_as_conflict("Filial já cadastrada"))?;

        Ok(branch)
    }

    pub async fn list_branches<'e, E>(&self, executor: E) -> Result<Vec<Branch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT id, name, is_active, created_at FROM branches ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(branches)
    }

    // =========================================================================
    //  ESTRUTURAS DE TARIFA
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_rate_structure<'e, E>(
        &self,
        executor: E,
        name: &str,
        rate_type: RateType,
        base_amount: Decimal,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
        weekend_bonus: Option<Decimal>,
        overtime_threshold: Option<Decimal>,
        overtime_multiplier: Option<Decimal>,
    ) -> Result<RateStructure, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rate = sqlx::query_as::<_, RateStructure>(
            r#"
            INSERT INTO rate_structures (
                name, rate_type, base_amount, effective_from, effective_to,
                weekend_bonus, overtime_threshold, overtime_multiplier
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(rate_type)
        .bind(base_amount)
        .bind(effective_from)
        .bind(effective_to)
        .bind(weekend_bonus)
        .bind(overtime_threshold)
        .bind(overtime_multiplier)
        .fetch_one(executor)
        .await?;

        Ok(rate)
    }

    pub async fn get_rate_structure<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<RateStructure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rate = sqlx::query_as::<_, RateStructure>(
            "SELECT * FROM rate_structures WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(rate)
    }

    // =========================================================================
    //  FUNCIONÁRIOS
    // =========================================================================

    pub async fn create_employee<'e, E>(
        &self,
        executor: E,
        branch_id: Option<Uuid>,
        full_name: &str,
        employment_type: EmploymentType,
        salary: Decimal,
        rate_structure_id: Option<Uuid>,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (branch_id, full_name, employment_type, salary, rate_structure_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(branch_id)
        .bind(full_name)
        .bind(employment_type)
        .bind(salary)
        .bind(rate_structure_id)
        .fetch_one(executor)
        .await?;

        Ok(employee)
    }

    pub async fn get_employee<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(employee)
    }

    /// Funcionários elegíveis para um período: ativos e, se o período tiver
    /// filial, lotados nela.
    pub async fn list_active_employees<'e, E>(
        &self,
        executor: E,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE is_active = TRUE
              AND ($1::uuid IS NULL OR branch_id = $1)
            ORDER BY full_name ASC
            "#,
        )
        .bind(branch_id)
        .fetch_all(executor)
        .await?;

        Ok(employees)
    }

    pub async fn list_employees<'e, E>(&self, executor: E) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY full_name ASC")
                .fetch_all(executor)
                .await?;

        Ok(employees)
    }
}

/// Converte violação de chave única em `AppError::Duplicate`.
pub(crate) fn duplicate_as_conflict(message: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |error| {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                return AppError::Duplicate(message.to_string());
            }
        }
        AppError::DatabaseError(error)
    }
}
