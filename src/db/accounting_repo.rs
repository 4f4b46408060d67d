// src/db/accounting_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::accounting::{Expense, LedgerEntryType, Revenue},
    models::payroll::PaymentMethod,
};

#[derive(Clone)]
pub struct AccountingRepository {
    pool: PgPool,
}

impl AccountingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        entry_type: LedgerEntryType,
        category: &str,
        amount: Decimal,
        entry_date: NaiveDate,
        description: &str,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (
                entry_type, category, amount, entry_date,
                description, payment_method, payment_reference
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(entry_type)
        .bind(category)
        .bind(amount)
        .bind(entry_date)
        .bind(description)
        .bind(payment_method)
        .bind(payment_reference)
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_revenue<'e, E>(
        &self,
        executor: E,
        entry_type: LedgerEntryType,
        category: &str,
        amount: Decimal,
        entry_date: NaiveDate,
        description: &str,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> Result<Revenue, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let revenue = sqlx::query_as::<_, Revenue>(
            r#"
            INSERT INTO revenues (
                entry_type, category, amount, entry_date,
                description, payment_method, payment_reference
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(entry_type)
        .bind(category)
        .bind(amount)
        .bind(entry_date)
        .bind(description)
        .bind(payment_method)
        .bind(payment_reference)
        .fetch_one(executor)
        .await?;

        Ok(revenue)
    }
}
