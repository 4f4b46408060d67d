// src/models/accounting.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::payroll::PaymentMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ledger_entry_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    Payroll,
    CasualPayment,
    EmployeeDeduction,
}

/// Lançamento de despesa do razão contábil (dinheiro que saiu).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub entry_type: LedgerEntryType,
    #[schema(example = "Pagamentos de casuais")]
    pub category: String,
    #[schema(example = "2000.00")]
    pub amount: Decimal,
    pub entry_date: NaiveDate,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub created_at: DateTime<Utc>,
}

/// Lançamento de receita (fundos retidos via desconto).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: Uuid,
    pub entry_type: LedgerEntryType,
    #[schema(example = "Descontos de funcionários")]
    pub category: String,
    #[schema(example = "1000.00")]
    pub amount: Decimal,
    pub entry_date: NaiveDate,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub created_at: DateTime<Utc>,
}
