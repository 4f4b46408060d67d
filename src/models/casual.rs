// src/models/casual.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::payroll::PaymentMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "casual_payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CasualPaymentStatus {
    Pending,
    Approved,
    Paid,
    PartiallyPaid,
    Cancelled,
}

impl CasualPaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::PartiallyPaid | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_frequency", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Project,
}

/// Acerto de um funcionário casual sobre uma janela de período.
///
/// `total_deductions` é o cache da soma do razão de descontos
/// (`casual_payment_deductions`); todo recálculo parte dele.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CasualPayment {
    pub id: Uuid,
    pub employee_id: Uuid,
    #[schema(example = "CP-20250812-A41B2C")]
    pub payment_number: String,
    pub payment_frequency: PaymentFrequency,
    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,
    #[schema(example = "8.50")]
    pub total_hours_worked: Decimal,
    #[schema(example = "500.00")]
    pub hourly_rate: Decimal,
    #[schema(example = "4250.00")]
    pub base_amount: Decimal,
    #[schema(example = "1000.00")]
    pub total_deductions: Decimal,
    pub gross_amount: Decimal,
    #[schema(example = "3250.00")]
    pub net_amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_held: Decimal,
    pub status: CasualPaymentStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    // Vínculos contábeis um-para-um, criados uma única vez cada
    pub expense_id: Option<Uuid>,
    pub revenue_id: Option<Uuid>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CasualPayment {
    /// Recalcula todos os componentes do pagamento e devolve o líquido.
    ///
    /// Deve ser reinvocado após qualquer mutação de desconto. Mantém os
    /// invariantes `amount_paid + amount_held == net_amount` e
    /// `0 <= amount_paid <= net_amount`.
    pub fn recalculate(&mut self) -> Decimal {
        self.base_amount = self.total_hours_worked * self.hourly_rate;
        self.gross_amount = self.base_amount;
        self.net_amount = self.gross_amount - self.total_deductions;
        self.amount_paid = self.amount_paid.min(self.net_amount);
        self.amount_held = self.net_amount - self.amount_paid;
        self.net_amount
    }

    /// Incorpora um desconto recém-lançado no razão. O razão em si é
    /// append-only; estorno é um novo lançamento, nunca edição do histórico.
    pub fn apply_deduction(&mut self, amount: Decimal) {
        self.total_deductions += amount;
        self.recalculate();
    }

    /// Liquidação total ou parcial. Parcial menor que o líquido deixa o
    /// restante retido; qualquer outro caso liquida integralmente.
    pub fn settle(&mut self, partial_amount: Option<Decimal>) {
        match partial_amount {
            Some(partial) if partial < self.net_amount => {
                self.amount_paid = partial;
                self.amount_held = self.net_amount - partial;
                self.status = CasualPaymentStatus::PartiallyPaid;
            }
            _ => {
                self.amount_paid = self.net_amount;
                self.amount_held = Decimal::ZERO;
                self.status = CasualPaymentStatus::Paid;
            }
        }
    }
}

/// Lançamento imutável do razão de descontos. Só existe INSERT.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CasualPaymentDeduction {
    pub id: Uuid,
    pub casual_payment_id: Uuid,
    #[schema(example = "advance")]
    pub category: String,
    #[schema(example = "1000.00")]
    pub amount: Decimal,
    #[schema(example = "Adiantamento salarial")]
    pub reason: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Identificador no formato CP-YYYYMMDD-XXXXXX.
pub fn new_payment_number() -> String {
    let date_part = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("CP-{}-{}", date_part, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(hours: Decimal, rate: Decimal) -> CasualPayment {
        let mut payment = CasualPayment {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            payment_number: new_payment_number(),
            payment_frequency: PaymentFrequency::Daily,
            period_start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            period_end_date: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            total_hours_worked: hours,
            hourly_rate: rate,
            base_amount: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            gross_amount: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            amount_held: Decimal::ZERO,
            status: CasualPaymentStatus::Pending,
            payment_date: None,
            payment_method: PaymentMethod::Cash,
            payment_reference: String::new(),
            approved_by: None,
            approved_at: None,
            expense_id: None,
            revenue_id: None,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        payment.recalculate();
        payment
    }

    #[test]
    fn cenario_completo_do_acerto_casual() {
        // 8.5h x 500 = 4250; desconto de 1000; parcial de 2000
        let mut payment = payment(Decimal::new(85, 1), Decimal::from(500));
        assert_eq!(payment.base_amount, Decimal::from(4_250));
        assert_eq!(payment.gross_amount, Decimal::from(4_250));

        payment.apply_deduction(Decimal::from(1_000));
        assert_eq!(payment.total_deductions, Decimal::from(1_000));
        assert_eq!(payment.net_amount, Decimal::from(3_250));

        payment.settle(Some(Decimal::from(2_000)));
        assert_eq!(payment.status, CasualPaymentStatus::PartiallyPaid);
        assert_eq!(payment.amount_paid, Decimal::from(2_000));
        assert_eq!(payment.amount_held, Decimal::from(1_250));
    }

    #[test]
    fn pago_e_retido_sempre_somam_o_liquido() {
        let mut payment = payment(Decimal::from(10), Decimal::from(300));
        payment.apply_deduction(Decimal::from(450));
        assert_eq!(payment.amount_paid + payment.amount_held, payment.net_amount);

        payment.settle(Some(Decimal::from(1_000)));
        assert_eq!(payment.amount_paid + payment.amount_held, payment.net_amount);

        payment.recalculate();
        assert_eq!(payment.amount_paid + payment.amount_held, payment.net_amount);
    }

    #[test]
    fn recalculo_grampeia_pago_no_liquido() {
        let mut payment = payment(Decimal::from(10), Decimal::from(300));
        payment.settle(None);
        assert_eq!(payment.amount_paid, Decimal::from(3_000));

        // um desconto lançado depois da liquidação reduz o líquido;
        // o valor pago é grampeado e nada fica "retido negativo"
        payment.apply_deduction(Decimal::from(500));
        assert_eq!(payment.net_amount, Decimal::from(2_500));
        assert_eq!(payment.amount_paid, Decimal::from(2_500));
        assert_eq!(payment.amount_held, Decimal::ZERO);
    }

    #[test]
    fn parcial_igual_ou_maior_que_liquido_liquida_integral() {
        let mut payment = payment(Decimal::from(8), Decimal::from(500));
        payment.settle(Some(Decimal::from(4_000)));
        assert_eq!(payment.status, CasualPaymentStatus::Paid);
        assert_eq!(payment.amount_paid, Decimal::from(4_000));
        assert_eq!(payment.amount_held, Decimal::ZERO);
    }

    #[test]
    fn status_terminais() {
        assert!(CasualPaymentStatus::Paid.is_terminal());
        assert!(CasualPaymentStatus::PartiallyPaid.is_terminal());
        assert!(CasualPaymentStatus::Cancelled.is_terminal());
        assert!(!CasualPaymentStatus::Pending.is_terminal());
        assert!(!CasualPaymentStatus::Approved.is_terminal());
    }
}
