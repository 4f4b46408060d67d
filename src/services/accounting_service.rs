// src/services/accounting_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::AccountingRepository,
    models::accounting::{Expense, LedgerEntryType, Revenue},
    models::casual::CasualPayment,
    models::employee::Employee,
    models::payroll::EmployeePayroll,
};

/// Ponte entre a folha e o razão contábil.
///
/// Este serviço só cria os lançamentos; a garantia de exatamente-um por
/// pagamento vem do chamador, que segura a trava da linha de origem e grava
/// o vínculo (expense_id / revenue_id) na mesma transação.
#[derive(Clone)]
pub struct AccountingService {
    repo: AccountingRepository,
}

impl AccountingService {
    pub fn new(repo: AccountingRepository) -> Self {
        Self { repo }
    }

    /// Despesa do valor líquido de uma folha marcada como paga.
    pub async fn record_payroll_expense<'e, E>(
        &self,
        executor: E,
        payroll: &EmployeePayroll,
        employee: &Employee,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment_date = payroll
            .payment_date
            .ok_or_else(|| AppError::Validation("Folha paga sem data de pagamento".into()))?;
        let description = format!(
            "Folha de pagamento - {} ({})",
            employee.full_name, payroll.id
        );

        self.repo
            .create_expense(
                executor,
                LedgerEntryType::Payroll,
                "Folha de pagamento",
                payroll.net_pay,
                payment_date,
                &description,
                payroll.payment_method,
                &payroll.payment_reference,
            )
            .await
    }

    /// Despesa do valor efetivamente desembolsado de um pagamento avulso.
    pub async fn record_casual_expense<'e, E>(
        &self,
        executor: E,
        payment: &CasualPayment,
        employee: &Employee,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment_date = payment
            .payment_date
            .ok_or_else(|| AppError::Validation("Pagamento quitado sem data de pagamento".into()))?;
        let description = format!(
            "Pagamento avulso {} - {}",
            payment.payment_number, employee.full_name
        );

        self.repo
            .create_expense(
                executor,
                LedgerEntryType::CasualPayment,
                "Pagamentos de casuais",
                payment.amount_paid,
                payment_date,
                &description,
                payment.payment_method,
                &payment.payment_reference,
            )
            .await
    }

    /// Receita dos descontos retidos de um pagamento avulso quitado.
    pub async fn record_deduction_revenue<'e, E>(
        &self,
        executor: E,
        payment: &CasualPayment,
        employee: &Employee,
    ) -> Result<Revenue, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment_date = payment
            .payment_date
            .ok_or_else(|| AppError::Validation("Pagamento quitado sem data de pagamento".into()))?;
        let description = format!(
            "Descontos retidos do pagamento avulso {} - {}",
            payment.payment_number, employee.full_name
        );

        self.repo
            .create_revenue(
                executor,
                LedgerEntryType::EmployeeDeduction,
                "Descontos de funcionários",
                payment.total_deductions,
                payment_date,
                &description,
                payment.payment_method,
                &payment.payment_reference,
            )
            .await
    }
}
