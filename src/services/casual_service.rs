// src/services/casual_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, CasualPaymentRepository, EmployeeRepository},
    models::assignment::AssignmentStatus,
    models::casual::{
        new_payment_number, CasualPayment, CasualPaymentDeduction, CasualPaymentStatus,
        PaymentFrequency,
    },
    models::employee::Employee,
    models::payroll::PaymentMethod,
    services::accounting_service::AccountingService,
};

#[derive(Clone)]
pub struct CasualPaymentService {
    repo: CasualPaymentRepository,
    employee_repo: EmployeeRepository,
    assignment_repo: AssignmentRepository,
    accounting_service: AccountingService,
}

impl CasualPaymentService {
    pub fn new(
        repo: CasualPaymentRepository,
        employee_repo: EmployeeRepository,
        assignment_repo: AssignmentRepository,
        accounting_service: AccountingService,
    ) -> Self {
        Self {
            repo,
            employee_repo,
            assignment_repo,
            accounting_service,
        }
    }

    /// Cria um pagamento avulso já calculado.
    ///
    /// As horas vêm de uma das duas fontes: os agendamentos concluídos
    /// informados (o rastreador alimenta o razão) ou o total explícito do
    /// chamador. Uma das duas é obrigatória.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        employee_id: Uuid,
        payment_frequency: PaymentFrequency,
        period_start_date: NaiveDate,
        period_end_date: NaiveDate,
        total_hours_worked: Option<Decimal>,
        hourly_rate: Option<Decimal>,
        work_assignment_ids: &[Uuid],
        notes: &str,
    ) -> Result<CasualPayment, AppError> {
        if period_start_date > period_end_date {
            return Err(AppError::Validation(
                "Data inicial não pode ser posterior à final".into(),
            ));
        }

        let mut tx = self.repo.pool().begin().await?;
        let employee = self
            .employee_repo
            .get_employee(&mut *tx, employee_id)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))?;
        if !employee.employment_type.is_hourly() {
            return Err(AppError::Validation(
                "Pagamento avulso só se aplica a funcionários horistas".into(),
            ));
        }

        let hours = if work_assignment_ids.is_empty() {
            match total_hours_worked {
                Some(hours) if hours > Decimal::ZERO => hours,
                _ => {
                    return Err(AppError::Validation(
                        "Informe as horas trabalhadas ou os agendamentos concluídos".into(),
                    ));
                }
            }
        } else {
            self.sum_assignment_hours(&mut tx, employee_id, work_assignment_ids)
                .await?
        };

        let rate = match hourly_rate {
            Some(rate) if rate > Decimal::ZERO => rate,
            Some(_) => {
                return Err(AppError::Validation(
                    "Tarifa horária deve ser maior que zero".into(),
                ));
            }
            None => self.resolve_hourly_rate(&mut tx, &employee, period_end_date).await?,
        };

        let base_amount = (hours * rate).round_dp(2);

        let payment = self
            .repo
            .create(
                &mut *tx,
                employee_id,
                &new_payment_number(),
                payment_frequency,
                period_start_date,
                period_end_date,
                hours,
                rate,
                base_amount,
                base_amount,
                base_amount,
                base_amount,
                notes,
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            payment_number = %payment.payment_number,
            employee_id = %employee_id,
            net_amount = %payment.net_amount,
            "pagamento avulso criado"
        );
        Ok(payment)
    }

    async fn sum_assignment_hours(
        &self,
        conn: &mut PgConnection,
        employee_id: Uuid,
        assignment_ids: &[Uuid],
    ) -> Result<Decimal, AppError> {
        let mut total = Decimal::ZERO;
        for assignment_id in assignment_ids {
            let assignment = self
                .assignment_repo
                .get(&mut *conn, *assignment_id)
                .await?
                .ok_or(AppError::NotFound("Agendamento"))?;

            if assignment.employee_id != employee_id {
                return Err(AppError::Validation(format!(
                    "Agendamento {} pertence a outro funcionário",
                    assignment.assignment_number
                )));
            }
            if assignment.status != AssignmentStatus::Completed {
                return Err(AppError::Validation(format!(
                    "Agendamento {} ainda não foi concluído",
                    assignment.assignment_number
                )));
            }

            total += assignment.actual_hours.unwrap_or(assignment.expected_hours);
        }

        if total <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Agendamentos informados não somam horas trabalhadas".into(),
            ));
        }
        Ok(total)
    }

    async fn resolve_hourly_rate(
        &self,
        conn: &mut PgConnection,
        employee: &Employee,
        reference_date: NaiveDate,
    ) -> Result<Decimal, AppError> {
        if let Some(rate_id) = employee.rate_structure_id {
            if let Some(rate) = self.employee_repo.get_rate_structure(&mut *conn, rate_id).await? {
                if rate.is_effective_on(reference_date) {
                    return Ok(rate.calculate_rate(Some(reference_date), Decimal::ONE));
                }
            }
        }

        Ok(employee.fallback_payment(Decimal::ONE))
    }

    pub async fn get(&self, id: Uuid) -> Result<CasualPayment, AppError> {
        self.repo
            .get(self.repo.pool(), id)
            .await?
            .ok_or(AppError::NotFound("Pagamento avulso"))
    }

    pub async fn list(
        &self,
        employee_id: Option<Uuid>,
        status: Option<CasualPaymentStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CasualPayment>, AppError> {
        self.repo
            .list(self.repo.pool(), employee_id, status, from, to)
            .await
    }

    pub async fn list_deductions(
        &self,
        payment_id: Uuid,
    ) -> Result<Vec<CasualPaymentDeduction>, AppError> {
        // garante 404 para id inexistente
        self.get(payment_id).await?;
        self.repo.list_deductions(self.repo.pool(), payment_id).await
    }

    /// Registra um desconto no razão e atualiza os valores em cache do
    /// pagamento, tudo na mesma transação sob trava da linha.
    pub async fn add_deduction(
        &self,
        payment_id: Uuid,
        category: &str,
        amount: Decimal,
        reason: &str,
        description: &str,
    ) -> Result<(CasualPayment, CasualPaymentDeduction), AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Valor do desconto deve ser maior que zero".into(),
            ));
        }

        let mut tx = self.repo.pool().begin().await?;
        let mut payment = self
            .repo
            .get_for_update(&mut *tx, payment_id)
            .await?
            .ok_or(AppError::NotFound("Pagamento avulso"))?;

        if payment.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "Pagamento quitado ou cancelado não aceita descontos".into(),
            ));
        }

        let deduction = self
            .repo
            .insert_deduction(&mut *tx, payment_id, category, amount, reason, description)
            .await?;

        payment.apply_deduction(amount);
        let payment = self.repo.update_amounts(&mut *tx, &payment).await?;
        tx.commit().await?;

        tracing::info!(
            payment_number = %payment.payment_number,
            amount = %amount,
            category = %category,
            "desconto registrado"
        );
        Ok((payment, deduction))
    }

    pub async fn approve(
        &self,
        payment_id: Uuid,
        approved_by: Option<Uuid>,
    ) -> Result<CasualPayment, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let payment = self
            .repo
            .get_for_update(&mut *tx, payment_id)
            .await?
            .ok_or(AppError::NotFound("Pagamento avulso"))?;

        if payment.status != CasualPaymentStatus::Pending {
            return Err(AppError::InvalidTransition(
                "Só pagamentos pendentes podem ser aprovados".into(),
            ));
        }

        let payment = self
            .repo
            .approve(&mut *tx, payment_id, approved_by, Utc::now())
            .await?;
        tx.commit().await?;

        Ok(payment)
    }

    /// Quita o pagamento, por inteiro ou parcialmente, e materializa os
    /// lançamentos contábeis na mesma transação.
    ///
    /// Valor parcial maior ou igual ao líquido vale como quitação integral;
    /// menor, o restante fica retido e o status vira `partially_paid`.
    pub async fn pay(
        &self,
        payment_id: Uuid,
        partial_amount: Option<Decimal>,
        payment_date: NaiveDate,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> Result<CasualPayment, AppError> {
        if let Some(partial) = partial_amount {
            if partial <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "Valor parcial deve ser maior que zero".into(),
                ));
            }
        }

        let mut tx = self.repo.pool().begin().await?;
        let mut payment = self
            .repo
            .get_for_update(&mut *tx, payment_id)
            .await?
            .ok_or(AppError::NotFound("Pagamento avulso"))?;

        if payment.status != CasualPaymentStatus::Approved {
            return Err(AppError::InvalidTransition(
                "Só pagamentos aprovados podem ser quitados".into(),
            ));
        }

        payment.settle(partial_amount);
        let mut payment = self
            .repo
            .settle(
                &mut *tx,
                payment_id,
                payment.status,
                payment.amount_paid,
                payment.amount_held,
                payment_date,
                payment_method,
                payment_reference,
            )
            .await?;

        let employee = self
            .employee_repo
            .get_employee(&mut *tx, payment.employee_id)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))?;

        // Ponte contábil, exatamente uma vez por vínculo. Reexecução com os
        // vínculos já gravados não faz nada.
        let mut expense_id = None;
        if payment.expense_id.is_none() && payment.amount_paid > Decimal::ZERO {
            let expense = self
                .accounting_service
                .record_casual_expense(&mut *tx, &payment, &employee)
                .await?;
            expense_id = Some(expense.id);
        }
        let mut revenue_id = None;
        if payment.revenue_id.is_none() && payment.total_deductions > Decimal::ZERO {
            let revenue = self
                .accounting_service
                .record_deduction_revenue(&mut *tx, &payment, &employee)
                .await?;
            revenue_id = Some(revenue.id);
        }
        if expense_id.is_some() || revenue_id.is_some() {
            self.repo
                .set_ledger_links(&mut *tx, payment_id, expense_id, revenue_id)
                .await?;
            payment.expense_id = payment.expense_id.or(expense_id);
            payment.revenue_id = payment.revenue_id.or(revenue_id);
        }

        tx.commit().await?;

        tracing::info!(
            payment_number = %payment.payment_number,
            amount_paid = %payment.amount_paid,
            amount_held = %payment.amount_held,
            status = ?payment.status,
            "pagamento avulso quitado"
        );
        Ok(payment)
    }

    pub async fn cancel(&self, payment_id: Uuid, reason: &str) -> Result<CasualPayment, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let payment = self
            .repo
            .get_for_update(&mut *tx, payment_id)
            .await?
            .ok_or(AppError::NotFound("Pagamento avulso"))?;

        if payment.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "Pagamento quitado ou cancelado não pode ser cancelado".into(),
            ));
        }

        let payment = self.repo.cancel(&mut *tx, payment_id, reason).await?;
        tx.commit().await?;

        Ok(payment)
    }
}
