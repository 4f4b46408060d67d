// src/services/payroll_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgConnection;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentRepository, EmployeeRepository, PayrollRepository},
    models::employee::Employee,
    models::payroll::{
        calculate_amounts, DeductionCategory, DeductionType, EmployeePayroll, PayrollItem,
        PayrollItemType, PayrollPeriod, PayrollStatus, PaymentMethod, PeriodStatus,
    },
    services::accounting_service::AccountingService,
};

/// Resultado do processamento em lote de um período.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: Vec<FailedEmployee>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedEmployee {
    pub employee_id: Uuid,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub period: PayrollPeriod,
    pub employee_count: i64,
    pub total_net_pay: Decimal,
}

#[derive(Clone)]
pub struct PayrollService {
    repo: PayrollRepository,
    employee_repo: EmployeeRepository,
    assignment_repo: AssignmentRepository,
    accounting_service: AccountingService,
}

impl PayrollService {
    pub fn new(
        repo: PayrollRepository,
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

    // =========================================================================
    //  CATEGORIAS E ITENS
    // =========================================================================

    pub async fn create_deduction_category(
        &self,
        name: &str,
        deduction_type: DeductionType,
        description: &str,
        affects_accounting: bool,
    ) -> Result<DeductionCategory, AppError> {
        self.repo
            .create_deduction_category(
                self.repo.pool(),
                name,
                deduction_type,
                description,
                affects_accounting,
            )
            .await
    }

    pub async fn list_deduction_categories(&self) -> Result<Vec<DeductionCategory>, AppError> {
        self.repo.list_deduction_categories(self.repo.pool()).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_payroll_item(
        &self,
        name: &str,
        item_type: PayrollItemType,
        amount: Decimal,
        percentage: Decimal,
        is_percentage: bool,
        applicable_employment_types: &[crate::models::employee::EmploymentType],
        branch_id: Option<Uuid>,
        deduction_category_id: Option<Uuid>,
    ) -> Result<PayrollItem, AppError> {
        if is_percentage {
            if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
                return Err(AppError::Validation(
                    "Percentual deve estar entre 0 e 100".into(),
                ));
            }
        } else if amount < Decimal::ZERO {
            return Err(AppError::Validation("Valor não pode ser negativo".into()));
        }

        self.repo
            .create_payroll_item(
                self.repo.pool(),
                name,
                item_type,
                amount,
                percentage,
                is_percentage,
                applicable_employment_types,
                branch_id,
                deduction_category_id,
            )
            .await
    }

    pub async fn list_payroll_items(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<PayrollItem>, AppError> {
        self.repo.list_payroll_items(self.repo.pool(), branch_id).await
    }

    // =========================================================================
    //  PERÍODOS
    // =========================================================================

    /// Idempotente: o mesmo intervalo + filial sempre devolve o mesmo
    /// período. O booleano indica se a linha foi criada nesta chamada.
    pub async fn create_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        branch_id: Option<Uuid>,
        notes: &str,
    ) -> Result<(PayrollPeriod, bool), AppError> {
        if start_date > end_date {
            return Err(AppError::Validation(
                "Data inicial não pode ser posterior à final".into(),
            ));
        }

        self.repo
            .get_or_create_period(self.repo.pool(), start_date, end_date, branch_id, notes)
            .await
    }

    pub async fn get_period(&self, id: Uuid) -> Result<PayrollPeriod, AppError> {
        self.repo
            .get_period(self.repo.pool(), id)
            .await?
            .ok_or(AppError::NotFound("Período"))
    }

    pub async fn list_periods(
        &self,
        status: Option<PeriodStatus>,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<PayrollPeriod>, AppError> {
        self.repo.list_periods(self.repo.pool(), status, branch_id).await
    }

    pub async fn period_summary(&self, id: Uuid) -> Result<PeriodSummary, AppError> {
        let period = self.get_period(id).await?;
        let (total_net_pay, employee_count) =
            self.repo.period_totals(self.repo.pool(), id).await?;

        Ok(PeriodSummary {
            period,
            employee_count,
            total_net_pay,
        })
    }

    pub async fn delete_period(&self, id: Uuid) -> Result<(), AppError> {
        let period = self.get_period(id).await?;
        if period.status != PeriodStatus::Draft {
            return Err(AppError::InvalidTransition(
                "Só períodos em rascunho podem ser excluídos".into(),
            ));
        }

        self.repo.soft_delete_period(self.repo.pool(), id).await?;
        Ok(())
    }

    /// Processa um período: garante uma folha por funcionário ativo da filial
    /// e recalcula as que ainda não foram aprovadas.
    ///
    /// Cada funcionário roda na própria transação. Uma falha individual entra
    /// no relatório e não derruba o lote, que pode ser reexecutado: folhas já
    /// aprovadas ou pagas são puladas, nunca recalculadas.
    pub async fn process_period(&self, period_id: Uuid) -> Result<ProcessOutcome, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let period = self
            .repo
            .get_period(&mut *tx, period_id)
            .await?
            .ok_or(AppError::NotFound("Período"))?;

        let period = match period.status {
            PeriodStatus::Draft => {
                self.repo
                    .update_period_status(&mut *tx, period_id, PeriodStatus::Processing)
                    .await?
            }
            PeriodStatus::Processing => period,
            PeriodStatus::Completed | PeriodStatus::Closed => {
                return Err(AppError::InvalidTransition(
                    "Período concluído ou fechado não pode ser reprocessado".into(),
                ));
            }
        };
        tx.commit().await?;

        let employees = self
            .employee_repo
            .list_active_employees(self.repo.pool(), period.branch_id)
            .await?;

        let mut outcome = ProcessOutcome::default();
        for employee in &employees {
            match self.process_employee(&period, employee).await {
                Ok(ProcessedAs::Created) => outcome.created += 1,
                Ok(ProcessedAs::Updated) => outcome.updated += 1,
                Ok(ProcessedAs::Skipped) => outcome.skipped += 1,
                Err(err) => {
                    tracing::warn!(
                        employee_id = %employee.id,
                        period_id = %period.id,
                        error = %err,
                        "falha ao processar folha do funcionário"
                    );
                    outcome.failed.push(FailedEmployee {
                        employee_id: employee.id,
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            period_id = %period.id,
            created = outcome.created,
            updated = outcome.updated,
            skipped = outcome.skipped,
            failed = outcome.failed.len(),
            "processamento do período concluído"
        );
        Ok(outcome)
    }

    async fn process_employee(
        &self,
        period: &PayrollPeriod,
        employee: &Employee,
    ) -> Result<ProcessedAs, AppError> {
        let mut tx = self.repo.pool().begin().await?;

        let (payroll, created) = self
            .repo
            .upsert_employee_payroll(&mut *tx, employee.id, period.id, employee.rate_structure_id)
            .await?;

        if !created && !payroll.status.blocks_period_close() {
            // aprovada, paga ou cancelada: o reprocessamento não mexe
            tx.rollback().await?;
            return Ok(ProcessedAs::Skipped);
        }

        self.calculate_into(&mut tx, employee, period, payroll.id).await?;
        tx.commit().await?;

        Ok(if created {
            ProcessedAs::Created
        } else {
            ProcessedAs::Updated
        })
    }

    /// Calcula os valores de uma folha e persiste na transação corrente.
    ///
    /// Resolução da tarifa: estrutura da folha, senão a do funcionário,
    /// desde que vigente no fim do período; sem tarifa vigente vale o
    /// fallback do salário cadastrado.
    async fn calculate_into(
        &self,
        conn: &mut PgConnection,
        employee: &Employee,
        period: &PayrollPeriod,
        payroll_id: Uuid,
    ) -> Result<EmployeePayroll, AppError> {
        let payroll = self
            .repo
            .get_employee_payroll(&mut *conn, payroll_id)
            .await?
            .ok_or(AppError::NotFound("Folha"))?;

        let rate = match payroll.rate_structure_id.or(employee.rate_structure_id) {
            Some(rate_id) => self.employee_repo.get_rate_structure(&mut *conn, rate_id).await?,
            None => None,
        };
        let rate = rate.filter(|r| r.is_effective_on(period.end_date));

        let basic_salary = if employee.employment_type.is_hourly() {
            // horistas ganham pelo que trabalharam: agendamentos concluídos
            // dentro do período
            let assignments = self
                .assignment_repo
                .completed_in_range(&mut *conn, employee.id, period.start_date, period.end_date)
                .await?;

            match &rate {
                Some(rate) => assignments
                    .iter()
                    .map(|a| {
                        a.total_payment.unwrap_or_else(|| {
                            let hours = a.actual_hours.unwrap_or(a.expected_hours);
                            rate.calculate_rate(Some(a.work_date), hours)
                        })
                    })
                    .sum::<Decimal>(),
                None => {
                    let hours: Decimal = assignments
                        .iter()
                        .map(|a| a.actual_hours.unwrap_or(a.expected_hours))
                        .sum();
                    employee.fallback_payment(hours)
                }
            }
        } else {
            match &rate {
                Some(rate) => rate.calculate_rate(Some(period.end_date), Decimal::ZERO),
                None => employee.salary,
            }
        };

        let items = self
            .repo
            .get_active_items_by_types(
                &mut *conn,
                &[
                    PayrollItemType::Allowance,
                    PayrollItemType::Bonus,
                    PayrollItemType::Deduction,
                    PayrollItemType::Tax,
                ],
            )
            .await?;

        let amounts = calculate_amounts(employee, basic_salary, &items);
        self.repo
            .update_payroll_amounts(
                &mut *conn,
                payroll.id,
                rate.as_ref().map(|r| r.id),
                &amounts,
            )
            .await
    }

    /// Aprova todas as folhas calculadas e marca o período como concluído.
    pub async fn approve_period(&self, period_id: Uuid) -> Result<(PayrollPeriod, u32), AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let period = self
            .repo
            .get_period(&mut *tx, period_id)
            .await?
            .ok_or(AppError::NotFound("Período"))?;

        if period.status != PeriodStatus::Processing {
            return Err(AppError::InvalidTransition(
                "Só períodos em processamento podem ser aprovados".into(),
            ));
        }

        let drafts = self
            .repo
            .list_payrolls_for_period(&mut *tx, period_id, Some(PayrollStatus::Draft))
            .await?;
        if !drafts.is_empty() {
            return Err(AppError::Validation(format!(
                "{} folha(s) ainda sem cálculo; processe o período antes de aprovar",
                drafts.len()
            )));
        }

        let calculated = self
            .repo
            .list_payrolls_for_period(&mut *tx, period_id, Some(PayrollStatus::Calculated))
            .await?;
        let mut approved = 0u32;
        for payroll in &calculated {
            self.repo
                .update_payroll_status(&mut *tx, payroll.id, PayrollStatus::Approved)
                .await?;
            approved += 1;
        }

        let period = self
            .repo
            .update_period_status(&mut *tx, period_id, PeriodStatus::Completed)
            .await?;
        tx.commit().await?;

        tracing::info!(period_id = %period.id, approved, "período aprovado");
        Ok((period, approved))
    }

    /// Paga todas as folhas aprovadas do período em uma transação só, com o
    /// lançamento de despesa de cada uma na mesma transação.
    pub async fn pay_all(
        &self,
        period_id: Uuid,
        payment_date: NaiveDate,
        payment_method: PaymentMethod,
    ) -> Result<u32, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let period = self
            .repo
            .get_period(&mut *tx, period_id)
            .await?
            .ok_or(AppError::NotFound("Período"))?;

        if period.status != PeriodStatus::Completed {
            return Err(AppError::InvalidTransition(
                "Só períodos concluídos podem ser pagos em lote".into(),
            ));
        }

        let approved = self
            .repo
            .list_payrolls_for_period(&mut *tx, period_id, Some(PayrollStatus::Approved))
            .await?;

        let mut paid = 0u32;
        for payroll in &approved {
            let reference = format!("FOLHA-{}", payroll.id.simple());
            let mut updated = self
                .repo
                .mark_payroll_paid(&mut *tx, payroll.id, payment_date, payment_method, &reference)
                .await?;

            if updated.needs_expense_entry() {
                let employee = self
                    .employee_repo
                    .get_employee(&mut *tx, updated.employee_id)
                    .await?
                    .ok_or(AppError::NotFound("Funcionário"))?;
                let expense = self
                    .accounting_service
                    .record_payroll_expense(&mut *tx, &updated, &employee)
                    .await?;
                self.repo
                    .set_payroll_expense(&mut *tx, updated.id, expense.id)
                    .await?;
                updated.expense_id = Some(expense.id);
            }
            paid += 1;
        }

        tx.commit().await?;
        tracing::info!(period_id = %period_id, paid, "pagamento em lote concluído");
        Ok(paid)
    }

    /// Fecha o período. Falha apontando o que bloqueia: folhas em rascunho ou
    /// calculadas, ou folhas aprovadas ainda não pagas.
    pub async fn close_period(&self, period_id: Uuid) -> Result<PayrollPeriod, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let period = self
            .repo
            .get_period(&mut *tx, period_id)
            .await?
            .ok_or(AppError::NotFound("Período"))?;

        if period.status != PeriodStatus::Completed {
            return Err(AppError::InvalidTransition(
                "Só períodos concluídos podem ser fechados".into(),
            ));
        }

        let blocking = self.repo.list_blocking_payrolls(&mut *tx, period_id).await?;
        if !blocking.is_empty() {
            let ids = blocking
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::Validation(format!(
                "{} folha(s) ainda não aprovadas bloqueiam o fechamento: {}",
                blocking.len(),
                ids
            )));
        }

        let unpaid = self.repo.count_unpaid_approved(&mut *tx, period_id).await?;
        if unpaid > 0 {
            return Err(AppError::Validation(format!(
                "{} folha(s) aprovadas ainda não foram pagas",
                unpaid
            )));
        }

        let period = self
            .repo
            .update_period_status(&mut *tx, period_id, PeriodStatus::Closed)
            .await?;
        tx.commit().await?;

        tracing::info!(period_id = %period.id, "período fechado");
        Ok(period)
    }

    // =========================================================================
    //  FOLHAS INDIVIDUAIS
    // =========================================================================

    pub async fn get_employee_payroll(&self, id: Uuid) -> Result<EmployeePayroll, AppError> {
        self.repo
            .get_employee_payroll(self.repo.pool(), id)
            .await?
            .ok_or(AppError::NotFound("Folha"))
    }

    pub async fn list_payrolls_for_period(
        &self,
        period_id: Uuid,
        status: Option<PayrollStatus>,
    ) -> Result<Vec<EmployeePayroll>, AppError> {
        self.repo
            .list_payrolls_for_period(self.repo.pool(), period_id, status)
            .await
    }

    /// Recalcula uma folha individual. Só folhas em rascunho ou calculadas
    /// aceitam recálculo; o período não pode estar fechado.
    pub async fn calculate_employee_payroll(
        &self,
        payroll_id: Uuid,
    ) -> Result<EmployeePayroll, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let payroll = self
            .repo
            .get_employee_payroll(&mut *tx, payroll_id)
            .await?
            .ok_or(AppError::NotFound("Folha"))?;

        if !payroll.status.blocks_period_close() {
            return Err(AppError::InvalidTransition(
                "Folha aprovada, paga ou cancelada não aceita recálculo".into(),
            ));
        }

        let period = self
            .repo
            .get_period(&mut *tx, payroll.payroll_period_id)
            .await?
            .ok_or(AppError::NotFound("Período"))?;
        if period.status == PeriodStatus::Closed {
            return Err(AppError::InvalidTransition("Período já fechado".into()));
        }

        let employee = self
            .employee_repo
            .get_employee(&mut *tx, payroll.employee_id)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))?;

        let updated = self
            .calculate_into(&mut tx, &employee, &period, payroll.id)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn approve_payroll(&self, payroll_id: Uuid) -> Result<EmployeePayroll, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let payroll = self
            .repo
            .get_employee_payroll_for_update(&mut *tx, payroll_id)
            .await?
            .ok_or(AppError::NotFound("Folha"))?;

        if payroll.status != PayrollStatus::Calculated {
            return Err(AppError::InvalidTransition(
                "Só folhas calculadas podem ser aprovadas".into(),
            ));
        }

        let updated = self
            .repo
            .update_payroll_status(&mut *tx, payroll_id, PayrollStatus::Approved)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Marca a folha como paga e materializa a despesa correspondente.
    ///
    /// A trava de linha + vínculo único `expense_id` garantem exatamente um
    /// lançamento por folha, mesmo com confirmações concorrentes.
    pub async fn mark_payroll_paid(
        &self,
        payroll_id: Uuid,
        payment_date: NaiveDate,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> Result<EmployeePayroll, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let payroll = self
            .repo
            .get_employee_payroll_for_update(&mut *tx, payroll_id)
            .await?
            .ok_or(AppError::NotFound("Folha"))?;

        if payroll.status != PayrollStatus::Approved {
            return Err(AppError::InvalidTransition(
                "Só folhas aprovadas podem ser pagas".into(),
            ));
        }

        let mut updated = self
            .repo
            .mark_payroll_paid(&mut *tx, payroll_id, payment_date, payment_method, payment_reference)
            .await?;

        if updated.needs_expense_entry() {
            let employee = self
                .employee_repo
                .get_employee(&mut *tx, updated.employee_id)
                .await?
                .ok_or(AppError::NotFound("Funcionário"))?;
            let expense = self
                .accounting_service
                .record_payroll_expense(&mut *tx, &updated, &employee)
                .await?;
            self.repo
                .set_payroll_expense(&mut *tx, updated.id, expense.id)
                .await?;
            updated.expense_id = Some(expense.id);
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn cancel_payroll(
        &self,
        payroll_id: Uuid,
        reason: &str,
    ) -> Result<EmployeePayroll, AppError> {
        let mut tx = self.repo.pool().begin().await?;
        let payroll = self
            .repo
            .get_employee_payroll_for_update(&mut *tx, payroll_id)
            .await?
            .ok_or(AppError::NotFound("Folha"))?;

        if payroll.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "Folha paga ou já cancelada não pode ser cancelada".into(),
            ));
        }

        let updated = self.repo.cancel_payroll(&mut *tx, payroll_id, reason).await?;
        tx.commit().await?;

        Ok(updated)
    }
}

enum ProcessedAs {
    Created,
    Updated,
    Skipped,
}
