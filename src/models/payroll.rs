// src/models/payroll.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::employee::{Employee, EmploymentType};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "period_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Draft,
    Processing,
    Completed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payroll_item_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayrollItemType {
    Salary,
    Allowance,
    Deduction,
    Tax,
    Bonus,
    Overtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payroll_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Calculated,
    Approved,
    Paid,
    Cancelled,
}

impl PayrollStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Folhas ainda não aprovadas bloqueiam o fechamento do período.
    pub fn blocks_period_close(&self) -> bool {
        matches!(self, Self::Draft | Self::Calculated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    Check,
    MobileMoney,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deduction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeductionType {
    Damage,
    Absenteeism,
    Lateness,
    Performance,
    Advance,
    Loan,
    Tax,
    Insurance,
    Other,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeductionCategory {
    pub id: Uuid,
    #[schema(example = "Adiantamento salarial")]
    pub name: String,
    pub deduction_type: DeductionType,
    pub description: String,
    // Se verdadeiro, o desconto também gera efeito contábil
    pub affects_accounting: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Regra de contribuição resolvida dinamicamente por cálculo, nunca presa a
/// um funcionário específico.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollItem {
    pub id: Uuid,
    #[schema(example = "Vale transporte")]
    pub name: String,
    pub item_type: PayrollItemType,
    #[schema(example = "5000.00")]
    pub amount: Decimal,
    #[schema(example = "10.00")]
    pub percentage: Decimal,
    pub is_percentage: bool,
    // Vazio = vale para todos os tipos de contratação
    pub applicable_employment_types: Vec<EmploymentType>,
    // NULL = item da empresa inteira
    pub branch_id: Option<Uuid>,
    pub deduction_category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PayrollItem {
    /// Predicado de escopo: filial nula OU igual à do funcionário, E lista de
    /// tipos vazia (curinga) OU contendo o tipo do funcionário.
    pub fn applies_to(&self, employee: &Employee) -> bool {
        let branch_ok = match self.branch_id {
            None => true,
            Some(branch_id) => employee.branch_id == Some(branch_id),
        };
        let employment_type_ok = self.applicable_employment_types.is_empty()
            || self.applicable_employment_types.contains(&employee.employment_type);
        branch_ok && employment_type_ok
    }

    /// Contribuição do item. Sem arredondamento aqui: o arredondamento
    /// monetário, se houver, acontece uma vez só no total.
    pub fn contribution(&self, basic_salary: Decimal) -> Decimal {
        if self.is_percentage {
            basic_salary * self.percentage / Decimal::ONE_HUNDRED
        } else {
            self.amount
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollPeriod {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    // NULL = folha da empresa inteira
    pub branch_id: Option<Uuid>,
    pub status: PeriodStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayroll {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub payroll_period_id: Uuid,
    pub rate_structure_id: Option<Uuid>,
    #[schema(example = "50000.00")]
    pub basic_salary: Decimal,
    #[schema(example = "55000.00")]
    pub gross_pay: Decimal,
    #[schema(example = "5000.00")]
    pub total_deductions: Decimal,
    #[schema(example = "50000.00")]
    pub net_pay: Decimal,
    pub status: PayrollStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
    pub notes: String,
    // Vínculo um-para-um com o lançamento de despesa, criado uma única vez
    pub expense_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmployeePayroll {
    /// Só folhas com valor líquido positivo e ainda sem vínculo contábil
    /// geram despesa; líquido zero ou negativo não vira lançamento.
    pub fn needs_expense_entry(&self) -> bool {
        self.expense_id.is_none() && self.net_pay > Decimal::ZERO
    }
}

/// Resultado do cálculo de uma folha: sempre sobrescreve os valores
/// armazenados, nunca acumula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollAmounts {
    pub basic_salary: Decimal,
    pub gross_pay: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
}

/// Calculadora da folha: compõe o salário-base resolvido com as contribuições
/// dos itens aplicáveis. Pura e determinística — itens sem contribuição
/// aplicável somam zero, nunca erram.
pub fn calculate_amounts(
    employee: &Employee,
    basic_salary: Decimal,
    items: &[PayrollItem],
) -> PayrollAmounts {
    let mut gross_pay = basic_salary;
    let mut total_deductions = Decimal::ZERO;

    for item in items.iter().filter(|i| i.applies_to(employee)) {
        match item.item_type {
            PayrollItemType::Allowance | PayrollItemType::Bonus => {
                gross_pay += item.contribution(basic_salary);
            }
            PayrollItemType::Deduction | PayrollItemType::Tax => {
                total_deductions += item.contribution(basic_salary);
            }
            // Salário já está no base; hora extra entra via estrutura de tarifa
            PayrollItemType::Salary | PayrollItemType::Overtime => {}
        }
    }

    PayrollAmounts {
        basic_salary,
        gross_pay,
        total_deductions,
        net_pay: gross_pay - total_deductions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee(branch_id: Option<Uuid>, employment_type: EmploymentType) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            branch_id,
            full_name: "Teste".into(),
            employment_type,
            salary: Decimal::from(50_000),
            rate_structure_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(item_type: PayrollItemType) -> PayrollItem {
        PayrollItem {
            id: Uuid::new_v4(),
            name: "item".into(),
            item_type,
            amount: Decimal::ZERO,
            percentage: Decimal::ZERO,
            is_percentage: false,
            applicable_employment_types: vec![],
            branch_id: None,
            deduction_category_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cenario_base_da_folha() {
        // salário 50.000, abono fixo de 5.000 e desconto de 10%
        let employee = employee(None, EmploymentType::FullTime);
        let mut allowance = item(PayrollItemType::Allowance);
        allowance.amount = Decimal::from(5_000);
        let mut deduction = item(PayrollItemType::Deduction);
        deduction.is_percentage = true;
        deduction.percentage = Decimal::from(10);

        let amounts =
            calculate_amounts(&employee, Decimal::from(50_000), &[allowance, deduction]);

        assert_eq!(amounts.gross_pay, Decimal::from(55_000));
        assert_eq!(amounts.total_deductions, Decimal::from(5_000));
        assert_eq!(amounts.net_pay, Decimal::from(50_000));
    }

    #[test]
    fn liquido_sempre_igual_bruto_menos_descontos() {
        let employee = employee(None, EmploymentType::PartTime);
        let mut bonus = item(PayrollItemType::Bonus);
        bonus.is_percentage = true;
        bonus.percentage = Decimal::new(75, 1); // 7.5%
        let mut tax = item(PayrollItemType::Tax);
        tax.amount = Decimal::new(123_456, 2);

        let amounts = calculate_amounts(&employee, Decimal::from(30_000), &[bonus, tax]);
        assert_eq!(amounts.net_pay, amounts.gross_pay - amounts.total_deductions);
    }

    #[test]
    fn recalculo_e_deterministico() {
        let employee = employee(None, EmploymentType::FullTime);
        let mut allowance = item(PayrollItemType::Allowance);
        allowance.amount = Decimal::from(1_000);
        let items = vec![allowance];

        let first = calculate_amounts(&employee, Decimal::from(50_000), &items);
        let second = calculate_amounts(&employee, Decimal::from(50_000), &items);
        assert_eq!(first, second);
    }

    #[test]
    fn lista_de_tipos_vazia_e_curinga() {
        let casual = employee(None, EmploymentType::Casual);
        let wildcard = item(PayrollItemType::Allowance);
        assert!(wildcard.applies_to(&casual));

        let mut restricted = item(PayrollItemType::Allowance);
        restricted.applicable_employment_types = vec![EmploymentType::FullTime];
        assert!(!restricted.applies_to(&casual));
        assert!(restricted.applies_to(&employee(None, EmploymentType::FullTime)));
    }

    #[test]
    fn filial_nula_vale_para_todas() {
        let branch_a = Uuid::new_v4();
        let branch_b = Uuid::new_v4();
        let company_wide = item(PayrollItemType::Deduction);
        assert!(company_wide.applies_to(&employee(Some(branch_a), EmploymentType::FullTime)));
        assert!(company_wide.applies_to(&employee(None, EmploymentType::FullTime)));

        let mut scoped = item(PayrollItemType::Deduction);
        scoped.branch_id = Some(branch_a);
        assert!(scoped.applies_to(&employee(Some(branch_a), EmploymentType::FullTime)));
        assert!(!scoped.applies_to(&employee(Some(branch_b), EmploymentType::FullTime)));
        assert!(!scoped.applies_to(&employee(None, EmploymentType::FullTime)));
    }

    #[test]
    fn contribuicao_percentual_usa_salario_base() {
        let mut percent = item(PayrollItemType::Deduction);
        percent.is_percentage = true;
        percent.percentage = Decimal::new(125, 1); // 12.5%
        assert_eq!(
            percent.contribution(Decimal::from(10_000)),
            Decimal::from(1_250)
        );

        let mut fixed = item(PayrollItemType::Deduction);
        fixed.amount = Decimal::from(700);
        fixed.percentage = Decimal::from(99); // ignorado: não é percentual
        assert_eq!(fixed.contribution(Decimal::from(10_000)), Decimal::from(700));
    }

    #[test]
    fn item_sem_contribuicao_soma_zero_sem_erro() {
        let employee = employee(None, EmploymentType::FullTime);
        let amounts = calculate_amounts(&employee, Decimal::from(50_000), &[]);
        assert_eq!(amounts.gross_pay, Decimal::from(50_000));
        assert_eq!(amounts.total_deductions, Decimal::ZERO);
        assert_eq!(amounts.net_pay, Decimal::from(50_000));
    }

    #[test]
    fn guardas_de_status_da_folha() {
        assert!(PayrollStatus::Draft.blocks_period_close());
        assert!(PayrollStatus::Calculated.blocks_period_close());
        assert!(!PayrollStatus::Approved.blocks_period_close());
        assert!(!PayrollStatus::Cancelled.blocks_period_close());
        assert!(PayrollStatus::Paid.is_terminal());
        assert!(PayrollStatus::Cancelled.is_terminal());
        assert!(!PayrollStatus::Approved.is_terminal());
    }

    fn folha(net_pay: Decimal) -> EmployeePayroll {
        EmployeePayroll {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            payroll_period_id: Uuid::new_v4(),
            rate_structure_id: None,
            basic_salary: Decimal::from(50_000),
            gross_pay: Decimal::from(50_000),
            total_deductions: Decimal::from(50_000) - net_pay,
            net_pay,
            status: PayrollStatus::Approved,
            payment_date: None,
            payment_method: PaymentMethod::BankTransfer,
            payment_reference: String::new(),
            notes: String::new(),
            expense_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn despesa_so_para_liquido_positivo_e_sem_vinculo() {
        assert!(folha(Decimal::from(50_000)).needs_expense_entry());
        // líquido zero não gera lançamento
        assert!(!folha(Decimal::ZERO).needs_expense_entry());
        // descontos fixos maiores que o bruto produzem líquido negativo
        assert!(!folha(Decimal::from(-10_000)).needs_expense_entry());

        let mut vinculada = folha(Decimal::from(50_000));
        vinculada.expense_id = Some(Uuid::new_v4());
        assert!(!vinculada.needs_expense_entry());
    }
}
