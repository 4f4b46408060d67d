// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Employees ---
        handlers::employees::create_branch,
        handlers::employees::list_branches,
        handlers::employees::create_rate_structure,
        handlers::employees::get_rate_structure,
        handlers::employees::create_employee,
        handlers::employees::list_employees,
        handlers::employees::get_employee,

        // --- Payroll ---
        handlers::payroll::create_deduction_category,
        handlers::payroll::list_deduction_categories,
        handlers::payroll::create_payroll_item,
        handlers::payroll::list_payroll_items,
        handlers::payroll::create_period,
        handlers::payroll::list_periods,
        handlers::payroll::get_period,
        handlers::payroll::delete_period,
        handlers::payroll::process_period,
        handlers::payroll::approve_period,
        handlers::payroll::pay_all,
        handlers::payroll::close_period,
        handlers::payroll::list_period_payrolls,
        handlers::payroll::get_employee_payroll,
        handlers::payroll::calculate_employee_payroll,
        handlers::payroll::approve_employee_payroll,
        handlers::payroll::pay_employee_payroll,
        handlers::payroll::cancel_employee_payroll,

        // --- Assignments ---
        handlers::assignments::create_assignment,
        handlers::assignments::list_assignments,
        handlers::assignments::list_today,
        handlers::assignments::list_overdue,
        handlers::assignments::get_assignment,
        handlers::assignments::check_in,
        handlers::assignments::check_out,
        handlers::assignments::cancel_assignment,
        handlers::assignments::mark_no_show,
        handlers::assignments::delete_assignment,

        // --- Casual payments ---
        handlers::casual::create_casual_payment,
        handlers::casual::list_casual_payments,
        handlers::casual::get_casual_payment,
        handlers::casual::add_deduction,
        handlers::casual::list_deductions,
        handlers::casual::approve_casual_payment,
        handlers::casual::pay_casual_payment,
        handlers::casual::cancel_casual_payment,
    ),
    components(
        schemas(
            // --- Employees ---
            models::employee::EmploymentType,
            models::employee::RateType,
            models::employee::Branch,
            models::employee::RateStructure,
            models::employee::Employee,

            // --- Payroll ---
            models::payroll::PeriodStatus,
            models::payroll::PayrollItemType,
            models::payroll::PayrollStatus,
            models::payroll::PaymentMethod,
            models::payroll::DeductionType,
            models::payroll::DeductionCategory,
            models::payroll::PayrollItem,
            models::payroll::PayrollPeriod,
            models::payroll::EmployeePayroll,
            services::payroll_service::ProcessOutcome,
            services::payroll_service::FailedEmployee,
            services::payroll_service::PeriodSummary,

            // --- Assignments ---
            models::assignment::AssignmentStatus,
            models::assignment::WorkAssignment,

            // --- Casual payments ---
            models::casual::CasualPaymentStatus,
            models::casual::PaymentFrequency,
            models::casual::CasualPayment,
            models::casual::CasualPaymentDeduction,

            // --- Accounting ---
            models::accounting::LedgerEntryType,
            models::accounting::Expense,
            models::accounting::Revenue,
        )
    ),
    tags(
        (name = "Employees", description = "Filiais, estruturas de tarifa e funcionários"),
        (name = "Payroll", description = "Períodos, folhas e itens de folha"),
        (name = "Assignments", description = "Agendamentos de trabalho com check-in/check-out"),
        (name = "CasualPayments", description = "Pagamentos avulsos e razão de descontos")
    ),
    info(
        title = "Payroll Backend API",
        description = "Motor de cálculo e liquidação de folha de pagamento",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
