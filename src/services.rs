// src/services.rs

pub mod accounting_service;
pub mod assignment_service;
pub mod casual_service;
pub mod employee_service;
pub mod payroll_service;

pub use accounting_service::AccountingService;
pub use assignment_service::AssignmentService;
pub use casual_service::CasualPaymentService;
pub use employee_service::EmployeeService;
pub use payroll_service::PayrollService;
