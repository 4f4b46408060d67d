// src/db.rs

pub mod accounting_repo;
pub mod assignment_repo;
pub mod casual_repo;
pub mod employee_repo;
pub mod payroll_repo;

pub use accounting_repo::AccountingRepository;
pub use assignment_repo::AssignmentRepository;
pub use casual_repo::CasualPaymentRepository;
pub use employee_repo::EmployeeRepository;
pub use payroll_repo::PayrollRepository;
