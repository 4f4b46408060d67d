pub mod accounting;
pub mod assignment;
pub mod casual;
pub mod employee;
pub mod payroll;
