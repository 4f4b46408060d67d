// src/handlers.rs

pub mod assignments;
pub mod casual;
pub mod employees;
pub mod payroll;
