// src/services/employee_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::EmployeeRepository,
    models::employee::{Branch, Employee, EmploymentType, RateStructure, RateType},
};

#[derive(Clone)]
pub struct EmployeeService {
    repo: EmployeeRepository,
}

impl EmployeeService {
    pub fn new(repo: EmployeeRepository) -> Self {
        Self { repo }
    }

    pub async fn create_branch(&self, name: &str) -> Result<Branch, AppError> {
        self.repo.create_branch(self.repo.pool(), name).await
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>, AppError> {
        self.repo.list_branches(self.repo.pool()).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_rate_structure(
        &self,
        name: &str,
        rate_type: RateType,
        base_amount: Decimal,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
        weekend_bonus: Option<Decimal>,
        overtime_threshold: Option<Decimal>,
        overtime_multiplier: Option<Decimal>,
    ) -> Result<RateStructure, AppError> {
        if base_amount < Decimal::ZERO {
            return Err(AppError::Validation(
                "Valor base não pode ser negativo".into(),
            ));
        }
        if let Some(end) = effective_to {
            if end < effective_from {
                return Err(AppError::Validation(
                    "Fim de vigência não pode anteceder o início".into(),
                ));
            }
        }

        self.repo
            .create_rate_structure(
                self.repo.pool(),
                name,
                rate_type,
                base_amount,
                effective_from,
                effective_to,
                weekend_bonus,
                overtime_threshold,
                overtime_multiplier,
            )
            .await
    }

    pub async fn get_rate_structure(&self, id: Uuid) -> Result<RateStructure, AppError> {
        self.repo
            .get_rate_structure(self.repo.pool(), id)
            .await?
            .ok_or(AppError::NotFound("Estrutura de tarifa"))
    }

    pub async fn create_employee(
        &self,
        branch_id: Option<Uuid>,
        full_name: &str,
        employment_type: EmploymentType,
        salary: Decimal,
        rate_structure_id: Option<Uuid>,
    ) -> Result<Employee, AppError> {
        if salary < Decimal::ZERO {
            return Err(AppError::Validation("Salário não pode ser negativo".into()));
        }
        if let Some(rate_id) = rate_structure_id {
            // valida o vínculo antes de deixar o FK estourar
            self.get_rate_structure(rate_id).await?;
        }

        self.repo
            .create_employee(
                self.repo.pool(),
                branch_id,
                full_name,
                employment_type,
                salary,
                rate_structure_id,
            )
            .await
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<Employee, AppError> {
        self.repo
            .get_employee(self.repo.pool(), id)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        self.repo.list_employees(self.repo.pool()).await
    }
}
