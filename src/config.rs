// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AccountingRepository, AssignmentRepository, CasualPaymentRepository, EmployeeRepository,
        PayrollRepository,
    },
    services::{
        AccountingService, AssignmentService, CasualPaymentService, EmployeeService,
        PayrollService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub employee_service: EmployeeService,
    pub payroll_service: PayrollService,
    pub assignment_service: AssignmentService,
    pub casual_service: CasualPaymentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let employee_repo = EmployeeRepository::new(db_pool.clone());
        let payroll_repo = PayrollRepository::new(db_pool.clone());
        let assignment_repo = AssignmentRepository::new(db_pool.clone());
        let casual_repo = CasualPaymentRepository::new(db_pool.clone());
        let accounting_repo = AccountingRepository::new(db_pool.clone());

        let accounting_service = AccountingService::new(accounting_repo);
        let employee_service = EmployeeService::new(employee_repo.clone());
        let payroll_service = PayrollService::new(
            payroll_repo,
            employee_repo.clone(),
            assignment_repo.clone(),
            accounting_service.clone(),
        );
        let assignment_service =
            AssignmentService::new(assignment_repo.clone(), employee_repo.clone());
        let casual_service = CasualPaymentService::new(
            casual_repo,
            employee_repo,
            assignment_repo,
            accounting_service,
        );

        Ok(Self {
            db_pool,
            employee_service,
            payroll_service,
            assignment_service,
            casual_service,
        })
    }
}
