// src/main.rs

use axum::{
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let employee_routes = Router::new()
        .route(
            "/branches",
            post(handlers::employees::create_branch).get(handlers::employees::list_branches),
        )
        .route(
            "/rate-structures",
            post(handlers::employees::create_rate_structure),
        )
        .route(
            "/rate-structures/{id}",
            get(handlers::employees::get_rate_structure),
        )
        .route(
            "/employees",
            post(handlers::employees::create_employee).get(handlers::employees::list_employees),
        )
        .route("/employees/{id}", get(handlers::employees::get_employee));

    let payroll_routes = Router::new()
        .route(
            "/deduction-categories",
            post(handlers::payroll::create_deduction_category)
                .get(handlers::payroll::list_deduction_categories),
        )
        .route(
            "/payroll-items",
            post(handlers::payroll::create_payroll_item)
                .get(handlers::payroll::list_payroll_items),
        )
        .route(
            "/payroll-periods",
            post(handlers::payroll::create_period).get(handlers::payroll::list_periods),
        )
        .route(
            "/payroll-periods/{id}",
            get(handlers::payroll::get_period).delete(handlers::payroll::delete_period),
        )
        .route(
            "/payroll-periods/{id}/process",
            post(handlers::payroll::process_period),
        )
        .route(
            "/payroll-periods/{id}/approve",
            post(handlers::payroll::approve_period),
        )
        .route("/payroll-periods/{id}/pay", post(handlers::payroll::pay_all))
        .route(
            "/payroll-periods/{id}/close",
            post(handlers::payroll::close_period),
        )
        .route(
            "/payroll-periods/{id}/payrolls",
            get(handlers::payroll::list_period_payrolls),
        )
        .route(
            "/employee-payrolls/{id}",
            get(handlers::payroll::get_employee_payroll),
        )
        .route(
            "/employee-payrolls/{id}/calculate",
            post(handlers::payroll::calculate_employee_payroll),
        )
        .route(
            "/employee-payrolls/{id}/approve",
            post(handlers::payroll::approve_employee_payroll),
        )
        .route(
            "/employee-payrolls/{id}/pay",
            post(handlers::payroll::pay_employee_payroll),
        )
        .route(
            "/employee-payrolls/{id}/cancel",
            post(handlers::payroll::cancel_employee_payroll),
        );

    let assignment_routes = Router::new()
        .route(
            "/assignments",
            post(handlers::assignments::create_assignment)
                .get(handlers::assignments::list_assignments),
        )
        .route("/assignments/today", get(handlers::assignments::list_today))
        .route(
            "/assignments/overdue",
            get(handlers::assignments::list_overdue),
        )
        .route(
            "/assignments/{id}",
            get(handlers::assignments::get_assignment)
                .delete(handlers::assignments::delete_assignment),
        )
        .route(
            "/assignments/{id}/check-in",
            post(handlers::assignments::check_in),
        )
        .route(
            "/assignments/{id}/check-out",
            post(handlers::assignments::check_out),
        )
        .route(
            "/assignments/{id}/cancel",
            post(handlers::assignments::cancel_assignment),
        )
        .route(
            "/assignments/{id}/no-show",
            post(handlers::assignments::mark_no_show),
        );

    let casual_routes = Router::new()
        .route(
            "/casual-payments",
            post(handlers::casual::create_casual_payment)
                .get(handlers::casual::list_casual_payments),
        )
        .route(
            "/casual-payments/{id}",
            get(handlers::casual::get_casual_payment),
        )
        .route(
            "/casual-payments/{id}/deductions",
            post(handlers::casual::add_deduction).get(handlers::casual::list_deductions),
        )
        .route(
            "/casual-payments/{id}/approve",
            post(handlers::casual::approve_casual_payment),
        )
        .route(
            "/casual-payments/{id}/pay",
            post(handlers::casual::pay_casual_payment),
        )
        .route(
            "/casual-payments/{id}/cancel",
            post(handlers::casual::cancel_casual_payment),
        );

    let api_routes = employee_routes
        .merge(payroll_routes)
        .merge(assignment_routes)
        .merge(casual_routes);

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(docs::ApiDoc::openapi()) }),
        )
        .nest("/api", api_routes)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
