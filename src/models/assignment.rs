// src/models/assignment.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AssignmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }
}

/// Unidade de trabalho agendada para um funcionário em uma data/horário.
/// Única por `(employee, work_date, start_time)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkAssignment {
    pub id: Uuid,
    pub employee_id: Uuid,
    #[schema(example = "A-20250812-3F09A1")]
    pub assignment_number: String,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    #[schema(example = "8.00")]
    pub expected_hours: Decimal,
    // Só preenchido depois do check-out
    pub actual_hours: Option<Decimal>,
    pub work_description: String,
    pub status: AssignmentStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub calculated_rate: Option<Decimal>,
    // Só preenchido depois que actual_hours é conhecido
    pub total_payment: Option<Decimal>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl WorkAssignment {
    /// Propriedade derivada, nunca armazenada: agendamento vencido é aquele
    /// ainda aberto com a data de trabalho estritamente no passado.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.work_date < today
    }
}

/// Horas reais do turno no check-out: o valor informado pelo operador tem
/// precedência sobre a derivação a partir dos timestamps.
pub fn checkout_hours(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    supplied: Option<Decimal>,
) -> Option<Decimal> {
    supplied
        .map(|hours| hours.round_dp(2))
        .or_else(|| hours_between(check_in, check_out))
}

/// Diferença entre check-in e check-out em horas, com 2 casas decimais.
///
/// Os dois lados são timestamps UTC, então turnos que cruzam a meia-noite
/// saem naturalmente com a duração real. Check-out anterior ao check-in não
/// tem interpretação válida e retorna `None`.
pub fn hours_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Option<Decimal> {
    let seconds = (check_out - check_in).num_seconds();
    if seconds < 0 {
        return None;
    }
    Some((Decimal::from(seconds) / Decimal::from(3600)).round_dp(2))
}

/// Identificador no formato A-YYYYMMDD-XXXXXX, como os números de pedido.
pub fn new_assignment_number() -> String {
    let date_part = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("A-{}-{}", date_part, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn horas_trabalhadas_do_cenario_padrao() {
        // 09:00 às 17:30 = 8.5 horas
        let check_in = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2025, 6, 2, 17, 30, 0).unwrap();
        assert_eq!(hours_between(check_in, check_out), Some(Decimal::new(85, 1)));
    }

    #[test]
    fn turno_que_cruza_a_meia_noite() {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 2, 22, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2025, 6, 3, 6, 0, 0).unwrap();
        assert_eq!(hours_between(check_in, check_out), Some(Decimal::from(8)));
    }

    #[test]
    fn checkout_antes_do_checkin_nao_tem_duracao() {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2025, 6, 2, 8, 59, 0).unwrap();
        assert_eq!(hours_between(check_in, check_out), None);
    }

    #[test]
    fn arredonda_para_duas_casas() {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2025, 6, 2, 9, 50, 0).unwrap();
        // 50 minutos = 0.8333... -> 0.83
        assert_eq!(hours_between(check_in, check_out), Some(Decimal::new(83, 2)));
    }

    #[test]
    fn saidas_laterais_valem_para_qualquer_estado_aberto() {
        // cancelamento e falta são permitidos até o turno encerrar
        assert!(!AssignmentStatus::Scheduled.is_terminal());
        assert!(!AssignmentStatus::InProgress.is_terminal());
        assert!(AssignmentStatus::Completed.is_terminal());
        assert!(AssignmentStatus::Cancelled.is_terminal());
        assert!(AssignmentStatus::NoShow.is_terminal());
    }

    #[test]
    fn horas_informadas_tem_precedencia_sobre_a_derivacao() {
        // intervalo de 8.5h, mas o operador informou 6h
        let check_in = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2025, 6, 2, 17, 30, 0).unwrap();
        assert_eq!(
            checkout_hours(check_in, check_out, Some(Decimal::from(6))),
            Some(Decimal::from(6))
        );
        assert_eq!(
            checkout_hours(check_in, check_out, Some(Decimal::new(7125, 3))),
            Some(Decimal::new(713, 2))
        );
        // sem valor informado, cai na derivação
        assert_eq!(
            checkout_hours(check_in, check_out, None),
            Some(Decimal::new(85, 1))
        );
    }

    #[test]
    fn vencido_depende_de_status_aberto_e_data_passada() {
        let mut assignment = WorkAssignment {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            assignment_number: new_assignment_number(),
            work_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: None,
            expected_hours: Decimal::from(8),
            actual_hours: None,
            work_description: String::new(),
            status: AssignmentStatus::Scheduled,
            check_in_time: None,
            check_out_time: None,
            calculated_rate: None,
            total_payment: None,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        let day_after = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert!(assignment.is_overdue_on(day_after));
        // no próprio dia ainda não está vencido
        assert!(!assignment.is_overdue_on(assignment.work_date));

        assignment.status = AssignmentStatus::Completed;
        assert!(!assignment.is_overdue_on(day_after));
    }
}
