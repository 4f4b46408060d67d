// src/models/employee.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "employment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Temporary,
    Seasonal,
    Intern,
    Casual,
    Contract,
}

impl EmploymentType {
    /// Tipos pagos por hora no cálculo de fallback (sem estrutura de tarifa).
    pub fn is_hourly(&self) -> bool {
        matches!(self, Self::Casual | Self::Contract | Self::Temporary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rate_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Hourly,
    Daily,
    Monthly,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    #[schema(example = "Filial Centro")]
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Estrutura de tarifa: a "regra de cálculo" que o resolvedor de salário
/// delega quando o funcionário tem uma atribuída.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateStructure {
    pub id: Uuid,
    #[schema(example = "Garçom - horista")]
    pub name: String,
    pub rate_type: RateType,
    #[schema(example = "500.00")]
    pub base_amount: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    // Percentual aplicado em sábados/domingos (ex.: 20 = +20%)
    pub weekend_bonus: Option<Decimal>,
    // Acima deste número de horas, aplica-se o multiplicador de hora extra
    pub overtime_threshold: Option<Decimal>,
    pub overtime_multiplier: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RateStructure {
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        if date < self.effective_from {
            return false;
        }
        match self.effective_to {
            Some(until) => date <= until,
            None => true,
        }
    }

    /// Calcula o valor devido para a data/horas informadas.
    ///
    /// Fora da janela de vigência o resultado é zero. Para tarifas horárias,
    /// horas acima de `overtime_threshold` são pagas com o multiplicador
    /// (padrão 1.5). O arredondamento monetário acontece uma única vez, aqui.
    pub fn calculate_rate(&self, work_date: Option<NaiveDate>, hours_worked: Decimal) -> Decimal {
        let date = work_date.unwrap_or_else(|| Utc::now().date_naive());
        if !self.is_effective_on(date) {
            return Decimal::ZERO;
        }

        let mut rate = self.base_amount;

        if let Some(bonus) = self.weekend_bonus {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                rate *= Decimal::ONE + bonus / Decimal::ONE_HUNDRED;
            }
        }

        match self.rate_type {
            RateType::Hourly => {
                if let Some(threshold) = self.overtime_threshold {
                    if hours_worked > threshold {
                        let multiplier = self
                            .overtime_multiplier
                            .unwrap_or_else(|| Decimal::new(15, 1));
                        let overtime_hours = hours_worked - threshold;
                        let total = rate * threshold + rate * multiplier * overtime_hours;
                        return total.round_dp(2);
                    }
                }
                (rate * hours_worked).round_dp(2)
            }
            RateType::Daily | RateType::Monthly => rate.round_dp(2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    #[schema(example = "Maria da Silva")]
    pub full_name: String,
    pub employment_type: EmploymentType,
    // Tarifa fixa de fallback quando não há estrutura de tarifa
    #[schema(example = "50000.00")]
    pub salary: Decimal,
    pub rate_structure_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Horas de referência de um mês cheio, usadas para derivar a tarifa horária
/// de fallback de casuais/contratados a partir do salário mensal.
pub const MONTHLY_REFERENCE_HOURS: i64 = 160;

impl Employee {
    /// Pagamento de fallback quando o funcionário não tem estrutura de tarifa.
    pub fn fallback_payment(&self, hours_worked: Decimal) -> Decimal {
        if self.employment_type.is_hourly() {
            let hourly_rate = self.salary / Decimal::from(MONTHLY_REFERENCE_HOURS);
            (hourly_rate * hours_worked).round_dp(2)
        } else {
            self.salary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly_rate(base: i64) -> RateStructure {
        RateStructure {
            id: Uuid::new_v4(),
            name: "teste".into(),
            rate_type: RateType::Hourly,
            base_amount: Decimal::from(base),
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            effective_to: None,
            weekend_bonus: None,
            overtime_threshold: None,
            overtime_multiplier: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn horista_multiplica_base_pelas_horas() {
        let rate = hourly_rate(500);
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let total = rate.calculate_rate(Some(monday), Decimal::new(85, 1));
        assert_eq!(total, Decimal::from(4250));
    }

    #[test]
    fn fora_da_vigencia_retorna_zero() {
        let mut rate = hourly_rate(500);
        rate.effective_to = Some(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        let after = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(rate.calculate_rate(Some(after), Decimal::from(8)), Decimal::ZERO);
    }

    #[test]
    fn bonus_de_fim_de_semana_aplica_no_sabado() {
        let mut rate = hourly_rate(100);
        rate.weekend_bonus = Some(Decimal::from(20));
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let total = rate.calculate_rate(Some(saturday), Decimal::from(5));
        // 100 * 1.20 * 5
        assert_eq!(total, Decimal::from(600));
    }

    #[test]
    fn hora_extra_usa_multiplicador_padrao() {
        let mut rate = hourly_rate(100);
        rate.overtime_threshold = Some(Decimal::from(8));
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        // 8h normais + 2h extras a 1.5x = 800 + 300
        let total = rate.calculate_rate(Some(monday), Decimal::from(10));
        assert_eq!(total, Decimal::from(1100));
    }

    #[test]
    fn mensalista_ignora_horas() {
        let mut rate = hourly_rate(50_000);
        rate.rate_type = RateType::Monthly;
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(rate.calculate_rate(Some(monday), Decimal::ZERO), Decimal::from(50_000));
    }

    #[test]
    fn fallback_de_casual_deriva_tarifa_horaria_do_salario() {
        let employee = Employee {
            id: Uuid::new_v4(),
            branch_id: None,
            full_name: "Teste".into(),
            employment_type: EmploymentType::Casual,
            salary: Decimal::from(80_000),
            rate_structure_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        // 80000 / 160 = 500 por hora
        assert_eq!(employee.fallback_payment(Decimal::from(8)), Decimal::from(4000));
    }

    #[test]
    fn fallback_de_mensalista_retorna_salario() {
        let employee = Employee {
            id: Uuid::new_v4(),
            branch_id: None,
            full_name: "Teste".into(),
            employment_type: EmploymentType::FullTime,
            salary: Decimal::from(50_000),
            rate_structure_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(employee.fallback_payment(Decimal::from(999)), Decimal::from(50_000));
    }
}
