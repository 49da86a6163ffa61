//! Hourly rate and overtime pay.
//!
//! The hourly rate is derived from the monthly base salary and the configured
//! standard month (working days times hours per day); overtime is paid at that
//! rate times the configured multiplier.

use rust_decimal::Decimal;

use crate::config::CompensationDefaults;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

use super::round_money;

/// The result of the overtime calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct OvertimeResult {
    /// Base salary divided by standard monthly hours, rounded to the paisa.
    pub hourly_rate: Decimal,
    /// Overtime hours paid.
    pub overtime_hours: Decimal,
    /// Overtime pay, rounded to the paisa.
    pub overtime_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns `base_salary / (standard_working_days * hours_per_day)` rounded to the paisa.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::hourly_rate;
/// use rust_decimal::Decimal;
///
/// // 44000 / (22 * 8) = 250
/// let rate = hourly_rate(Decimal::new(44000, 0), 22, Decimal::new(8, 0));
/// assert_eq!(rate, Decimal::new(250, 0));
/// ```
pub fn hourly_rate(base_salary: Decimal, standard_working_days: u32, hours_per_day: Decimal) -> Decimal {
    let monthly_hours = Decimal::from(standard_working_days) * hours_per_day;
    if monthly_hours.is_zero() {
        return Decimal::ZERO;
    }
    round_money(base_salary / monthly_hours)
}

/// Calculates overtime pay for the period.
///
/// # Errors
///
/// `InvalidInput` if `overtime_hours` is negative.
pub fn calculate_overtime(
    base_salary: Decimal,
    overtime_hours: Decimal,
    defaults: &CompensationDefaults,
    step_number: u32,
) -> EngineResult<OvertimeResult> {
    if overtime_hours < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "overtime_hours",
            format!("must not be negative, got {}", overtime_hours),
        ));
    }

    let rate = hourly_rate(
        base_salary,
        defaults.standard_working_days,
        defaults.hours_per_day,
    );
    let overtime_pay = round_money(overtime_hours * rate * defaults.overtime_multiplier);

    let reasoning = if overtime_hours.is_zero() {
        format!("No overtime worked; hourly rate ₹{} recorded for reference", rate)
    } else {
        format!(
            "{}h x ₹{} x {} = ₹{}",
            overtime_hours.normalize(),
            rate,
            defaults.overtime_multiplier.normalize(),
            overtime_pay
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime".to_string(),
        rule_name: "Overtime Pay".to_string(),
        statute_ref: "compensation.overtime_multiplier".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.to_string(),
            "overtime_hours": overtime_hours.to_string(),
            "standard_working_days": defaults.standard_working_days,
            "hours_per_day": defaults.hours_per_day.to_string(),
            "multiplier": defaults.overtime_multiplier.to_string()
        }),
        output: serde_json::json!({
            "hourly_rate": rate.to_string(),
            "overtime_pay": overtime_pay.to_string()
        }),
        reasoning,
    };

    Ok(OvertimeResult {
        hourly_rate: rate,
        overtime_hours,
        overtime_pay,
        audit_step,
    })
}
