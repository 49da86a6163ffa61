//! Provident fund contribution.

use rust_decimal::Decimal;

use crate::config::ProvidentFundConfig;
use crate::models::AuditStep;

use super::round_money;

/// Statute reference recorded on PF audit steps.
pub const PROVIDENT_FUND_STATUTE: &str = "EPF & MP Act 1952, para 29";

/// The result of the PF calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct ProvidentFundResult {
    /// Employee contribution, deducted from net pay.
    pub employee_contribution: Decimal,
    /// Employer contribution, tracked separately and not deducted.
    pub employer_contribution: Decimal,
    /// Whether the ceiling reduced the employee contribution.
    pub cap_applied: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates PF as `min(base_salary * rate, monthly_cap)` for both sides.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_provident_fund;
/// use payroll_engine::config::ProvidentFundConfig;
/// use rust_decimal::Decimal;
///
/// let config = ProvidentFundConfig {
///     employee_rate: Decimal::new(12, 2),
///     employer_rate: Decimal::new(12, 2),
///     monthly_cap: Decimal::new(1800, 0),
/// };
/// let result = calculate_provident_fund(Decimal::new(50000, 0), &config, 1);
/// assert_eq!(result.employee_contribution, Decimal::new(1800, 0));
/// assert!(result.cap_applied);
/// ```
pub fn calculate_provident_fund(
    base_salary: Decimal,
    config: &ProvidentFundConfig,
    step_number: u32,
) -> ProvidentFundResult {
    let uncapped_employee = round_money(base_salary * config.employee_rate);
    let uncapped_employer = round_money(base_salary * config.employer_rate);

    let employee_contribution = uncapped_employee.min(config.monthly_cap);
    let employer_contribution = uncapped_employer.min(config.monthly_cap);
    let cap_applied = uncapped_employee > config.monthly_cap;

    let reasoning = if cap_applied {
        format!(
            "{}% of ₹{} = ₹{} (capped at ₹{})",
            (config.employee_rate * Decimal::ONE_HUNDRED).normalize(),
            base_salary.normalize(),
            uncapped_employee,
            config.monthly_cap.normalize()
        )
    } else {
        format!(
            "{}% of ₹{} = ₹{}",
            (config.employee_rate * Decimal::ONE_HUNDRED).normalize(),
            base_salary.normalize(),
            employee_contribution
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "provident_fund".to_string(),
        rule_name: "Provident Fund".to_string(),
        statute_ref: PROVIDENT_FUND_STATUTE.to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.to_string(),
            "employee_rate": config.employee_rate.to_string(),
            "employer_rate": config.employer_rate.to_string(),
            "monthly_cap": config.monthly_cap.to_string()
        }),
        output: serde_json::json!({
            "employee_contribution": employee_contribution.to_string(),
            "employer_contribution": employer_contribution.to_string(),
            "cap_applied": cap_applied
        }),
        reasoning,
    };

    ProvidentFundResult {
        employee_contribution,
        employer_contribution,
        cap_applied,
        audit_step,
    }
}
