//! Employee State Insurance contribution.

use rust_decimal::Decimal;

use crate::config::EsiConfig;
use crate::models::AuditStep;

use super::round_money;

/// Statute reference recorded on ESI audit steps.
pub const ESI_STATUTE: &str = "ESI Act 1948, s.39";

/// The result of the ESI calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct EsiResult {
    /// Whether gross pay is within the eligibility threshold.
    pub eligible: bool,
    /// Employee contribution, deducted from net pay.
    pub employee_contribution: Decimal,
    /// Employer contribution, tracked separately.
    pub employer_contribution: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates ESI on gross pay.
///
/// Applies when `gross_pay <= eligibility_threshold`; above it both
/// contributions are zero and the employee is marked not eligible.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_esi;
/// use payroll_engine::config::EsiConfig;
/// use rust_decimal::Decimal;
///
/// let config = EsiConfig {
///     eligibility_threshold: Decimal::new(21000, 0),
///     employee_rate: Decimal::new(75, 4),
///     employer_rate: Decimal::new(325, 4),
/// };
/// let result = calculate_esi(Decimal::new(80000, 0), &config, 1);
/// assert!(!result.eligible);
/// assert_eq!(result.employee_contribution, Decimal::ZERO);
/// ```
pub fn calculate_esi(gross_pay: Decimal, config: &EsiConfig, step_number: u32) -> EsiResult {
    let eligible = gross_pay <= config.eligibility_threshold;

    let (employee_contribution, employer_contribution) = if eligible {
        (
            round_money(gross_pay * config.employee_rate),
            round_money(gross_pay * config.employer_rate),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let reasoning = if eligible {
        format!(
            "Gross ₹{} is within threshold ₹{}: {}% = ₹{}",
            gross_pay,
            config.eligibility_threshold.normalize(),
            (config.employee_rate * Decimal::ONE_HUNDRED).normalize(),
            employee_contribution
        )
    } else {
        format!(
            "Gross ₹{} exceeds threshold ₹{} - not eligible for ESI",
            gross_pay,
            config.eligibility_threshold.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "esi".to_string(),
        rule_name: "Employee State Insurance".to_string(),
        statute_ref: ESI_STATUTE.to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "eligibility_threshold": config.eligibility_threshold.to_string(),
            "employee_rate": config.employee_rate.to_string(),
            "employer_rate": config.employer_rate.to_string()
        }),
        output: serde_json::json!({
            "eligible": eligible,
            "employee_contribution": employee_contribution.to_string(),
            "employer_contribution": employer_contribution.to_string()
        }),
        reasoning,
    };

    EsiResult {
        eligible,
        employee_contribution,
        employer_contribution,
        audit_step,
    }
}
