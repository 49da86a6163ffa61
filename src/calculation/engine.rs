//! The payroll computation pipeline.
//!
//! [`compute_payroll`] runs every stage in a fixed order, numbering the audit
//! steps as it goes:
//!
//! 1. compensation resolution
//! 2. overtime
//! 3. gross pay
//! 4. provident fund
//! 5. ESI
//! 6. professional tax
//! 7. TDS
//! 8. net pay

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::StatutoryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceSummary, AuditStep, AuditTrace, AuditWarning, CompensationProfile,
    DEDUCTION_ESI, DEDUCTION_PF, DEDUCTION_PROFESSIONAL_TAX, DEDUCTION_TDS, PayPeriod, PayTotals,
    PayrollBreakdown, TdsDeclaration, WorkSummary,
};

use super::{
    calculate_esi, calculate_monthly_tds, calculate_overtime, calculate_professional_tax,
    calculate_provident_fund, resolve_compensation, round_money,
};

/// Warning code raised when the employee was absent but pay was not reduced.
pub const WARNING_ABSENCE_NOT_PRORATED: &str = "ABSENCE_NOT_PRORATED";

/// Everything the engine needs for one employee and one pay period.
#[derive(Debug, Clone)]
pub struct PayrollInput<'a> {
    /// The employee the computation is for.
    pub employee_id: &'a str,
    /// The stored compensation profile.
    pub profile: &'a CompensationProfile,
    /// The pay period.
    pub period: PayPeriod,
    /// Overtime and attendance for the period.
    pub work: &'a WorkSummary,
    /// The employee's TDS declaration for the period's financial year, if any.
    pub tds_declaration: Option<&'a TdsDeclaration>,
}

/// Computes a fully itemized payroll breakdown.
///
/// The function is pure: the same input and configuration always produce the
/// same breakdown, and the breakdown reconciles exactly (gross equals base plus
/// allowances plus overtime; net equals gross minus deductions).
///
/// # Errors
///
/// - `InvalidInput` for a malformed period, profile or work summary, or a
///   declaration belonging to another employee or year.
/// - `MissingConfiguration` if `config` does not govern the period's
///   financial year.
pub fn compute_payroll(
    input: &PayrollInput<'_>,
    config: &StatutoryConfig,
) -> EngineResult<PayrollBreakdown> {
    let start_time = Instant::now();

    input.period.validate()?;
    input.work.validate()?;

    let financial_year = input.period.financial_year();
    if config.financial_year != financial_year {
        return Err(EngineError::MissingConfiguration {
            financial_year: financial_year.to_string(),
        });
    }
    if let Some(declaration) = input.tds_declaration {
        check_declaration(input.employee_id, financial_year, declaration)?;
    }

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    // Compensation
    let resolution = resolve_compensation(input.profile, &config.compensation, step_number)?;
    let resolved = resolution.resolved;
    steps.push(resolution.audit_step);
    step_number += 1;

    // Overtime
    let overtime = calculate_overtime(
        resolved.base_salary,
        input.work.overtime_hours,
        &config.compensation,
        step_number,
    )?;
    steps.push(overtime.audit_step);
    step_number += 1;

    // Gross
    let allowances: BTreeMap<String, Decimal> = resolved
        .allowances()
        .iter()
        .map(|(name, allowance)| (name.to_string(), allowance.amount))
        .collect();
    let allowances_total: Decimal = allowances.values().copied().sum();
    let gross_pay = round_money(resolved.base_salary + allowances_total + overtime.overtime_pay);
    steps.push(AuditStep {
        step_number,
        rule_id: "gross_pay".to_string(),
        rule_name: "Gross Pay".to_string(),
        statute_ref: "compensation".to_string(),
        input: serde_json::json!({
            "base_salary": resolved.base_salary.to_string(),
            "allowances_total": allowances_total.to_string(),
            "overtime_pay": overtime.overtime_pay.to_string()
        }),
        output: serde_json::json!({
            "gross_pay": gross_pay.to_string()
        }),
        reasoning: format!(
            "₹{} base + ₹{} allowances + ₹{} overtime = ₹{}",
            resolved.base_salary, allowances_total, overtime.overtime_pay, gross_pay
        ),
    });
    step_number += 1;

    // Statutory deductions
    let provident_fund =
        calculate_provident_fund(resolved.base_salary, &config.provident_fund, step_number);
    steps.push(provident_fund.audit_step);
    step_number += 1;

    let esi = calculate_esi(gross_pay, &config.esi, step_number);
    steps.push(esi.audit_step);
    step_number += 1;

    let professional_tax =
        calculate_professional_tax(gross_pay, &config.professional_tax, step_number);
    steps.push(professional_tax.audit_step);
    step_number += 1;

    let tds = calculate_monthly_tds(
        input.employee_id,
        financial_year,
        gross_pay,
        professional_tax.amount,
        input.tds_declaration,
        &config.tds,
        step_number,
    )?;
    steps.push(tds.audit_step);
    step_number += 1;

    if !tds.computation.declared {
        warnings.push(AuditWarning {
            code: "TDS_ESTIMATED".to_string(),
            message: format!(
                "No TDS declaration on file for {}; tax estimated from gross pay x 12",
                financial_year
            ),
            severity: "low".to_string(),
        });
    }

    let mut deductions = BTreeMap::new();
    deductions.insert(DEDUCTION_PF.to_string(), provident_fund.employee_contribution);
    deductions.insert(DEDUCTION_ESI.to_string(), esi.employee_contribution);
    deductions.insert(DEDUCTION_PROFESSIONAL_TAX.to_string(), professional_tax.amount);
    deductions.insert(DEDUCTION_TDS.to_string(), tds.computation.monthly_tds);

    let mut employer_contributions = BTreeMap::new();
    employer_contributions.insert(DEDUCTION_PF.to_string(), provident_fund.employer_contribution);
    employer_contributions.insert(DEDUCTION_ESI.to_string(), esi.employer_contribution);

    // Net
    let total_deductions: Decimal = deductions.values().copied().sum();
    let net_pay = gross_pay - total_deductions;
    let employer_contributions_total: Decimal = employer_contributions.values().copied().sum();
    steps.push(AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        statute_ref: "compensation".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "total_deductions": total_deductions.to_string()
        }),
        output: serde_json::json!({
            "net_pay": net_pay.to_string(),
            "employer_contributions_total": employer_contributions_total.to_string()
        }),
        reasoning: format!(
            "₹{} gross - ₹{} deductions = ₹{}",
            gross_pay, total_deductions, net_pay
        ),
    });

    if net_pay < Decimal::ZERO {
        warnings.push(AuditWarning {
            code: "NEGATIVE_NET_PAY".to_string(),
            message: format!("Deductions ₹{} exceed gross pay ₹{}", total_deductions, gross_pay),
            severity: "high".to_string(),
        });
    }

    let attendance = attendance_summary(input.work, config.compensation.standard_working_days);
    if let Some(absent) = attendance.days_absent {
        if absent > Decimal::ZERO {
            warnings.push(AuditWarning {
                code: WARNING_ABSENCE_NOT_PRORATED.to_string(),
                message: format!(
                    "{} day(s) absent in {}; base salary paid in full",
                    absent.normalize(),
                    input.period
                ),
                severity: "medium".to_string(),
            });
        }
    }

    debug!(
        employee_id = %input.employee_id,
        period = %input.period,
        gross_pay = %gross_pay,
        net_pay = %net_pay,
        steps = steps.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Payroll computed"
    );

    Ok(PayrollBreakdown {
        employee_id: input.employee_id.to_string(),
        period: input.period,
        financial_year,
        config_version: config.version.clone(),
        base_salary: resolved.base_salary,
        allowances,
        hourly_rate: overtime.hourly_rate,
        overtime_hours: overtime.overtime_hours,
        overtime_pay: overtime.overtime_pay,
        deductions,
        employer_contributions,
        esi_eligible: esi.eligible,
        tds: tds.computation,
        attendance,
        totals: PayTotals {
            gross_pay,
            total_deductions,
            net_pay,
            employer_contributions_total,
        },
        audit_trace: AuditTrace { steps, warnings },
    })
}

fn check_declaration(
    employee_id: &str,
    financial_year: crate::models::FinancialYear,
    declaration: &TdsDeclaration,
) -> EngineResult<()> {
    if declaration.employee_id != employee_id {
        return Err(EngineError::invalid_input(
            "tds_declaration.employee_id",
            format!(
                "declaration belongs to '{}', not '{}'",
                declaration.employee_id, employee_id
            ),
        ));
    }
    if declaration.financial_year != financial_year {
        return Err(EngineError::invalid_input(
            "tds_declaration.financial_year",
            format!(
                "declaration is for {}, period falls in {}",
                declaration.financial_year, financial_year
            ),
        ));
    }
    Ok(())
}

fn attendance_summary(work: &WorkSummary, configured_days: u32) -> AttendanceSummary {
    let standard_working_days = work.standard_working_days.unwrap_or(configured_days);
    let days_absent = work
        .days_present
        .map(|present| (Decimal::from(standard_working_days) - present).max(Decimal::ZERO));

    AttendanceSummary {
        standard_working_days,
        days_present: work.days_present,
        days_absent,
    }
}
