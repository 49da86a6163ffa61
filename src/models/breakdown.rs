//! Payroll breakdown models.
//!
//! This module contains the [`PayrollBreakdown`] produced by the computation
//! engine and the audit trace types that record every statutory decision.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FinancialYear, PayPeriod, TdsComputation};

/// Allowance key for house rent allowance.
pub const ALLOWANCE_HRA: &str = "hra";
/// Allowance key for conveyance allowance.
pub const ALLOWANCE_CONVEYANCE: &str = "conveyance";
/// Allowance key for medical allowance.
pub const ALLOWANCE_MEDICAL: &str = "medical";
/// Allowance key for special allowance.
pub const ALLOWANCE_SPECIAL: &str = "special_allowance";

/// Deduction key for the employee's provident fund contribution.
pub const DEDUCTION_PF: &str = "provident_fund";
/// Deduction key for the employee's ESI contribution.
pub const DEDUCTION_ESI: &str = "esi";
/// Deduction key for professional tax.
pub const DEDUCTION_PROFESSIONAL_TAX: &str = "professional_tax";
/// Deduction key for the monthly TDS instalment.
pub const DEDUCTION_TDS: &str = "tds";

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The statute or configuration section the rule comes from.
    pub statute_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag conditions that do not change the computed figures but
/// should be reviewed, such as unpaid absence that was not pro-rated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Aggregated totals of a payroll breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayTotals {
    /// Base salary plus allowances plus overtime pay.
    pub gross_pay: Decimal,
    /// Sum of all employee-side deductions.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions.
    pub net_pay: Decimal,
    /// Sum of employer contributions; not part of net pay.
    pub employer_contributions_total: Decimal,
}

/// Attendance figures carried through for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Standard working days used for the hourly rate.
    pub standard_working_days: u32,
    /// Days present, when reported.
    pub days_present: Option<Decimal>,
    /// Standard days minus days present, floored at zero.
    pub days_absent: Option<Decimal>,
}

/// The fully itemized output of one payroll computation.
///
/// The maps are keyed by the `ALLOWANCE_*` and `DEDUCTION_*` constants so a
/// payslip can be rendered without recomputing anything.
///
/// # Invariants
///
/// - `totals.gross_pay == base_salary + sum(allowances) + overtime_pay`
/// - `totals.net_pay == totals.gross_pay - sum(deductions)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    /// The employee this breakdown belongs to.
    pub employee_id: String,
    /// The pay period.
    pub period: PayPeriod,
    /// The financial year whose configuration was applied.
    pub financial_year: FinancialYear,
    /// Version tag of the statutory configuration used.
    pub config_version: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Resolved allowances by name.
    pub allowances: BTreeMap<String, Decimal>,
    /// Hourly rate derived from the base salary.
    pub hourly_rate: Decimal,
    /// Overtime hours paid.
    pub overtime_hours: Decimal,
    /// Overtime pay.
    pub overtime_pay: Decimal,
    /// Employee-side deductions by name.
    pub deductions: BTreeMap<String, Decimal>,
    /// Employer-side contributions by name.
    pub employer_contributions: BTreeMap<String, Decimal>,
    /// Whether gross pay fell within the ESI eligibility threshold.
    pub esi_eligible: bool,
    /// The annual TDS computation the monthly instalment came from.
    pub tds: TdsComputation,
    /// Attendance carried through for reporting.
    pub attendance: AttendanceSummary,
    /// Aggregated totals.
    pub totals: PayTotals,
    /// Audit trace of every rule applied.
    pub audit_trace: AuditTrace,
}

impl PayrollBreakdown {
    /// Sum of the allowance map.
    pub fn allowances_total(&self) -> Decimal {
        self.allowances.values().copied().sum()
    }

    /// Sum of the deduction map.
    pub fn deductions_total(&self) -> Decimal {
        self.deductions.values().copied().sum()
    }

    /// Returns the named deduction, or zero.
    pub fn deduction(&self, key: &str) -> Decimal {
        self.deductions.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    /// Returns the named allowance, or zero.
    pub fn allowance(&self, key: &str) -> Decimal {
        self.allowances.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    /// Checks both reconciliation invariants exactly.
    pub fn reconciles(&self) -> bool {
        self.totals.gross_pay == self.base_salary + self.allowances_total() + self.overtime_pay
            && self.totals.total_deductions == self.deductions_total()
            && self.totals.net_pay == self.totals.gross_pay - self.totals.total_deductions
    }
}
