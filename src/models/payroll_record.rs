//! Persisted payroll record.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendanceSummary, FinancialYear, PayPeriod, PayrollBreakdown};
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Created but not yet confirmed.
    Pending,
    /// Computed by a payroll run.
    Processed,
    /// Disbursed to the employee.
    Paid,
}

impl PayrollStatus {
    /// Statuses only move forward: pending, processed, paid.
    pub fn can_transition_to(self, next: PayrollStatus) -> bool {
        next >= self
    }

    /// The snake_case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            PayrollStatus::Pending => "pending",
            PayrollStatus::Processed => "processed",
            PayrollStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The storage key of a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayrollKey {
    /// The employee id.
    pub employee_id: String,
    /// The pay period.
    pub period: PayPeriod,
}

impl PayrollKey {
    /// Creates a key.
    pub fn new(employee_id: impl Into<String>, period: PayPeriod) -> Self {
        Self {
            employee_id: employee_id.into(),
            period,
        }
    }
}

/// One employee's payroll for one pay period.
///
/// Allowances and deductions are stored as name-to-amount maps next to the
/// totals so the payslip never has to recompute them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Stable record id; survives reprocessing.
    pub id: Uuid,
    /// The employee id.
    pub employee_id: String,
    /// The pay period.
    pub period: PayPeriod,
    /// The financial year whose configuration was applied.
    pub financial_year: FinancialYear,
    /// Version tag of the statutory configuration used.
    pub config_version: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Allowances by name.
    pub allowances: BTreeMap<String, Decimal>,
    /// Overtime hours paid.
    pub overtime_hours: Decimal,
    /// Overtime pay.
    pub overtime_pay: Decimal,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Employee deductions by name.
    pub deductions: BTreeMap<String, Decimal>,
    /// Sum of employee deductions.
    pub total_deductions: Decimal,
    /// Net pay.
    pub net_pay: Decimal,
    /// Employer contributions by name.
    pub employer_contributions: BTreeMap<String, Decimal>,
    /// Whether the employee was within the ESI threshold.
    pub esi_eligible: bool,
    /// Attendance for reporting.
    pub attendance: AttendanceSummary,
    /// Lifecycle state.
    pub status: PayrollStatus,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last recomputed or changed.
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Builds a new record from an engine breakdown.
    pub fn from_breakdown(
        breakdown: &PayrollBreakdown,
        status: PayrollStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: breakdown.employee_id.clone(),
            period: breakdown.period,
            financial_year: breakdown.financial_year,
            config_version: breakdown.config_version.clone(),
            base_salary: breakdown.base_salary,
            allowances: breakdown.allowances.clone(),
            overtime_hours: breakdown.overtime_hours,
            overtime_pay: breakdown.overtime_pay,
            gross_pay: breakdown.totals.gross_pay,
            deductions: breakdown.deductions.clone(),
            total_deductions: breakdown.totals.total_deductions,
            net_pay: breakdown.totals.net_pay,
            employer_contributions: breakdown.employer_contributions.clone(),
            esi_eligible: breakdown.esi_eligible,
            attendance: breakdown.attendance.clone(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// The storage key of this record.
    pub fn key(&self) -> PayrollKey {
        PayrollKey::new(self.employee_id.clone(), self.period)
    }

    /// Returns the named deduction, or zero.
    pub fn deduction(&self, key: &str) -> Decimal {
        self.deductions.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    /// Returns the named employer contribution, or zero.
    pub fn employer_contribution(&self, key: &str) -> Decimal {
        self.employer_contributions
            .get(key)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks the gross and net invariants exactly.
    pub fn reconciles(&self) -> bool {
        let allowances: Decimal = self.allowances.values().copied().sum();
        let deductions: Decimal = self.deductions.values().copied().sum();
        self.gross_pay == self.base_salary + allowances + self.overtime_pay
            && self.total_deductions == deductions
            && self.net_pay == self.gross_pay - self.total_deductions
    }

    /// Moves the record to `next`, refusing to go backwards.
    pub fn transition_to(&mut self, next: PayrollStatus, now: DateTime<Utc>) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}
