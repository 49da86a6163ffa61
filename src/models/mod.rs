//! Core data models for the payroll engine.
//!
//! This module contains the domain models shared by the computation engine,
//! the stores and the HTTP API.

mod breakdown;
mod employee;
mod pay_period;
mod payroll_record;
mod tds;
mod work_summary;

pub use breakdown::{
    ALLOWANCE_CONVEYANCE, ALLOWANCE_HRA, ALLOWANCE_MEDICAL, ALLOWANCE_SPECIAL, AttendanceSummary,
    AuditStep, AuditTrace, AuditWarning, DEDUCTION_ESI, DEDUCTION_PF, DEDUCTION_PROFESSIONAL_TAX,
    DEDUCTION_TDS, PayTotals, PayrollBreakdown,
};
pub use employee::{
    CompensationProfile, Employee, EmployeeStatus, MAX_MONTHLY_AMOUNT, RESERVED_EMPLOYEE_ID,
};
pub use pay_period::{FINANCIAL_YEAR_START_MONTH, FinancialYear, PayPeriod};
pub use payroll_record::{PayrollKey, PayrollRecord, PayrollStatus};
pub use tds::{MAX_ANNUAL_AMOUNT, SlabTax, TdsComputation, TdsDeclaration, TdsRecord};
pub use work_summary::{MAX_OVERTIME_HOURS, WorkSummary};
