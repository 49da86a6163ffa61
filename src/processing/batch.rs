//! Outcome types for payroll runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{PayPeriod, PayrollBreakdown, PayrollRecord};
use crate::store::UpsertOutcome;

/// How a computed record is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace any record already stored for the key.
    #[default]
    Upsert,
    /// Fail with `DuplicateComputation` if the key is taken.
    CreateOnly,
}

/// A record written by processing, with the breakdown it came from.
#[derive(Debug, Clone)]
pub struct ProcessedPayroll {
    /// The stored record.
    pub record: PayrollRecord,
    /// The full breakdown including the audit trace.
    pub breakdown: PayrollBreakdown,
    /// Whether the write created or replaced the record.
    pub outcome: UpsertOutcome,
}

/// One employee processed successfully in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// The employee.
    pub employee_id: String,
    /// Id of the stored record.
    pub record_id: Uuid,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Net pay.
    pub net_pay: Decimal,
    /// True if an earlier record for the same period was overwritten.
    pub replaced: bool,
}

/// One employee that failed in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The employee.
    pub employee_id: String,
    /// Error category, matching the API error codes.
    pub code: String,
    /// Error message.
    pub error: String,
}

impl BatchFailure {
    /// Records `error` against `employee_id`.
    pub fn new(employee_id: impl Into<String>, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.into(),
            code: error_code(error).to_string(),
            error: error.to_string(),
        }
    }
}

/// The result of processing payroll for every active employee.
///
/// Failures never abort the run; each is listed against its employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// The period processed.
    pub period: PayPeriod,
    /// Employees whose records were written.
    pub processed: Vec<BatchItem>,
    /// Employees that failed.
    pub failures: Vec<BatchFailure>,
    /// Employees skipped because the run was cancelled.
    pub not_attempted: Vec<String>,
    /// Whether the run stopped early on cancellation.
    pub cancelled: bool,
    /// Sum of net pay over processed employees.
    pub total_net_pay: Decimal,
}

impl BatchResult {
    pub(crate) fn new(period: PayPeriod) -> Self {
        Self {
            period,
            processed: Vec::new(),
            failures: Vec::new(),
            not_attempted: Vec::new(),
            cancelled: false,
            total_net_pay: Decimal::ZERO,
        }
    }

    /// Number of employees the run attempted.
    pub fn attempted(&self) -> usize {
        self.processed.len() + self.failures.len()
    }
}

/// Stable machine-readable code for an engine error.
pub fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::InvalidInput { .. } => "INVALID_INPUT",
        EngineError::MissingConfiguration { .. } => "MISSING_CONFIGURATION",
        EngineError::DuplicateComputation { .. } => "DUPLICATE_COMPUTATION",
        EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
            "CONFIG_ERROR"
        }
        EngineError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
        EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
        EngineError::PayrollNotFound { .. } => "PAYROLL_NOT_FOUND",
        EngineError::TdsNotFound { .. } => "TDS_NOT_FOUND",
        EngineError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
    }
}
