//! Request types for the payroll API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{CompensationProfile, PayPeriod, PayrollStatus, WorkSummary};
use crate::processing::WriteMode;
use crate::report::PayslipFormat;

/// Request body for `POST /payroll/calculate`.
///
/// When `compensation` is omitted the stored employee's profile is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The employee to calculate for.
    pub employee_id: String,
    /// Pay period month (1-12).
    pub month: u32,
    /// Pay period year.
    pub year: i32,
    /// Compensation to use instead of the stored profile.
    #[serde(default)]
    pub compensation: Option<CompensationProfile>,
    /// Overtime and attendance.
    #[serde(default)]
    pub work: WorkSummary,
}

impl CalculationRequest {
    /// The requested pay period.
    pub fn period(&self) -> EngineResult<PayPeriod> {
        PayPeriod::new(self.month, self.year)
    }
}

/// Request body for `POST /payroll/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPayrollRequest {
    /// Pay period month (1-12).
    pub month: u32,
    /// Pay period year.
    pub year: i32,
    /// Work summaries keyed by employee id.
    #[serde(default)]
    pub work: HashMap<String, WorkSummary>,
    /// Whether existing records may be overwritten.
    #[serde(default)]
    pub mode: WriteMode,
}

impl ProcessPayrollRequest {
    /// The requested pay period.
    pub fn period(&self) -> EngineResult<PayPeriod> {
        PayPeriod::new(self.month, self.year)
    }
}

/// Request body for `POST /payslips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipRequest {
    /// The employee.
    pub employee_id: String,
    /// Pay period month (1-12).
    pub month: u32,
    /// Pay period year.
    pub year: i32,
    /// Overtime and attendance.
    #[serde(default)]
    pub work: WorkSummary,
    /// Rendering of the returned payslip.
    #[serde(default)]
    pub format: PayslipFormat,
}

impl PayslipRequest {
    /// The requested pay period.
    pub fn period(&self) -> EngineResult<PayPeriod> {
        PayPeriod::new(self.month, self.year)
    }
}

/// Request body for `PUT /payroll/:employee_id/:year/:month/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// The new status.
    pub status: PayrollStatus,
}

/// Query string accepted by rendering endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatQuery {
    /// Requested output format.
    #[serde(default)]
    pub format: Option<String>,
}
