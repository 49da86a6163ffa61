//! Payslips and compliance summaries built from stored payroll records.

mod compliance;
mod payslip;

pub use compliance::{ComplianceReportType, ComplianceRow, ComplianceSummary, ComplianceTotals};
pub use payslip::{Payslip, PayslipFormat, PayslipLine};
