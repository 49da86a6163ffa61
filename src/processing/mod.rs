//! Payroll processing: single employees, batch runs, payslips and TDS.

mod batch;
mod service;

pub use batch::{
    BatchFailure, BatchItem, BatchResult, ProcessedPayroll, WriteMode, error_code,
};
pub use service::PayrollService;
