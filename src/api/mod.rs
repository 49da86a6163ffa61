//! HTTP API for the payroll engine.
//!
//! This module exposes employees, payroll runs, payslips, TDS declarations
//! and compliance summaries over REST.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CalculationRequest, FormatQuery, PayslipRequest, ProcessPayrollRequest, StatusUpdateRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
