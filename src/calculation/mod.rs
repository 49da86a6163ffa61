//! Calculation logic for the payroll engine.
//!
//! This module contains the statutory calculation functions: compensation
//! resolution, overtime, provident fund, ESI, professional tax and TDS, and
//! the pipeline in [`compute_payroll`] that runs them in order. Every function
//! is pure and records an audit step describing its decision.

mod engine;
mod esi;
mod overtime;
mod professional_tax;
mod provident_fund;
mod resolution;
mod rounding;
mod tds;

pub use engine::{PayrollInput, WARNING_ABSENCE_NOT_PRORATED, compute_payroll};
pub use esi::{ESI_STATUTE, EsiResult, calculate_esi};
pub use overtime::{OvertimeResult, calculate_overtime, hourly_rate};
pub use professional_tax::{ProfessionalTaxResult, calculate_professional_tax};
pub use provident_fund::{PROVIDENT_FUND_STATUTE, ProvidentFundResult, calculate_provident_fund};
pub use resolution::{
    AllowanceSource, ResolutionResult, ResolvedAllowance, ResolvedCompensation,
    resolve_compensation,
};
pub use rounding::{MONEY_DECIMAL_PLACES, round_money};
pub use tds::{
    TDS_STATUTE, TdsResult, calculate_monthly_tds, compute_annual_tds, estimate_declaration,
    slab_tax,
};
