//! TDS (income tax deducted at source) declaration models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FinancialYear;
use crate::error::{EngineError, EngineResult};

/// Largest annual amount a declaration may carry.
pub const MAX_ANNUAL_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// An employee's declared annual salary and exemptions for one financial year.
///
/// One declaration is kept per `(employee_id, financial_year)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdsDeclaration {
    /// The employee the declaration belongs to.
    pub employee_id: String,
    /// The financial year it applies to.
    pub financial_year: FinancialYear,
    /// Expected total salary for the year.
    pub annual_salary: Decimal,
    /// Section 80C investments (capped by configuration).
    #[serde(default)]
    pub section_80c: Decimal,
    /// Section 80D health insurance premiums.
    #[serde(default)]
    pub section_80d: Decimal,
    /// HRA exemption claimed.
    #[serde(default)]
    pub hra_exemption: Decimal,
    /// Professional tax for the year.
    #[serde(default)]
    pub professional_tax: Decimal,
    /// Any other deductions.
    #[serde(default)]
    pub other_deductions: Decimal,
}

impl TdsDeclaration {
    /// Rejects negative amounts and amounts above [`MAX_ANNUAL_AMOUNT`].
    pub fn validate(&self) -> EngineResult<()> {
        let fields = [
            ("annual_salary", self.annual_salary),
            ("section_80c", self.section_80c),
            ("section_80d", self.section_80d),
            ("hra_exemption", self.hra_exemption),
            ("professional_tax", self.professional_tax),
            ("other_deductions", self.other_deductions),
        ];
        for (field, value) in fields {
            if value < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    field,
                    format!("must not be negative, got {}", value),
                ));
            }
            if value > MAX_ANNUAL_AMOUNT {
                return Err(EngineError::invalid_input(
                    field,
                    format!("must not exceed {}, got {}", MAX_ANNUAL_AMOUNT, value),
                ));
            }
        }
        Ok(())
    }
}

/// Tax attributed to one slab of the progressive table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabTax {
    /// Slab lower bound (exclusive).
    pub lower: Decimal,
    /// Slab upper bound (inclusive), `None` for the top slab.
    pub upper: Option<Decimal>,
    /// Rate applied in this slab.
    pub rate: Decimal,
    /// Portion of taxable income falling in this slab.
    pub taxable_amount: Decimal,
    /// Tax on that portion.
    pub tax: Decimal,
}

/// The result of the annual TDS computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdsComputation {
    /// Annual salary the computation started from.
    pub annual_salary: Decimal,
    /// Sum of the allowed deductions (80C capped).
    pub total_deductions: Decimal,
    /// `max(0, annual_salary - total_deductions)`.
    pub taxable_income: Decimal,
    /// Per-slab tax, ascending.
    pub slabs: Vec<SlabTax>,
    /// Slab tax before cess.
    pub tax_before_cess: Decimal,
    /// Health and education cess.
    pub cess: Decimal,
    /// Tax for the year including cess.
    pub annual_tax: Decimal,
    /// `annual_tax / 12`.
    pub monthly_tds: Decimal,
    /// True when the figures came from a declaration on file rather than an
    /// estimate from the period's gross pay.
    pub declared: bool,
}

/// A stored TDS configuration record: a declaration and its computed tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdsRecord {
    /// The declaration as submitted.
    pub declaration: TdsDeclaration,
    /// The computed tax.
    pub computation: TdsComputation,
    /// Version tag of the statutory configuration used.
    pub config_version: String,
    /// When the record was last computed.
    pub updated_at: DateTime<Utc>,
}
