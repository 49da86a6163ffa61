//! Configuration types for statutory payroll rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the per-financial-year YAML files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::FinancialYear;

/// Defaults applied when an employee's compensation profile omits an allowance,
/// plus the working-time constants used for the hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationDefaults {
    /// HRA as a fraction of base salary (e.g. 0.40).
    pub hra_rate: Decimal,
    /// Special allowance as a fraction of base salary (e.g. 0.15).
    pub special_allowance_rate: Decimal,
    /// Fixed monthly conveyance allowance.
    pub conveyance: Decimal,
    /// Fixed monthly medical allowance.
    pub medical: Decimal,
    /// Working days per month used to derive the hourly rate.
    pub standard_working_days: u32,
    /// Working hours per day used to derive the hourly rate.
    pub hours_per_day: Decimal,
    /// Multiplier applied to the hourly rate for overtime.
    pub overtime_multiplier: Decimal,
}

/// Provident fund rates and ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidentFundConfig {
    /// Employee contribution as a fraction of base salary.
    pub employee_rate: Decimal,
    /// Employer contribution as a fraction of base salary.
    pub employer_rate: Decimal,
    /// Monthly ceiling applied to each contribution.
    pub monthly_cap: Decimal,
}

/// Employee State Insurance threshold and rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsiConfig {
    /// Gross pay at or below which ESI applies.
    pub eligibility_threshold: Decimal,
    /// Employee contribution as a fraction of gross pay.
    pub employee_rate: Decimal,
    /// Employer contribution as a fraction of gross pay.
    pub employer_rate: Decimal,
}

/// One professional tax band.
///
/// Bands are ordered; a salary falls into the first band whose `up_to` it does
/// not exceed. The last band has no `up_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalTaxBand {
    /// Inclusive upper bound of monthly salary for this band.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Flat monthly tax for the band.
    pub amount: Decimal,
}

/// Professional tax configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalTaxConfig {
    /// The state whose schedule this is.
    #[serde(default)]
    pub state: Option<String>,
    /// Ordered bands.
    pub bands: Vec<ProfessionalTaxBand>,
}

/// One slab of the progressive income tax table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSlab {
    /// Exclusive lower bound.
    pub lower: Decimal,
    /// Inclusive upper bound; `None` for the top slab.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// Marginal rate as a fraction (e.g. 0.05).
    pub rate: Decimal,
}

/// Income tax (TDS) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdsConfig {
    /// Name of the tax regime the slabs belong to.
    #[serde(default)]
    pub regime: Option<String>,
    /// Maximum deduction allowed under section 80C.
    pub section_80c_cap: Decimal,
    /// Cess as a fraction of slab tax (e.g. 0.04).
    pub cess_rate: Decimal,
    /// Ascending, contiguous slabs.
    pub slabs: Vec<TaxSlab>,
}

/// The statutory configuration for one financial year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatutoryConfig {
    /// The financial year this record governs.
    pub financial_year: FinancialYear,
    /// Version tag copied onto every record computed with it.
    pub version: String,
    /// Compensation defaults and working-time constants.
    pub compensation: CompensationDefaults,
    /// Provident fund.
    pub provident_fund: ProvidentFundConfig,
    /// Employee State Insurance.
    pub esi: EsiConfig,
    /// Professional tax.
    pub professional_tax: ProfessionalTaxConfig,
    /// Income tax.
    pub tds: TdsConfig,
}

impl StatutoryConfig {
    /// Checks the record for internal consistency.
    ///
    /// Rates must lie in `[0, 1]`, amounts must be non-negative, professional
    /// tax bands and tax slabs must ascend with only the last one open-ended,
    /// and tax slabs must be contiguous starting at zero.
    pub fn validate(&self) -> EngineResult<()> {
        let fail = |message: String| EngineError::InvalidConfiguration {
            financial_year: self.financial_year.to_string(),
            message,
        };

        let rates = [
            ("compensation.hra_rate", self.compensation.hra_rate),
            (
                "compensation.special_allowance_rate",
                self.compensation.special_allowance_rate,
            ),
            ("provident_fund.employee_rate", self.provident_fund.employee_rate),
            ("provident_fund.employer_rate", self.provident_fund.employer_rate),
            ("esi.employee_rate", self.esi.employee_rate),
            ("esi.employer_rate", self.esi.employer_rate),
            ("tds.cess_rate", self.tds.cess_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(fail(format!("{} must be between 0 and 1, got {}", name, rate)));
            }
        }

        let amounts = [
            ("compensation.conveyance", self.compensation.conveyance),
            ("compensation.medical", self.compensation.medical),
            ("provident_fund.monthly_cap", self.provident_fund.monthly_cap),
            ("esi.eligibility_threshold", self.esi.eligibility_threshold),
            ("tds.section_80c_cap", self.tds.section_80c_cap),
        ];
        for (name, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(fail(format!("{} must not be negative, got {}", name, amount)));
            }
        }

        if self.compensation.standard_working_days == 0 {
            return Err(fail("compensation.standard_working_days must be positive".into()));
        }
        if self.compensation.hours_per_day <= Decimal::ZERO {
            return Err(fail("compensation.hours_per_day must be positive".into()));
        }
        if self.compensation.overtime_multiplier < Decimal::ZERO {
            return Err(fail("compensation.overtime_multiplier must not be negative".into()));
        }

        self.validate_professional_tax_bands().map_err(fail)?;
        self.validate_tax_slabs().map_err(fail)?;

        Ok(())
    }

    fn validate_professional_tax_bands(&self) -> Result<(), String> {
        let bands = &self.professional_tax.bands;
        if bands.is_empty() {
            return Err("professional_tax.bands must not be empty".into());
        }

        let mut previous: Option<Decimal> = None;
        for (index, band) in bands.iter().enumerate() {
            if band.amount < Decimal::ZERO {
                return Err(format!("professional tax band {} has a negative amount", index));
            }
            let is_last = index == bands.len() - 1;
            match (band.up_to, is_last) {
                (None, false) => {
                    return Err(format!(
                        "professional tax band {} is open-ended but is not the last band",
                        index
                    ));
                }
                (Some(up_to), _) => {
                    if previous.is_some_and(|p| up_to <= p) {
                        return Err(format!(
                            "professional tax band {} upper bound {} does not ascend",
                            index, up_to
                        ));
                    }
                    previous = Some(up_to);
                }
                (None, true) => {}
            }
        }

        if bands.last().is_some_and(|b| b.up_to.is_some()) {
            return Err("the last professional tax band must be open-ended".into());
        }
        Ok(())
    }

    fn validate_tax_slabs(&self) -> Result<(), String> {
        let slabs = &self.tds.slabs;
        if slabs.is_empty() {
            return Err("tds.slabs must not be empty".into());
        }

        let mut expected_lower = Decimal::ZERO;
        for (index, slab) in slabs.iter().enumerate() {
            if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE {
                return Err(format!("tax slab {} rate {} is outside [0, 1]", index, slab.rate));
            }
            if slab.lower != expected_lower {
                return Err(format!(
                    "tax slab {} starts at {} but the previous slab ends at {}",
                    index, slab.lower, expected_lower
                ));
            }
            let is_last = index == slabs.len() - 1;
            match slab.upper {
                Some(upper) if upper <= slab.lower => {
                    return Err(format!(
                        "tax slab {} upper bound {} is not above its lower bound {}",
                        index, upper, slab.lower
                    ));
                }
                Some(_) if is_last => {
                    return Err("the last tax slab must be open-ended".into());
                }
                Some(upper) => expected_lower = upper,
                None if !is_last => {
                    return Err(format!(
                        "tax slab {} is open-ended but is not the last slab",
                        index
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }
}
