//! Annual income tax (TDS) computation.
//!
//! Tax is computed for the whole financial year from a declaration and then
//! collected in twelve equal monthly instalments.
//!
//! 1. deductions = min(80C, cap) + 80D + HRA exemption + professional tax + other
//! 2. taxable income = max(0, annual salary - deductions)
//! 3. progressive slab tax on taxable income
//! 4. cess on the slab tax
//! 5. monthly TDS = annual tax / 12

use rust_decimal::Decimal;

use crate::config::{TaxSlab, TdsConfig};
use crate::error::EngineResult;
use crate::models::{AuditStep, FinancialYear, SlabTax, TdsComputation, TdsDeclaration};

use super::round_money;

/// Statute reference recorded on TDS audit steps.
pub const TDS_STATUTE: &str = "Income Tax Act 1961, s.192";

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// The result of the monthly TDS calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct TdsResult {
    /// The annual computation.
    pub computation: TdsComputation,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies a progressive slab table to `taxable_income`.
///
/// Walks the slabs in ascending order, taxing `min(remaining, slab width)` at
/// each slab's rate until nothing remains. Each slab's tax is rounded to the
/// paisa; the total is their sum.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::slab_tax;
/// use payroll_engine::config::TaxSlab;
/// use rust_decimal::Decimal;
///
/// let slabs = vec![
///     TaxSlab { lower: Decimal::ZERO, upper: Some(Decimal::new(250000, 0)), rate: Decimal::ZERO },
///     TaxSlab { lower: Decimal::new(250000, 0), upper: None, rate: Decimal::new(10, 2) },
/// ];
/// let (tax, _) = slab_tax(Decimal::new(300000, 0), &slabs);
/// assert_eq!(tax, Decimal::new(5000, 0));
/// ```
pub fn slab_tax(taxable_income: Decimal, slabs: &[TaxSlab]) -> (Decimal, Vec<SlabTax>) {
    let mut remaining = taxable_income.max(Decimal::ZERO);
    let mut total = Decimal::ZERO;
    let mut applied = Vec::new();

    for slab in slabs {
        if remaining <= Decimal::ZERO {
            break;
        }
        let portion = match slab.upper {
            Some(upper) => remaining.min(upper - slab.lower),
            None => remaining,
        };
        let tax = round_money(portion * slab.rate);

        applied.push(SlabTax {
            lower: slab.lower,
            upper: slab.upper,
            rate: slab.rate,
            taxable_amount: portion,
            tax,
        });

        total += tax;
        remaining -= portion;
    }

    (total, applied)
}

/// Computes the annual tax for a declaration.
///
/// `declared` records whether the declaration was on file or estimated.
pub fn compute_annual_tds(
    declaration: &TdsDeclaration,
    config: &TdsConfig,
    declared: bool,
) -> EngineResult<TdsComputation> {
    declaration.validate()?;

    let section_80c = declaration.section_80c.min(config.section_80c_cap);
    let total_deductions = round_money(
        section_80c
            + declaration.section_80d
            + declaration.hra_exemption
            + declaration.professional_tax
            + declaration.other_deductions,
    );
    let taxable_income = (declaration.annual_salary - total_deductions).max(Decimal::ZERO);

    let (tax_before_cess, slabs) = slab_tax(taxable_income, &config.slabs);
    let cess = round_money(tax_before_cess * config.cess_rate);
    let annual_tax = tax_before_cess + cess;
    let monthly_tds = round_money(annual_tax / MONTHS_PER_YEAR);

    Ok(TdsComputation {
        annual_salary: declaration.annual_salary,
        total_deductions,
        taxable_income,
        slabs,
        tax_before_cess,
        cess,
        annual_tax,
        monthly_tds,
        declared,
    })
}

/// Builds a declaration from one month's figures when none is on file.
///
/// Annual salary is `monthly_gross * 12` and professional tax is annualized;
/// no investments or exemptions are assumed.
pub fn estimate_declaration(
    employee_id: &str,
    financial_year: FinancialYear,
    monthly_gross: Decimal,
    monthly_professional_tax: Decimal,
) -> TdsDeclaration {
    TdsDeclaration {
        employee_id: employee_id.to_string(),
        financial_year,
        annual_salary: monthly_gross * MONTHS_PER_YEAR,
        section_80c: Decimal::ZERO,
        section_80d: Decimal::ZERO,
        hra_exemption: Decimal::ZERO,
        professional_tax: monthly_professional_tax * MONTHS_PER_YEAR,
        other_deductions: Decimal::ZERO,
    }
}

/// Calculates the monthly TDS instalment for a pay period.
///
/// Uses the declaration on file when given; otherwise estimates one from the
/// period's gross pay and professional tax.
pub fn calculate_monthly_tds(
    employee_id: &str,
    financial_year: FinancialYear,
    monthly_gross: Decimal,
    monthly_professional_tax: Decimal,
    declaration: Option<&TdsDeclaration>,
    config: &TdsConfig,
    step_number: u32,
) -> EngineResult<TdsResult> {
    let computation = match declaration {
        Some(declaration) => compute_annual_tds(declaration, config, true)?,
        None => {
            let estimate = estimate_declaration(
                employee_id,
                financial_year,
                monthly_gross,
                monthly_professional_tax,
            );
            compute_annual_tds(&estimate, config, false)?
        }
    };

    let source = if computation.declared {
        "declaration"
    } else {
        "estimate"
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "tds".to_string(),
        rule_name: "Tax Deducted at Source".to_string(),
        statute_ref: TDS_STATUTE.to_string(),
        input: serde_json::json!({
            "source": source,
            "financial_year": financial_year.to_string(),
            "annual_salary": computation.annual_salary.to_string(),
            "total_deductions": computation.total_deductions.to_string()
        }),
        output: serde_json::json!({
            "taxable_income": computation.taxable_income.to_string(),
            "tax_before_cess": computation.tax_before_cess.to_string(),
            "cess": computation.cess.to_string(),
            "annual_tax": computation.annual_tax.to_string(),
            "monthly_tds": computation.monthly_tds.to_string()
        }),
        reasoning: format!(
            "Annual tax ₹{} on taxable income ₹{} ({}), collected as ₹{} per month",
            computation.annual_tax,
            computation.taxable_income,
            source,
            computation.monthly_tds
        ),
    };

    Ok(TdsResult {
        computation,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> TdsConfig {
        TdsConfig {
            regime: Some("old".to_string()),
            section_80c_cap: dec("150000"),
            cess_rate: dec("0.04"),
            slabs: vec![
                TaxSlab {
                    lower: dec("0"),
                    upper: Some(dec("250000")),
                    rate: dec("0"),
                },
                TaxSlab {
                    lower: dec("250000"),
                    upper: Some(dec("500000")),
                    rate: dec("0.05"),
                },
                TaxSlab {
                    lower: dec("500000"),
                    upper: Some(dec("1000000")),
                    rate: dec("0.20"),
                },
                TaxSlab {
                    lower: dec("1000000"),
                    upper: None,
                    rate: dec("0.30"),
                },
            ],
        }
    }

    fn declaration(annual_salary: &str) -> TdsDeclaration {
        TdsDeclaration {
            employee_id: "emp_001".to_string(),
            financial_year: FinancialYear::new(2024),
            annual_salary: dec(annual_salary),
            section_80c: Decimal::ZERO,
            section_80d: Decimal::ZERO,
            hra_exemption: Decimal::ZERO,
            professional_tax: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
        }
    }

    #[test]
    fn test_income_below_first_slab_is_untaxed() {
        let (tax, slabs) = slab_tax(dec("240000"), &config().slabs);
        assert_eq!(tax, Decimal::ZERO);
        assert_eq!(slabs.len(), 1);
    }

    #[test]
    fn test_slab_walk_stops_when_income_exhausted() {
        let (tax, slabs) = slab_tax(dec("957600"), &config().slabs);
        // 250000 * 0.05 + 457600 * 0.20 = 12500 + 91520
        assert_eq!(tax, dec("104020"));
        assert_eq!(slabs.len(), 3);
        assert_eq!(slabs[2].taxable_amount, dec("457600"));
    }

    #[test]
    fn test_top_slab_is_open_ended() {
        let (tax, slabs) = slab_tax(dec("1500000"), &config().slabs);
        // 12500 + 100000 + 150000
        assert_eq!(tax, dec("262500"));
        assert_eq!(slabs.len(), 4);
    }

    #[test]
    fn test_zero_income_produces_no_slabs() {
        let (tax, slabs) = slab_tax(Decimal::ZERO, &config().slabs);
        assert_eq!(tax, Decimal::ZERO);
        assert!(slabs.is_empty());
    }

    #[test]
    fn test_80c_is_capped() {
        let mut decl = declaration("960000");
        decl.section_80c = dec("200000");
        decl.section_80d = dec("25000");

        let result = compute_annual_tds(&decl, &config(), true).unwrap();
        assert_eq!(result.total_deductions, dec("175000"));
        assert_eq!(result.taxable_income, dec("785000"));
    }

    #[test]
    fn test_deductions_exceeding_salary_floor_at_zero() {
        let mut decl = declaration("100000");
        decl.hra_exemption = dec("150000");

        let result = compute_annual_tds(&decl, &config(), true).unwrap();
        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.annual_tax, Decimal::ZERO);
        assert_eq!(result.monthly_tds, Decimal::ZERO);
    }

    #[test]
    fn test_cess_and_monthly_instalment() {
        let mut decl = declaration("960000");
        decl.professional_tax = dec("2400");

        let result = compute_annual_tds(&decl, &config(), true).unwrap();
        assert_eq!(result.taxable_income, dec("957600"));
        assert_eq!(result.tax_before_cess, dec("104020"));
        assert_eq!(result.cess, dec("4160.80"));
        assert_eq!(result.annual_tax, dec("108180.80"));
        // 108180.80 / 12 = 9015.0666...
        assert_eq!(result.monthly_tds, dec("9015.07"));
        assert!(result.declared);
    }

    #[test]
    fn test_estimate_annualizes_gross_and_professional_tax() {
        let estimate =
            estimate_declaration("emp_001", FinancialYear::new(2024), dec("80000"), dec("200"));
        assert_eq!(estimate.annual_salary, dec("960000"));
        assert_eq!(estimate.professional_tax, dec("2400"));
        assert_eq!(estimate.section_80c, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_tds_without_declaration_is_estimated() {
        let result = calculate_monthly_tds(
            "emp_001",
            FinancialYear::new(2024),
            dec("80000"),
            dec("200"),
            None,
            &config(),
            7,
        )
        .unwrap();

        assert!(!result.computation.declared);
        assert_eq!(result.computation.monthly_tds, dec("9015.07"));
        assert_eq!(result.audit_step.input["source"].as_str(), Some("estimate"));
        assert_eq!(result.audit_step.step_number, 7);
    }

    #[test]
    fn test_monthly_tds_prefers_declaration() {
        let mut decl = declaration("600000");
        decl.section_80c = dec("150000");

        let result = calculate_monthly_tds(
            "emp_001",
            FinancialYear::new(2024),
            dec("80000"),
            dec("200"),
            Some(&decl),
            &config(),
            1,
        )
        .unwrap();

        // taxable 450000 -> 200000 * 0.05 = 10000; cess 400
        assert!(result.computation.declared);
        assert_eq!(result.computation.annual_tax, dec("10400"));
        assert_eq!(result.computation.monthly_tds, dec("866.67"));
    }

    #[test]
    fn test_negative_declaration_rejected() {
        let decl = declaration("-1");
        assert!(compute_annual_tds(&decl, &config(), true).is_err());
    }
}
