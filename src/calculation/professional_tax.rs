//! Professional tax band lookup.

use rust_decimal::Decimal;

use crate::config::ProfessionalTaxConfig;
use crate::models::AuditStep;

/// The result of the professional tax lookup, including the audit step.
#[derive(Debug, Clone)]
pub struct ProfessionalTaxResult {
    /// Monthly professional tax.
    pub amount: Decimal,
    /// Index of the band that matched.
    pub band_index: usize,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Looks up the flat monthly professional tax for a salary.
///
/// The salary falls into the first band whose inclusive `up_to` it does not
/// exceed; the open-ended last band catches the rest.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_professional_tax;
/// use payroll_engine::config::{ProfessionalTaxBand, ProfessionalTaxConfig};
/// use rust_decimal::Decimal;
///
/// let config = ProfessionalTaxConfig {
///     state: None,
///     bands: vec![
///         ProfessionalTaxBand { up_to: Some(Decimal::new(15000, 0)), amount: Decimal::ZERO },
///         ProfessionalTaxBand { up_to: Some(Decimal::new(25000, 0)), amount: Decimal::new(150, 0) },
///         ProfessionalTaxBand { up_to: None, amount: Decimal::new(200, 0) },
///     ],
/// };
/// let result = calculate_professional_tax(Decimal::new(25000, 0), &config, 1);
/// assert_eq!(result.amount, Decimal::new(150, 0));
/// ```
pub fn calculate_professional_tax(
    monthly_salary: Decimal,
    config: &ProfessionalTaxConfig,
    step_number: u32,
) -> ProfessionalTaxResult {
    // Validated configs always end in an open band; an empty table taxes nothing.
    let matched = config
        .bands
        .iter()
        .enumerate()
        .find(|(_, band)| band.up_to.is_none_or(|up_to| monthly_salary <= up_to));

    let (band_index, amount, up_to) = match matched {
        Some((index, band)) => (index, band.amount, band.up_to),
        None => (config.bands.len(), Decimal::ZERO, None),
    };

    let band_desc = match up_to {
        Some(limit) => format!("up to ₹{}", limit.normalize()),
        None => "top band".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "professional_tax".to_string(),
        rule_name: "Professional Tax".to_string(),
        statute_ref: match &config.state {
            Some(state) => format!("Professional Tax schedule ({})", state),
            None => "Professional Tax schedule".to_string(),
        },
        input: serde_json::json!({
            "monthly_salary": monthly_salary.to_string(),
            "bands": config.bands.len()
        }),
        output: serde_json::json!({
            "band_index": band_index,
            "amount": amount.to_string()
        }),
        reasoning: format!(
            "Monthly salary ₹{} falls in band {} ({}): ₹{}",
            monthly_salary,
            band_index + 1,
            band_desc,
            amount.normalize()
        ),
    };

    ProfessionalTaxResult {
        amount,
        band_index,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfessionalTaxBand;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> ProfessionalTaxConfig {
        ProfessionalTaxConfig {
            state: Some("KA".to_string()),
            bands: vec![
                ProfessionalTaxBand {
                    up_to: Some(dec("15000")),
                    amount: dec("0"),
                },
                ProfessionalTaxBand {
                    up_to: Some(dec("25000")),
                    amount: dec("150"),
                },
                ProfessionalTaxBand {
                    up_to: None,
                    amount: dec("200"),
                },
            ],
        }
    }

    #[test]
    fn test_lower_band_boundary_inclusive() {
        assert_eq!(calculate_professional_tax(dec("15000"), &config(), 1).amount, dec("0"));
        assert_eq!(
            calculate_professional_tax(dec("15000.01"), &config(), 1).amount,
            dec("150")
        );
    }

    #[test]
    fn test_middle_band_boundary_inclusive() {
        assert_eq!(calculate_professional_tax(dec("25000"), &config(), 1).amount, dec("150"));
        assert_eq!(
            calculate_professional_tax(dec("25000.01"), &config(), 1).amount,
            dec("200")
        );
    }

    #[test]
    fn test_top_band_for_80000() {
        let result = calculate_professional_tax(dec("80000"), &config(), 1);
        assert_eq!(result.amount, dec("200"));
        assert_eq!(result.band_index, 2);
        assert!(result.audit_step.reasoning.contains("top band"));
        assert!(result.audit_step.statute_ref.contains("KA"));
    }

    #[test]
    fn test_empty_table_taxes_nothing() {
        let config = ProfessionalTaxConfig {
            state: None,
            bands: vec![],
        };
        let result = calculate_professional_tax(dec("50000"), &config, 1);
        assert_eq!(result.amount, Decimal::ZERO);
    }
}
