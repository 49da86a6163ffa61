//! Compensation profile resolution.
//!
//! This module turns a stored [`CompensationProfile`] into a fully-resolved
//! set of monthly components by applying the configured defaults in one place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CompensationDefaults;
use crate::error::EngineResult;
use crate::models::{
    ALLOWANCE_CONVEYANCE, ALLOWANCE_HRA, ALLOWANCE_MEDICAL, ALLOWANCE_SPECIAL, AuditStep,
    CompensationProfile,
};

use super::round_money;

/// Where a resolved allowance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceSource {
    /// Set explicitly on the employee's profile.
    Override,
    /// Derived as a percentage of base salary.
    PercentOfBase,
    /// Taken from the configured fixed amount.
    FixedDefault,
}

impl AllowanceSource {
    fn as_str(self) -> &'static str {
        match self {
            AllowanceSource::Override => "override",
            AllowanceSource::PercentOfBase => "percent_of_base",
            AllowanceSource::FixedDefault => "fixed_default",
        }
    }
}

/// A single resolved allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAllowance {
    /// The monthly amount.
    pub amount: Decimal,
    /// How the amount was obtained.
    pub source: AllowanceSource,
}

/// A compensation profile with every allowance filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCompensation {
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// House rent allowance.
    pub hra: ResolvedAllowance,
    /// Conveyance allowance.
    pub conveyance: ResolvedAllowance,
    /// Medical allowance.
    pub medical: ResolvedAllowance,
    /// Special allowance.
    pub special_allowance: ResolvedAllowance,
}

impl ResolvedCompensation {
    /// The allowances keyed by their breakdown names, in a fixed order.
    pub fn allowances(&self) -> [(&'static str, ResolvedAllowance); 4] {
        [
            (ALLOWANCE_HRA, self.hra),
            (ALLOWANCE_CONVEYANCE, self.conveyance),
            (ALLOWANCE_MEDICAL, self.medical),
            (ALLOWANCE_SPECIAL, self.special_allowance),
        ]
    }

    /// Sum of all allowances.
    pub fn allowances_total(&self) -> Decimal {
        self.allowances().iter().map(|(_, a)| a.amount).sum()
    }
}

/// The result of resolving a profile, including the audit step.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// The resolved compensation.
    pub resolved: ResolvedCompensation,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Validates a profile and fills in every omitted allowance.
///
/// - HRA defaults to `hra_rate` of base salary.
/// - Special allowance defaults to `special_allowance_rate` of base salary.
/// - Conveyance and medical default to the configured fixed amounts.
///
/// # Errors
///
/// `InvalidInput` if the base salary is not positive or an override is negative.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{resolve_compensation, AllowanceSource};
/// use payroll_engine::config::CompensationDefaults;
/// use payroll_engine::models::CompensationProfile;
/// use rust_decimal::Decimal;
///
/// let defaults = CompensationDefaults {
///     hra_rate: Decimal::new(40, 2),
///     special_allowance_rate: Decimal::new(15, 2),
///     conveyance: Decimal::new(1500, 0),
///     medical: Decimal::new(1000, 0),
///     standard_working_days: 22,
///     hours_per_day: Decimal::new(8, 0),
///     overtime_multiplier: Decimal::new(15, 1),
/// };
/// let profile = CompensationProfile::with_base_salary(Decimal::new(50000, 0));
///
/// let result = resolve_compensation(&profile, &defaults, 1).unwrap();
/// assert_eq!(result.resolved.hra.amount, Decimal::new(20000, 0));
/// assert_eq!(result.resolved.hra.source, AllowanceSource::PercentOfBase);
/// ```
pub fn resolve_compensation(
    profile: &CompensationProfile,
    defaults: &CompensationDefaults,
    step_number: u32,
) -> EngineResult<ResolutionResult> {
    profile.validate()?;

    let base_salary = round_money(profile.base_salary);

    let percent_of_base = |value: Option<Decimal>, rate: Decimal| match value {
        Some(amount) => ResolvedAllowance {
            amount: round_money(amount),
            source: AllowanceSource::Override,
        },
        None => ResolvedAllowance {
            amount: round_money(base_salary * rate),
            source: AllowanceSource::PercentOfBase,
        },
    };
    let fixed = |value: Option<Decimal>, default: Decimal| match value {
        Some(amount) => ResolvedAllowance {
            amount: round_money(amount),
            source: AllowanceSource::Override,
        },
        None => ResolvedAllowance {
            amount: round_money(default),
            source: AllowanceSource::FixedDefault,
        },
    };

    let resolved = ResolvedCompensation {
        base_salary,
        hra: percent_of_base(profile.hra, defaults.hra_rate),
        conveyance: fixed(profile.conveyance, defaults.conveyance),
        medical: fixed(profile.medical, defaults.medical),
        special_allowance: percent_of_base(profile.special_allowance, defaults.special_allowance_rate),
    };

    let mut output = serde_json::Map::new();
    output.insert("base_salary".into(), base_salary.to_string().into());
    for (name, allowance) in resolved.allowances() {
        output.insert(
            name.into(),
            serde_json::json!({
                "amount": allowance.amount.to_string(),
                "source": allowance.source.as_str()
            }),
        );
    }

    let derived: Vec<&str> = resolved
        .allowances()
        .iter()
        .filter(|(_, a)| a.source != AllowanceSource::Override)
        .map(|(name, _)| *name)
        .collect();

    let reasoning = if derived.is_empty() {
        "All allowances set explicitly on the employee profile".to_string()
    } else {
        format!(
            "Derived {} from configured defaults (HRA {}%, special {}% of base ₹{})",
            derived.join(", "),
            (defaults.hra_rate * Decimal::ONE_HUNDRED).normalize(),
            (defaults.special_allowance_rate * Decimal::ONE_HUNDRED).normalize(),
            base_salary.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "compensation_resolution".to_string(),
        rule_name: "Compensation Resolution".to_string(),
        statute_ref: "compensation".to_string(),
        input: serde_json::to_value(profile).unwrap_or(serde_json::Value::Null),
        output: serde_json::Value::Object(output),
        reasoning,
    };

    Ok(ResolutionResult {
        resolved,
        audit_step,
    })
}
