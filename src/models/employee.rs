//! Employee model and related types.
//!
//! This module defines the [`Employee`] record and the [`CompensationProfile`]
//! the payroll engine consumes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ALLOWANCE_CONVEYANCE, ALLOWANCE_HRA, ALLOWANCE_MEDICAL, ALLOWANCE_SPECIAL};
use crate::error::{EngineError, EngineResult};

/// Largest monthly amount (base salary or allowance) the engine accepts.
///
/// Keeps every intermediate sum and product well inside `Decimal`'s range.
pub const MAX_MONTHLY_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Employee id reserved for the grand-total row of compliance exports.
pub const RESERVED_EMPLOYEE_ID: &str = "TOTAL";

/// Whether an employee participates in payroll runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed; included in batch payroll.
    #[default]
    Active,
    /// On leave without pay, suspended or otherwise excluded from payroll.
    Inactive,
    /// No longer employed.
    Terminated,
}

/// An employee's monthly compensation as stored, before defaults are applied.
///
/// Allowances left as `None` are derived from the base salary or from the
/// configured fixed amounts when the profile is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationProfile {
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// House rent allowance override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hra: Option<Decimal>,
    /// Conveyance allowance override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conveyance: Option<Decimal>,
    /// Medical allowance override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical: Option<Decimal>,
    /// Special allowance override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_allowance: Option<Decimal>,
}

impl CompensationProfile {
    /// Creates a profile with only a base salary; every allowance is derived.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::CompensationProfile;
    /// use rust_decimal::Decimal;
    ///
    /// let profile = CompensationProfile::with_base_salary(Decimal::new(50000, 0));
    /// assert!(profile.hra.is_none());
    /// ```
    pub fn with_base_salary(base_salary: Decimal) -> Self {
        Self {
            base_salary,
            hra: None,
            conveyance: None,
            medical: None,
            special_allowance: None,
        }
    }

    /// Rejects a non-positive base salary, a negative override, or any amount
    /// above [`MAX_MONTHLY_AMOUNT`].
    pub fn validate(&self) -> EngineResult<()> {
        if self.base_salary <= Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "base_salary",
                format!("must be greater than zero, got {}", self.base_salary),
            ));
        }
        if self.base_salary > MAX_MONTHLY_AMOUNT {
            return Err(EngineError::invalid_input(
                "base_salary",
                format!("must not exceed {}, got {}", MAX_MONTHLY_AMOUNT, self.base_salary),
            ));
        }

        let overrides = [
            (ALLOWANCE_HRA, self.hra),
            (ALLOWANCE_CONVEYANCE, self.conveyance),
            (ALLOWANCE_MEDICAL, self.medical),
            (ALLOWANCE_SPECIAL, self.special_allowance),
        ];
        for (field, value) in overrides {
            if let Some(amount) = value {
                if amount < Decimal::ZERO {
                    return Err(EngineError::invalid_input(
                        field,
                        format!("must not be negative, got {}", amount),
                    ));
                }
                if amount > MAX_MONTHLY_AMOUNT {
                    return Err(EngineError::invalid_input(
                        field,
                        format!("must not exceed {}, got {}", MAX_MONTHLY_AMOUNT, amount),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Represents an employee on the payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Full name as printed on the payslip.
    pub name: String,
    /// Department name.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// Employment status.
    #[serde(default)]
    pub status: EmployeeStatus,
    /// Monthly compensation.
    pub compensation: CompensationProfile,
}

impl Employee {
    /// Returns true if the employee should be included in a payroll run.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Checks identity fields and the compensation profile.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::invalid_input("id", "must not be empty"));
        }
        if self.id.trim().eq_ignore_ascii_case(RESERVED_EMPLOYEE_ID) {
            return Err(EngineError::invalid_input(
                "id",
                format!("'{}' is reserved for report totals", RESERVED_EMPLOYEE_ID),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(EngineError::invalid_input("name", "must not be empty"));
        }
        self.compensation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_deserialize_employee_without_overrides() {
        let json = r#"{
            "id": "emp_001",
            "name": "Asha Verma",
            "department": "Engineering",
            "compensation": { "base_salary": "50000" }
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert_eq!(employee.department.as_deref(), Some("Engineering"));
        assert_eq!(employee.status, EmployeeStatus::Active);
        assert_eq!(employee.compensation.base_salary, dec("50000"));
        assert!(employee.compensation.hra.is_none());
        assert!(employee.designation.is_none());
    }

    #[test]
    fn test_deserialize_employee_with_overrides() {
        let json = r#"{
            "id": "emp_002",
            "name": "Ravi Kumar",
            "status": "inactive",
            "compensation": {
                "base_salary": "30000",
                "hra": "9000",
                "medical": "1250.50"
            }
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.status, EmployeeStatus::Inactive);
        assert_eq!(employee.compensation.hra, Some(dec("9000")));
        assert_eq!(employee.compensation.medical, Some(dec("1250.50")));
        assert!(employee.compensation.conveyance.is_none());
        assert!(!employee.is_active());
    }

    #[test]
    fn test_unset_overrides_are_not_serialized() {
        let profile = CompensationProfile::with_base_salary(dec("42000"));
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"base_salary":"42000"}"#);
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let employee = Employee {
            id: "emp_003".to_string(),
            name: "  ".to_string(),
            department: None,
            designation: None,
            status: EmployeeStatus::Active,
            compensation: CompensationProfile::with_base_salary(dec("30000")),
        };
        match employee.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "name"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_negative_override() {
        let mut profile = CompensationProfile::with_base_salary(dec("30000"));
        profile.conveyance = Some(dec("-1"));
        assert!(profile.validate().is_err());
        assert!(CompensationProfile::with_base_salary(dec("0")).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_amounts_beyond_limit() {
        assert_eq!(MAX_MONTHLY_AMOUNT, dec("1000000000000"));
        assert!(CompensationProfile::with_base_salary(MAX_MONTHLY_AMOUNT).validate().is_ok());

        let huge = CompensationProfile::with_base_salary(dec("60000000000000000000000000000"));
        match huge.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "base_salary"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }

        let mut profile = CompensationProfile::with_base_salary(dec("30000"));
        profile.hra = Some(dec("1000000000000.01"));
        match profile.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, ALLOWANCE_HRA),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_reserved_id() {
        for id in ["TOTAL", "total", " Total "] {
            let employee = Employee {
                id: id.to_string(),
                name: "Totals".to_string(),
                department: None,
                designation: None,
                status: EmployeeStatus::Active,
                compensation: CompensationProfile::with_base_salary(dec("30000")),
            };
            match employee.validate() {
                Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "id"),
                other => panic!("Expected InvalidInput for {:?}, got {:?}", id, other),
            }
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EmployeeStatus::Terminated).unwrap(),
            "\"terminated\""
        );
    }
}
