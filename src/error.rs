//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing and storing payroll.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Every error here is local and recoverable. Batch processing records them
/// per employee instead of aborting the run.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::MissingConfiguration {
///     financial_year: "2030-31".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "No statutory configuration found for financial year 2030-31"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A numeric or structural input was malformed (negative, non-finite, out of range).
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// No statutory configuration exists for the requested financial year.
    #[error("No statutory configuration found for financial year {financial_year}")]
    MissingConfiguration {
        /// The financial year that was requested (e.g. "2024-25").
        financial_year: String,
    },

    /// A payroll record was created, not upserted, for a key that already exists.
    #[error("Payroll already computed for employee '{employee_id}' in {month:02}/{year}")]
    DuplicateComputation {
        /// The employee the record belongs to.
        employee_id: String,
        /// The pay period month.
        month: u32,
        /// The pay period year.
        year: i32,
    },

    /// Configuration file or directory was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but its contents are inconsistent.
    #[error("Invalid configuration for financial year {financial_year}: {message}")]
    InvalidConfiguration {
        /// The financial year of the offending record.
        financial_year: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// No employee exists with the given id.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee id that was not found.
        employee_id: String,
    },

    /// No payroll record exists for the given key.
    #[error("Payroll record not found for employee '{employee_id}' in {month:02}/{year}")]
    PayrollNotFound {
        /// The employee id.
        employee_id: String,
        /// The pay period month.
        month: u32,
        /// The pay period year.
        year: i32,
    },

    /// No TDS record exists for the given employee and financial year.
    #[error("TDS record not found for employee '{employee_id}' in financial year {financial_year}")]
    TdsNotFound {
        /// The employee id.
        employee_id: String,
        /// The financial year (e.g. "2024-25").
        financial_year: String,
    },

    /// A payroll status change that would move a record backwards.
    #[error("Cannot change payroll status from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid_input("base_salary", "must be greater than zero");
        assert_eq!(
            error.to_string(),
            "Invalid input 'base_salary': must be greater than zero"
        );
    }

    #[test]
    fn test_missing_configuration_displays_financial_year() {
        let error = EngineError::MissingConfiguration {
            financial_year: "2019-20".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No statutory configuration found for financial year 2019-20"
        );
    }

    #[test]
    fn test_duplicate_computation_pads_month() {
        let error = EngineError::DuplicateComputation {
            employee_id: "emp_004".to_string(),
            month: 3,
            year: 2025,
        };
        assert_eq!(
            error.to_string(),
            "Payroll already computed for employee 'emp_004' in 03/2025"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_tds_not_found_displays_employee_and_year() {
        let error = EngineError::TdsNotFound {
            employee_id: "emp_001".to_string(),
            financial_year: "2024-25".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "TDS record not found for employee 'emp_001' in financial year 2024-25"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing_config() -> EngineResult<()> {
            Err(EngineError::MissingConfiguration {
                financial_year: "2024-25".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing_config()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::MissingConfiguration { .. })
        ));
    }
}
