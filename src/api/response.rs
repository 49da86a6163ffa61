//! Response types for the payroll API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::FinancialYear;
use crate::processing::error_code;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error_code(&error);
        let message = error.to_string();

        let (status, details) = match &error {
            EngineError::InvalidInput { field, .. } => (
                StatusCode::BAD_REQUEST,
                Some(format!("Field '{}' failed validation", field)),
            ),
            EngineError::MissingConfiguration { financial_year } => (
                StatusCode::BAD_REQUEST,
                Some(format!(
                    "Add a statutory configuration file for {} to enable payroll in that year",
                    financial_year
                )),
            ),
            EngineError::DuplicateComputation { .. } => (
                StatusCode::CONFLICT,
                Some("Resubmit with mode 'upsert' to overwrite the existing record".to_string()),
            ),
            EngineError::InvalidStatusTransition { .. } => (
                StatusCode::CONFLICT,
                Some("Payroll status only moves forward: pending, processed, paid".to_string()),
            ),
            EngineError::EmployeeNotFound { .. }
            | EngineError::PayrollNotFound { .. }
            | EngineError::TdsNotFound { .. } => (StatusCode::NOT_FOUND, None),
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfiguration { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        ApiErrorResponse {
            status,
            error: ApiError {
                code: code.to_string(),
                message,
                details,
            },
        }
    }
}

/// Parses a `YYYY-YY` path segment into a financial year.
pub(crate) fn parse_financial_year(value: &str) -> Result<FinancialYear, ApiErrorResponse> {
    value
        .parse::<FinancialYear>()
        .map_err(ApiErrorResponse::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let api_error: ApiErrorResponse =
            EngineError::invalid_input("base_salary", "must be greater than zero").into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_INPUT");
        assert!(api_error.error.message.contains("base_salary"));
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let api_error: ApiErrorResponse = EngineError::DuplicateComputation {
            employee_id: "emp_001".to_string(),
            month: 6,
            year: 2024,
        }
        .into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "DUPLICATE_COMPUTATION");
        assert!(api_error.error.message.contains("06/2024"));
    }

    #[test]
    fn test_not_found_variants_map_to_404() {
        let api_error: ApiErrorResponse = EngineError::EmployeeNotFound {
            employee_id: "emp_404".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert!(api_error.error.details.is_none());

        let api_error: ApiErrorResponse = EngineError::TdsNotFound {
            employee_id: "emp_404".to_string(),
            financial_year: "2024-25".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_configuration_errors_map_to_500() {
        let api_error: ApiErrorResponse = EngineError::ConfigParseError {
            path: "2024-25.yaml".to_string(),
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "CONFIG_ERROR");
    }

    #[test]
    fn test_parse_financial_year() {
        assert_eq!(
            parse_financial_year("2024-25").unwrap(),
            FinancialYear::new(2024)
        );
        let err = parse_financial_year("2024").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
