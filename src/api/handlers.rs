//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Employee, PayPeriod, PayrollKey, TdsDeclaration};
use crate::report::{ComplianceReportType, Payslip, PayslipFormat};

use super::request::{
    CalculationRequest, FormatQuery, PayslipRequest, ProcessPayrollRequest, StatusUpdateRequest,
};
use super::response::{ApiError, ApiErrorResponse, parse_financial_year};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", post(upsert_employee_handler).get(list_employees_handler))
        .route("/employees/:id", get(get_employee_handler))
        .route("/payroll/calculate", post(calculate_handler))
        .route("/payroll/process", post(process_payroll_handler))
        .route(
            "/payroll/:employee_id/:year/:month",
            get(get_payroll_handler),
        )
        .route(
            "/payroll/:employee_id/:year/:month/status",
            put(update_status_handler),
        )
        .route("/payslips", post(create_payslip_handler))
        .route(
            "/payslips/:employee_id/:year/:month",
            get(get_payslip_handler),
        )
        .route("/tds", put(put_tds_handler))
        .route("/tds/:employee_id/:financial_year", get(get_tds_handler))
        .route(
            "/compliance/:report_type/:financial_year",
            get(compliance_handler),
        )
        .with_state(state)
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> Response {
    let financial_years: Vec<String> = state
        .service()
        .config()
        .financial_years()
        .iter()
        .map(ToString::to_string)
        .collect();

    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "ok",
            "financial_years": financial_years
        }),
    )
}

/// Handler for POST /employees.
///
/// Creates or replaces an employee. Responds 201 for a new employee and 200
/// for a replacement.
async fn upsert_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let Json(employee) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;

    employee
        .validate()
        .map_err(|err| failure(correlation_id, err))?;

    let previous = state.service().employees().upsert(employee.clone());
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee.id,
        replaced = previous.is_some(),
        "Employee saved"
    );

    let status = if previous.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok(json_response(status, &employee))
}

/// Handler for GET /employees.
async fn list_employees_handler(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, &state.service().employees().list())
}

/// Handler for GET /employees/:id.
async fn get_employee_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let employee = state
        .service()
        .employees()
        .get(&employee_id)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(json_response(StatusCode::OK, &employee))
}

/// Handler for POST /payroll/calculate.
///
/// Returns the full breakdown with its audit trace. Nothing is stored.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;
    let period = request.period().map_err(|err| failure(correlation_id, err))?;

    let service = state.service();
    let profile = match request.compensation {
        Some(profile) => profile,
        None => {
            service
                .employees()
                .get(&request.employee_id)
                .map_err(|err| failure(correlation_id, err))?
                .compensation
        }
    };

    let start_time = Instant::now();
    let breakdown = service
        .calculate(&request.employee_id, &profile, period, &request.work)
        .map_err(|err| failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        period = %period,
        gross_pay = %breakdown.totals.gross_pay,
        net_pay = %breakdown.totals.net_pay,
        duration_us = start_time.elapsed().as_micros(),
        "Calculation completed successfully"
    );

    Ok(json_response(StatusCode::OK, &breakdown))
}

/// Handler for POST /payroll/process.
///
/// Runs the batch on the blocking pool. The run stops between employees if
/// the server begins shutting down.
async fn process_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessPayrollRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;
    let period = request.period().map_err(|err| failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        period = %period,
        mode = ?request.mode,
        "Processing payroll run"
    );

    let service = state.service().clone();
    let cancel = state.shutdown().child_token();
    let ProcessPayrollRequest { work, mode, .. } = request;

    let outcome = tokio::task::spawn_blocking(move || {
        service.process_payroll(period, &work, mode, &cancel)
    })
    .await
    .map_err(|err| {
        warn!(correlation_id = %correlation_id, error = %err, "Payroll run panicked");
        ApiErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new("INTERNAL_ERROR", "Payroll run did not complete"),
        }
    })?;

    let result = outcome.map_err(|err| failure(correlation_id, err))?;
    Ok(json_response(StatusCode::OK, &result))
}

/// Handler for GET /payroll/:employee_id/:year/:month.
async fn get_payroll_handler(
    State(state): State<AppState>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let period = PayPeriod::new(month, year).map_err(|err| failure(correlation_id, err))?;
    let record = state
        .service()
        .payroll()
        .get(&PayrollKey::new(employee_id, period))
        .map_err(|err| failure(correlation_id, err))?;
    Ok(json_response(StatusCode::OK, &record))
}

/// Handler for PUT /payroll/:employee_id/:year/:month/status.
async fn update_status_handler(
    State(state): State<AppState>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;
    let period = PayPeriod::new(month, year).map_err(|err| failure(correlation_id, err))?;

    let record = state
        .service()
        .update_status(&employee_id, period, request.status)
        .map_err(|err| failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        period = %period,
        status = %record.status,
        "Payroll status updated"
    );
    Ok(json_response(StatusCode::OK, &record))
}

/// Handler for POST /payslips.
///
/// Processes the employee for the period, stores the record and returns the
/// payslip in the requested format.
async fn create_payslip_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayslipRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;
    let period = request.period().map_err(|err| failure(correlation_id, err))?;

    let payslip = state
        .service()
        .generate_payslip(&request.employee_id, period, &request.work)
        .map_err(|err| failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %payslip.employee_id,
        period = %period,
        net_pay = %payslip.net_pay,
        "Payslip generated"
    );
    Ok(render_payslip(&payslip, request.format))
}

/// Handler for GET /payslips/:employee_id/:year/:month.
async fn get_payslip_handler(
    State(state): State<AppState>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
    Query(query): Query<FormatQuery>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let format = match query.format.as_deref() {
        Some(value) => value
            .parse::<PayslipFormat>()
            .map_err(|err| failure(correlation_id, err))?,
        None => PayslipFormat::default(),
    };
    let period = PayPeriod::new(month, year).map_err(|err| failure(correlation_id, err))?;

    let payslip = state
        .service()
        .payslip(&employee_id, period)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(render_payslip(&payslip, format))
}

/// Handler for PUT /tds.
async fn put_tds_handler(
    State(state): State<AppState>,
    payload: Result<Json<TdsDeclaration>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let Json(declaration) =
        payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;

    let record = state
        .service()
        .compute_tds(declaration)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(json_response(StatusCode::OK, &record))
}

/// Handler for GET /tds/:employee_id/:financial_year.
async fn get_tds_handler(
    State(state): State<AppState>,
    Path((employee_id, financial_year)): Path<(String, String)>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let financial_year = parse_financial_year(&financial_year)?;
    let record = state
        .service()
        .tds()
        .get(&employee_id, financial_year)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(json_response(StatusCode::OK, &record))
}

/// Handler for GET /compliance/:report_type/:financial_year.
///
/// `?format=csv` returns a CSV attachment; the default is JSON.
async fn compliance_handler(
    State(state): State<AppState>,
    Path((report_type, financial_year)): Path<(String, String)>,
    Query(query): Query<FormatQuery>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let report_type = report_type
        .parse::<ComplianceReportType>()
        .map_err(|err| failure(correlation_id, err))?;
    let financial_year = parse_financial_year(&financial_year)?;

    let summary = state
        .service()
        .compliance_summary(report_type, financial_year);

    info!(
        correlation_id = %correlation_id,
        report_type = %report_type,
        financial_year = %financial_year,
        employees = summary.rows.len(),
        "Compliance summary built"
    );

    match query.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("json") => Ok(json_response(StatusCode::OK, &summary)),
        Some("csv") => {
            let csv = summary
                .to_csv()
                .map_err(|err| failure(correlation_id, err))?;
            let disposition = format!("attachment; filename=\"{}\"", summary.csv_file_name());
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        Some(other) => Err(failure(
            correlation_id,
            EngineError::invalid_input(
                "format",
                format!("unsupported compliance format '{}'", other),
            ),
        )),
    }
}

fn render_payslip(payslip: &Payslip, format: PayslipFormat) -> Response {
    match format {
        PayslipFormat::Json => json_response(StatusCode::OK, payslip),
        PayslipFormat::Html => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            payslip.render_html(),
        )
            .into_response(),
        PayslipFormat::Text => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            payslip.render_text(),
        )
            .into_response(),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn failure(correlation_id: Uuid, error: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    error.into()
}

fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error)
}
